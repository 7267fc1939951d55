//! Bridge between a UI thread and the async runtime. Calls run as tasks on a
//! runtime handle; their results come back over a channel and are applied on
//! the UI thread, through the same sequence fence as in-thread fetches.

use std::{sync::Arc, time::Duration};

use client_core::{fetch_detail, RecordKindClient, RetryPolicy};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use shared::domain::RecordId;
use tokio::runtime::Handle;
use tracing::debug;

use crate::{
    events::{DetailView, ViewEvent},
    list_fetch::{ListFetchController, PendingFetch},
};

pub struct FetchBridge {
    runtime: Handle,
    events_tx: Sender<ViewEvent>,
    events_rx: Receiver<ViewEvent>,
}

impl FetchBridge {
    pub fn new(runtime: Handle) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            runtime,
            events_tx,
            events_rx,
        }
    }

    pub fn spawn_list(&self, client: Arc<dyn RecordKindClient>, pending: PendingFetch) {
        let events_tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.list(&pending.query).await;
            let event = ViewEvent::ListFetched {
                seq: pending.seq,
                result,
            };
            if events_tx.send(event).is_err() {
                debug!(seq = pending.seq, "ui side gone; dropping list result");
            }
        });
    }

    pub fn spawn_detail(&self, client: Arc<dyn RecordKindClient>, id: RecordId, policy: RetryPolicy) {
        let events_tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let view = DetailView::from_result(fetch_detail(client.as_ref(), &id, policy).await);
            let event = ViewEvent::DetailLoaded {
                kind: client.kind(),
                id,
                view,
            };
            if events_tx.send(event).is_err() {
                debug!("ui side gone; dropping detail result");
            }
        });
    }

    /// Applies every list result already received without blocking and
    /// returns the remaining events for the caller.
    pub fn drain_into(&self, fetch: &mut ListFetchController) -> Vec<ViewEvent> {
        self.events_rx
            .try_iter()
            .filter_map(|event| apply_list_event(fetch, event))
            .collect()
    }

    /// Blocks for at most `timeout` waiting for one event. List results are
    /// applied to `fetch`; anything else is returned.
    pub fn wait_into(
        &self,
        fetch: &mut ListFetchController,
        timeout: Duration,
    ) -> Result<Option<ViewEvent>, RecvTimeoutError> {
        let event = self.events_rx.recv_timeout(timeout)?;
        Ok(apply_list_event(fetch, event))
    }
}

fn apply_list_event(fetch: &mut ListFetchController, event: ViewEvent) -> Option<ViewEvent> {
    match event {
        ViewEvent::ListFetched { seq, result } => {
            fetch.complete(seq, result);
            None
        }
        other => Some(other),
    }
}

#[cfg(test)]
#[path = "tests/bridge_tests.rs"]
mod tests;
