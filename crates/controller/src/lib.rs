//! Controller layer: list query state, fenced list fetching, selection,
//! mutation bookkeeping, and the bridge between a UI thread and the runtime.

pub mod bridge;
pub mod events;
pub mod list_fetch;
pub mod list_view;
pub mod mutation;
pub mod query_state;
pub mod selection;
pub mod url_sync;

pub use bridge::FetchBridge;
pub use events::{DetailView, ErrorCategory, ErrorContext, ViewError, ViewEvent};
pub use list_fetch::{total_pages, ListFetchController, ListViewState, PendingFetch};
pub use list_view::ListView;
pub use mutation::{MutationState, MutationTracker};
pub use query_state::{reduce, QueryAction, QueryContext, QueryDefaults};
pub use selection::{CheckState, SelectionPolicy, SelectionSet};
pub use url_sync::{descriptor_from_url, write_descriptor};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
