//! Article feed: fetching pages through the proxy and folding them into
//! sorted, filterable, paginated state.

mod client;
mod controller;
mod debounce;
mod filter;
mod query;
mod session;

pub use client::{ClientSettings, FetchError, HeadlineClient, PLAN_LIMIT_MESSAGE};
pub use controller::{ApplyOutcome, FeedController};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use filter::{apply_filters, unique_sources, DateFilter};
pub use query::{FeedQuery, PageRequest, SortOrder, CATEGORIES, DEFAULT_CATEGORY};
pub use session::FeedSession;
