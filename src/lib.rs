//! NewsHub: categorized headlines through a key-holding proxy, with a
//! terminal reader that keeps bookmarks, history, and preferences locally.
//!
//! - [`proxy`]: the HTTP service relaying category queries upstream.
//! - [`news`]: the article schema and upstream payload normalization.
//! - [`feed`]: paging, sorting, filtering, and search debounce for one feed.
//! - [`storage`]: the local key/value persistence store.
//! - [`config`]: TOML configuration with environment overrides.

pub mod config;
pub mod feed;
pub mod news;
pub mod proxy;
pub mod storage;
pub mod util;
