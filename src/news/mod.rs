//! Article schema at the ingestion boundary.
//!
//! The headline API's JSON is decoded into permissive [`RawArticle`] values
//! and normalized into [`Article`] before anything else in the crate sees it.

mod article;

pub use article::{
    normalize_headlines, parse_headlines, Article, HeadlinesPage, RawArticle, RawHeadlines,
    RawSource, Source, FALLBACK_DESCRIPTION, FALLBACK_TITLE, PLACEHOLDER_IMAGE,
};
