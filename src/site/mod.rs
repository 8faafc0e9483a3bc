//! HTTP side of the sweep
//!
//! This module contains everything that knows about the blog itself:
//! - The authenticated client built from the session cookies
//! - The status / transport error classification table
//! - Per-target endpoint derivation
//! - The fetch-and-extract and like operations

mod article;
mod classify;
mod client;
mod fetch;
mod like;

pub use article::{parse_article, ArticleRecord};
pub use classify::{
    classify_status, classify_transport, status_outcome, transport_outcome, TransportFault,
    DEFAULT_STATUS_CLASS, STATUS_POLICY, SUCCESS_STATUS, TRANSPORT_POLICY,
};
pub use client::{build_http_client, SiteClient};
pub use fetch::FetchArticle;
pub use like::LikeArticle;

use url::Url;

/// Derives the resource key of an article URL: its last non-empty path segment
///
/// # Example
///
/// ```
/// use sumi_sweep::site::resource_key;
///
/// assert_eq!(resource_key("https://blog.example.com/post/42/").as_deref(), Some("42"));
/// assert_eq!(resource_key("https://blog.example.com/"), None);
/// ```
pub fn resource_key(target: &str) -> Option<String> {
    let url = Url::parse(target).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// The like endpoint of an article: `{article}/like`
pub fn like_endpoint(target: &str) -> Option<Url> {
    let mut url = Url::parse(target).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push("like");
    Some(url)
}
