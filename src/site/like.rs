//! Submit-action operation: `POST {article}/like`
//!
//! Liking is idempotent on the server, so resubmitting a target whose
//! earlier attempt timed out after reaching the server is harmless.

use crate::engine::{FailureReason, Operation, Outcome, Target};
use crate::site::classify::{status_outcome, transport_outcome};
use crate::site::client::SiteClient;
use crate::site::like_endpoint;
use async_trait::async_trait;
use reqwest::header::REFERER;
use std::time::Duration;

/// Likes an article
#[derive(Debug, Clone)]
pub struct LikeArticle {
    timeout: Duration,
}

impl LikeArticle {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LikeArticle {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl Operation for LikeArticle {
    type Client = SiteClient;
    type Payload = ();

    fn name(&self) -> &'static str {
        "like"
    }

    async fn execute(&self, target: &Target, client: &SiteClient) -> Outcome<()> {
        let endpoint = match like_endpoint(target.as_str()) {
            Some(endpoint) => endpoint,
            None => {
                return Outcome::permanent(
                    target.clone(),
                    FailureReason::InvalidTarget("not an absolute URL".to_string()),
                )
            }
        };

        tracing::trace!("POST {} (referer {})", endpoint, target);
        let response = match client
            .http()
            .post(endpoint)
            .header(REFERER, target.as_str())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_outcome(target, &e),
        };

        match status_outcome(target, response.status()) {
            Some(failure) => failure,
            None => Outcome::completed(target.clone()),
        }
    }
}
