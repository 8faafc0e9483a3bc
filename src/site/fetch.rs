//! Fetch-and-extract operation: `GET {base}/blog/spider/blogs/{key}`

use crate::engine::{FailureReason, Operation, Outcome, Target};
use crate::site::article::{parse_article, ArticleRecord};
use crate::site::classify::{status_outcome, transport_outcome};
use crate::site::client::SiteClient;
use crate::site::resource_key;
use async_trait::async_trait;
use reqwest::header::REFERER;
use std::time::Duration;

/// Reads an article's JSON record
#[derive(Debug, Clone)]
pub struct FetchArticle {
    timeout: Duration,
}

impl FetchArticle {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for FetchArticle {
    fn default() -> Self {
        Self::new(Duration::from_secs(20))
    }
}

#[async_trait]
impl Operation for FetchArticle {
    type Client = SiteClient;
    type Payload = ArticleRecord;

    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn execute(&self, target: &Target, client: &SiteClient) -> Outcome<ArticleRecord> {
        let Some(key) = resource_key(target.as_str()) else {
            return Outcome::permanent(
                target.clone(),
                FailureReason::InvalidTarget("no resource key in URL".to_string()),
            );
        };

        let endpoint = match client.article_endpoint(&key) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                return Outcome::permanent(target.clone(), FailureReason::InvalidTarget(e.to_string()))
            }
        };

        tracing::trace!("GET {} (referer {})", endpoint, target);
        let response = match client
            .http()
            .get(endpoint)
            .header(REFERER, target.as_str())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_outcome(target, &e),
        };

        if let Some(failure) = status_outcome(target, response.status()) {
            return failure;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return transport_outcome(target, &e),
        };

        match parse_article(&key, target.as_str(), &body) {
            Ok(record) => Outcome::success(target.clone(), record),
            Err(reason) => Outcome::permanent(target.clone(), reason),
        }
    }
}
