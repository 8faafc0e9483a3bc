//! The unit-of-work capability run by the round executor

use crate::engine::outcome::{Outcome, Target};
use async_trait::async_trait;

/// One network action performed per target
///
/// Implementations must never panic or return errors for a single target:
/// every failure is folded into the returned [`Outcome`]. An operation holds
/// no mutable state, so running it twice against the same server state
/// yields the same classification.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Shared, read-only handle used to reach the server
    type Client: Send + Sync;

    /// Record produced on success (`()` for write-only actions)
    type Payload: Send;

    /// Short name used in logs and the run history
    fn name(&self) -> &'static str;

    async fn execute(&self, target: &Target, client: &Self::Client) -> Outcome<Self::Payload>;
}
