//! The "staggered gather" bounded-concurrency pattern (spec §5): new AI
//! tasks start at a fixed interval under a concurrency cap, each with a
//! hard timeout; all are joined before the caller proceeds, and a failed
//! or timed-out task resolves to `None` rather than aborting its siblings.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::content::{AiContentService, ContentRequest, ContentResponse};

pub struct StaggeredGatherConfig {
    /// Delay between launching successive requests.
    pub start_interval: Duration,
    /// Max requests in flight at once.
    pub concurrency_cap: usize,
    /// Per-request hard timeout.
    pub per_call_timeout: Duration,
}

impl Default for StaggeredGatherConfig {
    fn default() -> Self {
        Self { start_interval: Duration::from_secs(2), concurrency_cap: 3, per_call_timeout: Duration::from_secs(60) }
    }
}

/// Runs every request through `service`, staggering launches and capping
/// concurrency, and returns one slot per input request: `Some(response)`
/// on success, `None` on timeout or service error (the caller falls back
/// to rule-based content for those slots).
pub async fn staggered_gather(
    service: Arc<dyn AiContentService>,
    requests: Vec<ContentRequest>,
    cfg: &StaggeredGatherConfig,
) -> Vec<Option<ContentResponse>> {
    let semaphore = Arc::new(Semaphore::new(cfg.concurrency_cap));
    let mut ticker = tokio::time::interval(cfg.start_interval);
    let mut tasks = Vec::with_capacity(requests.len());

    for request in requests {
        // First tick fires immediately; only stagger subsequent launches.
        if !tasks.is_empty() {
            ticker.tick().await;
        }
        let service = Arc::clone(&service);
        let semaphore = Arc::clone(&semaphore);
        let timeout = cfg.per_call_timeout;
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            match tokio::time::timeout(timeout, service.invoke(request)).await {
                Ok(Ok(response)) => Some(response),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "AI content call failed, falling back to rules engine");
                    None
                }
                Err(_) => {
                    tracing::warn!("AI content call timed out, falling back to rules engine");
                    None
                }
            }
        }));
    }

    join_all(tasks).await.into_iter().map(|r| r.unwrap_or(None)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DeterministicAiStub;

    #[tokio::test]
    async fn all_requests_resolve() {
        let cfg = StaggeredGatherConfig {
            start_interval: Duration::from_millis(1),
            concurrency_cap: 2,
            per_call_timeout: Duration::from_secs(1),
        };
        let requests = vec![
            ContentRequest { prompt_name: "species_description".to_string(), payload: serde_json::json!({}) },
            ContentRequest { prompt_name: "adaptation_advice".to_string(), payload: serde_json::json!({}) },
        ];
        let results = staggered_gather(Arc::new(DeterministicAiStub), requests, &cfg).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_some()));
    }

    #[tokio::test]
    async fn unknown_prompt_falls_back_to_none() {
        let cfg = StaggeredGatherConfig::default();
        let requests = vec![ContentRequest { prompt_name: "bogus".to_string(), payload: serde_json::json!({}) }];
        let results = staggered_gather(Arc::new(DeterministicAiStub), requests, &cfg).await;
        assert_eq!(results, vec![None]);
    }
}
