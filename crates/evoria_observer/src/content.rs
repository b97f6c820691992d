//! The AI content service boundary (spec §6/§9): description enrichment
//! and adaptation advice, issued only from here, never trusted as the
//! source of legality. Mirrors the teacher's `Narrator` trait shape
//! (`async_trait`, a heuristic fallback, a thin request/response struct).

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{ObserverError, Result};

/// A single content request: a named prompt plus its structured payload
/// (spec §6's `invoke(prompt_name, payload)`).
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub prompt_name: String,
    pub payload: serde_json::Value,
}

/// The service's response: a `content` map. Any shape mismatch the caller
/// expects is treated as a validation failure, never a panic (spec §7
/// kind 2).
#[derive(Debug, Clone)]
pub struct ContentResponse {
    pub content: HashMap<String, serde_json::Value>,
}

impl ContentResponse {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(|v| v.as_str())
    }
}

/// Implemented by both the deterministic test stub and (eventually) a real
/// hosted-model client; the engine never depends on which.
#[async_trait]
pub trait AiContentService: Send + Sync {
    async fn invoke(&self, request: ContentRequest) -> Result<ContentResponse>;
}

/// Echoes the fixed content spec §8's scenarios expect
/// (`latin_name="Test species"`, `common_name="测试种"`), so deterministic
/// integration tests never depend on a real model.
pub struct DeterministicAiStub;

#[async_trait]
impl AiContentService for DeterministicAiStub {
    async fn invoke(&self, request: ContentRequest) -> Result<ContentResponse> {
        let mut content = HashMap::new();
        match request.prompt_name.as_str() {
            "species_description" => {
                content.insert("latin_name".to_string(), serde_json::json!("Test species"));
                content.insert("common_name".to_string(), serde_json::json!("测试种"));
                content.insert("description".to_string(), serde_json::json!("A species under observation."));
            }
            "adaptation_advice" => {
                content.insert("advice".to_string(), serde_json::json!("Maintain current trait allocation."));
            }
            other => return Err(ObserverError::validation(format!("unknown prompt {other}"))),
        }
        Ok(ContentResponse { content })
    }
}

/// Rule-based fallback used after three consecutive AI failures (spec §7
/// kind 2) or whenever no AI service is configured at all. Never fails:
/// the rules engine is always available, matching the teacher's
/// `HeuristicNarrator` always-available contract.
pub struct RuleBasedContentService;

#[async_trait]
impl AiContentService for RuleBasedContentService {
    async fn invoke(&self, request: ContentRequest) -> Result<ContentResponse> {
        let mut content = HashMap::new();
        match request.prompt_name.as_str() {
            "species_description" => {
                let lineage = request.payload.get("lineage_code").and_then(|v| v.as_str()).unwrap_or("unknown");
                content.insert("description".to_string(), serde_json::json!(format!("Lineage {lineage}, newly catalogued.")));
            }
            "adaptation_advice" => {
                content.insert("advice".to_string(), serde_json::json!("No specific pressure detected; continue current strategy."));
            }
            other => return Err(ObserverError::validation(format!("unknown prompt {other}"))),
        }
        Ok(ContentResponse { content })
    }
}

/// Counts consecutive AI failures and decides when to fall back to the
/// rule-based service (spec §7 kind 2: "after three consecutive failures
/// the AI path is skipped").
pub struct FallbackGate {
    consecutive_failures: u32,
    threshold: u32,
}

impl FallbackGate {
    pub fn new(threshold: u32) -> Self {
        Self { consecutive_failures: 0, threshold }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
    }

    pub fn should_use_fallback(&self) -> bool {
        self.consecutive_failures >= self.threshold
    }
}

impl Default for FallbackGate {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deterministic_stub_echoes_fixed_content() {
        let stub = DeterministicAiStub;
        let response = stub
            .invoke(ContentRequest { prompt_name: "species_description".to_string(), payload: serde_json::json!({}) })
            .await
            .unwrap();
        assert_eq!(response.get_str("latin_name"), Some("Test species"));
        assert_eq!(response.get_str("common_name"), Some("测试种"));
    }

    #[tokio::test]
    async fn rule_based_service_never_fails() {
        let service = RuleBasedContentService;
        let response = service
            .invoke(ContentRequest {
                prompt_name: "species_description".to_string(),
                payload: serde_json::json!({ "lineage_code": "A1" }),
            })
            .await
            .unwrap();
        assert!(response.get_str("description").unwrap().contains("A1"));
    }

    #[test]
    fn fallback_gate_trips_after_threshold() {
        let mut gate = FallbackGate::default();
        assert!(!gate.should_use_fallback());
        gate.record_failure();
        gate.record_failure();
        assert!(!gate.should_use_fallback());
        gate.record_failure();
        assert!(gate.should_use_fallback());
        gate.record_success();
        assert!(!gate.should_use_fallback());
    }
}
