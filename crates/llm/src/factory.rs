//! LLM provider factory.
//!
//! Builds the answer generator client from application configuration.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use crate::types::ProviderType;
use clearance_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Optional request deadline; expiry surfaces as `AppError::Llm`
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = match timeout {
                Some(timeout) => OllamaClient::with_timeout(base_url, timeout),
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        None => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
