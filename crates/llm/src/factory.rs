//! Generation client factory.
//!
//! Resolves a provider name to a concrete client and checks that the
//! credential it needs was supplied.

use crate::client::LlmClient;
use crate::providers::ClaudeClient;
use std::sync::Arc;
use taxrag_core::{AppError, AppResult};

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("claude" or "anthropic")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Credential for the provider
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the credential
/// is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "claude" | "anthropic" => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config("Claude provider requires an API key".to_string())
                })?;

            let client = match endpoint {
                Some(url) => ClaudeClient::with_base_url(url, api_key),
                None => ClaudeClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: claude",
            provider
        ))),
    }
}
