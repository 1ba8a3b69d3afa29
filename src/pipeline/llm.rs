//! Vision model access: the [`ProductModel`] seam and its LLM-backed default.
//!
//! The catalog builder only needs "prompt + image in, text out". That contract
//! is the [`ProductModel`] trait, so tests and alternative backends can stand
//! in for a real provider. [`LlmProductModel`] implements it on top of any
//! `edgequake_llm` provider (OpenAI, Gemini, Anthropic, Ollama, …).
//!
//! Each image gets exactly one attempt. A failed or timed-out call becomes an
//! [`ItemError`] for that upload and the batch moves on.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, ItemError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Generates a catalog reply for one product image.
#[async_trait]
pub trait ProductModel: Send + Sync {
    /// Send `prompt` together with `image` and return the model's text.
    async fn generate(&self, prompt: &str, image: ImageData) -> Result<String, ItemError>;
}

/// [`ProductModel`] backed by an `edgequake_llm` provider.
pub struct LlmProductModel {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmProductModel {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &CatalogConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }

    /// Resolve the provider from `config` and wrap it.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl ProductModel for LlmProductModel {
    /// The prompt and the image travel in a single user turn, which every
    /// vision provider accepts; no system message is needed.
    async fn generate(&self, prompt: &str, image: ImageData) -> Result<String, ItemError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user_with_images(prompt, vec![image])];

        match self.provider.chat(&messages, Some(&self.options)).await {
            Ok(response) => {
                debug!(
                    "{} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Err(e) => {
                let detail = format!("{}", e);
                warn!("Model call failed — {}", detail);
                Err(ItemError::ModelFailed { detail })
            }
        }
    }
}

/// Call `model` with a deadline, mapping an elapsed deadline to
/// [`ItemError::ModelTimeout`].
pub async fn generate_with_timeout(
    model: &dyn ProductModel,
    prompt: &str,
    image: ImageData,
    timeout_secs: u64,
) -> Result<String, ItemError> {
    match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        model.generate(prompt, image),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!("Model call timed out after {}s", timeout_secs);
            Err(ItemError::ModelTimeout { secs: timeout_secs })
        }
    }
}

/// Build `CompletionOptions` from the catalog config.
fn build_options(config: &CatalogConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Default vision model for a named provider.
pub fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" => "gemini-2.0-flash",
        "anthropic" => "claude-sonnet-4-20250514",
        "ollama" => "llama3.2-vision",
        _ => "gpt-4.1-nano",
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, CatalogError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        CatalogError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or the
///    provider's default vision model.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Full auto-detection** (`ProviderFactory::from_env`), which scans the
///    known API key variables.
pub fn resolve_provider(config: &CatalogConfig) -> Result<Arc<dyn LLMProvider>, CatalogError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config
            .model
            .as_deref()
            .unwrap_or_else(|| default_model_for(name));
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| CatalogError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
