//! Machine translation of remark texts.
//!
//! [`TranslationGateway`] owns the set of language codes the backend
//! supports, fetched on first use, and rejects unsupported language pairs
//! without a remote call. [`LingvaBackend`] talks to a Lingva instance.

mod lingva;

pub use lingva::LingvaBackend;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Pseudo language used by backends for source-language detection.
const AUTO_LANGUAGE: &str = "auto";

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("translation service unavailable: {0}")]
    Unavailable(String),
    #[error("language pair {source_lang} -> {target_lang} is not supported")]
    LanguageUnsupported {
        source_lang: String,
        target_lang: String,
    },
    #[error("translation request failed: {0}")]
    RemoteFailure(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Raw access to a translation service.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Language codes the service accepts, possibly including `auto`.
    async fn languages(&self) -> Result<Vec<String>>;

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

pub struct TranslationGateway<B> {
    backend: B,
    languages: RwLock<HashSet<String>>,
}

impl<B: TranslationBackend> TranslationGateway<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            languages: RwLock::new(HashSet::new()),
        }
    }

    /// Replaces the cached language set with a fresh listing from the backend.
    ///
    /// On failure the cache is left untouched.
    pub async fn refresh_languages(&self) -> Result<usize, TranslationError> {
        let fetched = self
            .backend
            .languages()
            .await
            .map_err(|e| TranslationError::Unavailable(e.to_string()))?;

        let languages: HashSet<String> = fetched
            .into_iter()
            .filter(|code| code != AUTO_LANGUAGE)
            .collect();
        let count = languages.len();

        *self.languages.write().await = languages;
        info!(count, "Translation languages refreshed");
        Ok(count)
    }
}

#[async_trait]
impl<B: TranslationBackend> Translator for TranslationGateway<B> {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        if self.languages.read().await.is_empty() {
            self.refresh_languages().await?;
        }

        {
            let languages = self.languages.read().await;
            if !languages.contains(source_lang) || !languages.contains(target_lang) {
                return Err(TranslationError::LanguageUnsupported {
                    source_lang: source_lang.to_string(),
                    target_lang: target_lang.to_string(),
                });
            }
        }

        debug!(source_lang, target_lang, "Requesting translation");
        self.backend
            .translate(text, source_lang, target_lang)
            .await
            .map_err(|e| TranslationError::RemoteFailure(e.to_string()))
    }
}
