use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;

use super::TranslationBackend;
use crate::fetch::{FetchError, HttpClient, fetch_bytes};

#[derive(Deserialize)]
struct LanguagesResponse {
    languages: Vec<Language>,
}

#[derive(Deserialize)]
struct Language {
    code: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    translation: Option<String>,
    error: Option<String>,
}

/// [`TranslationBackend`] for the Lingva Translate API.
pub struct LingvaBackend<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> LingvaBackend<C> {
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn translate_url(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        format!(
            "{}/api/v1/{}/{}/{}",
            self.base_url,
            source_lang,
            target_lang,
            urlencoding::encode(text)
        )
    }
}

#[async_trait]
impl<C: HttpClient> TranslationBackend for LingvaBackend<C> {
    async fn languages(&self) -> Result<Vec<String>> {
        let bytes = fetch_bytes(&self.http, &format!("{}/api/v1/languages", self.base_url)).await?;
        let response: LanguagesResponse = serde_json::from_slice(&bytes)?;
        Ok(response.languages.into_iter().map(|l| l.code).collect())
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let url = self.translate_url(text, source_lang, target_lang);
        let bytes = match fetch_bytes(&self.http, &url).await {
            Ok(bytes) => bytes,
            // Lingva reports failures as `{"error": ...}` with a 4xx/5xx status.
            Err(FetchError::Status { status, body }) => {
                let reason = parse_reply(body.as_bytes())
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or(body);
                return Err(anyhow!("lingva returned {status}: {reason}"));
            }
            Err(e) => return Err(e.into()),
        };
        parse_reply(&bytes)
    }
}

fn parse_reply(bytes: &[u8]) -> Result<String> {
    let reply: TranslationResponse = serde_json::from_slice(bytes)?;
    match reply {
        TranslationResponse {
            translation: Some(translation),
            ..
        } => Ok(translation),
        TranslationResponse {
            error: Some(error), ..
        } => Err(anyhow!(error)),
        _ => Err(anyhow!("reply has neither a translation nor an error")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::FakeClient;

    #[test]
    fn test_parse_reply_translation() {
        let text = parse_reply(br#"{"translation": "Rail replacement bus"}"#).unwrap();
        assert_eq!(text, "Rail replacement bus");
    }

    #[test]
    fn test_parse_reply_error() {
        let err = parse_reply(br#"{"error": "Invalid target language"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid target language");
    }

    #[test]
    fn test_parse_reply_empty_object() {
        assert!(parse_reply(b"{}").is_err());
        assert!(parse_reply(b"not json").is_err());
    }

    #[test]
    fn test_translate_url_encodes_text() {
        let backend = LingvaBackend::new(FakeClient::new(200, "{}"), "https://lingva.ml/");
        assert_eq!(
            backend.translate_url("Bus & Bahn / S85", "de", "en"),
            "https://lingva.ml/api/v1/de/en/Bus%20%26%20Bahn%20%2F%20S85"
        );
    }

    #[tokio::test]
    async fn test_translate_returns_translation() {
        let backend = LingvaBackend::new(
            FakeClient::new(200, r#"{"translation": "Rail replacement bus"}"#),
            "https://lingva.ml",
        );
        let text = backend.translate("Ersatzverkehr", "de", "en").await.unwrap();
        assert_eq!(text, "Rail replacement bus");
        assert_eq!(
            *backend.http.urls.lock().unwrap(),
            ["https://lingva.ml/api/v1/de/en/Ersatzverkehr"]
        );
    }

    #[tokio::test]
    async fn test_translate_error_status_carries_reason() {
        let backend = LingvaBackend::new(
            FakeClient::new(400, r#"{"error": "Invalid target language"}"#),
            "https://lingva.ml",
        );
        let err = backend.translate("Ersatzverkehr", "de", "xx").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("400"), "{message}");
        assert!(message.contains("Invalid target language"), "{message}");
    }

    #[tokio::test]
    async fn test_languages_lists_codes() {
        let backend = LingvaBackend::new(
            FakeClient::new(
                200,
                r#"{"languages": [{"code": "auto", "name": "Detect"}, {"code": "de", "name": "German"}]}"#,
            ),
            "https://lingva.ml",
        );
        assert_eq!(backend.languages().await.unwrap(), ["auto", "de"]);
    }

    #[tokio::test]
    async fn test_languages_error_status_is_err() {
        let backend = LingvaBackend::new(FakeClient::new(502, "Bad Gateway"), "https://lingva.ml");
        assert!(backend.languages().await.is_err());
    }
}
