use std::error::Error as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;

use crate::{
    registry::resolve_target, text::truncate_chars, CatalogEntry, CatalogError, ClientBuildError,
    InvokeError, RawSkillResponse, SkillCatalog, SkillInvoker, SkillParams,
};

pub const DEFAULT_PORT: u16 = 8090;
pub const CALL_TIMEOUT_MS: u64 = 30_000;
pub const CATALOG_TIMEOUT_MS: u64 = 10_000;
pub const HEALTH_TIMEOUT_MS: u64 = 2_000;
const DIAGNOSTIC_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the caller wants to address an editor instance.
pub enum ClientTarget {
    /// Full base URL override.
    Url(String),
    /// Explicit localhost port.
    Port(u16),
    /// Instance id or name looked up in the registry.
    Instance {
        token: String,
        registry_path: PathBuf,
    },
    /// The well-known default port.
    Default,
}

impl ClientTarget {
    /// Resolves the target to a base URL. Only `Instance` touches the registry.
    pub fn base_url(&self) -> Result<String, ClientBuildError> {
        match self {
            Self::Url(url) => Ok(url.trim().to_string()),
            Self::Port(port) => Ok(localhost_url(*port)),
            Self::Instance {
                token,
                registry_path,
            } => Ok(localhost_url(resolve_target(registry_path, token)?)),
            Self::Default => Ok(localhost_url(DEFAULT_PORT)),
        }
    }
}

fn localhost_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

#[derive(Debug, Clone)]
/// Connection settings for one editor instance.
pub struct SkillsClientConfig {
    pub base_url: String,
    pub call_timeout_ms: u64,
}

impl SkillsClientConfig {
    pub fn for_target(target: &ClientTarget) -> Result<Self, ClientBuildError> {
        Ok(Self {
            base_url: target.base_url()?,
            call_timeout_ms: CALL_TIMEOUT_MS,
        })
    }
}

impl Default for SkillsClientConfig {
    fn default() -> Self {
        Self {
            base_url: localhost_url(DEFAULT_PORT),
            call_timeout_ms: CALL_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP client bound to a single editor instance.
pub struct SkillsClient {
    client: reqwest::Client,
    base: Url,
    config: SkillsClientConfig,
}

impl SkillsClient {
    pub fn new(config: SkillsClientConfig) -> Result<Self, ClientBuildError> {
        let base = Url::parse(config.base_url.trim()).map_err(|error| {
            ClientBuildError::InvalidUrl {
                url: config.base_url.clone(),
                reason: error.to_string(),
            }
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientBuildError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "expected an http(s) base URL".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn connect(target: &ClientTarget) -> Result<Self, ClientBuildError> {
        Self::new(SkillsClientConfig::for_target(target)?)
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Probes `GET /health`; any failure counts as "not running".
    pub async fn health(&self) -> bool {
        let response = self
            .client
            .get(self.endpoint(&["health"]))
            .timeout(Duration::from_millis(HEALTH_TIMEOUT_MS))
            .send()
            .await;
        let body = match response {
            Ok(response) => response.json::<Value>().await,
            Err(error) => Err(error),
        };
        match body {
            Ok(body) => body.get("status").and_then(Value::as_str) == Some("ok"),
            Err(error) => {
                tracing::debug!(base_url = self.base_url(), error = %error, "health probe failed");
                false
            }
        }
    }

    /// Fetches the skill catalog in declaration order. Never retried.
    ///
    /// Only a failed request or an undecodable envelope is an error; a bad
    /// descriptor comes back as [`CatalogEntry::Malformed`].
    pub async fn list_skills(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response = self
            .client
            .get(self.endpoint(&["skills"]))
            .timeout(Duration::from_millis(CATALOG_TIMEOUT_MS))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                body: truncate_chars(&text, DIAGNOSTIC_MAX_CHARS),
            });
        }

        let catalog: SkillCatalog = serde_json::from_str(&text)?;
        for entry in &catalog.skills {
            if let CatalogEntry::Malformed { name, reason } = entry {
                tracing::warn!(skill = %name, reason = %reason, "malformed skill descriptor");
            }
        }
        tracing::debug!(
            base_url = self.base_url(),
            skills = catalog.skills.len(),
            "skill catalog fetched"
        );
        Ok(catalog.skills)
    }

    /// Plain invocation used outside verification runs. `verbose` is
    /// forwarded to the editor as-is.
    pub async fn call(
        &self,
        skill: &str,
        mut params: SkillParams,
        verbose: bool,
    ) -> Result<Value, InvokeError> {
        params.insert("verbose".to_string(), Value::Bool(verbose));
        let timeout = Duration::from_millis(self.config.call_timeout_ms.max(1));
        let response = self.invoke(skill, &params, timeout).await?;
        Ok(response.body)
    }

    fn map_request_error(&self, error: reqwest::Error, timeout_ms: u64) -> InvokeError {
        if error.is_timeout() {
            return InvokeError::Timeout { timeout_ms };
        }
        let detail = error_chain_text(&error);
        let message = if error.is_connect() {
            format!(
                "connection failed to {}; the Unity instance may be down ({detail})",
                self.base_url()
            )
        } else {
            detail
        };
        InvokeError::Transport(truncate_chars(&message, DIAGNOSTIC_MAX_CHARS))
    }
}

#[async_trait]
impl SkillInvoker for SkillsClient {
    async fn invoke(
        &self,
        skill: &str,
        params: &SkillParams,
        timeout: Duration,
    ) -> Result<RawSkillResponse, InvokeError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint(&["skill", skill]))
            .timeout(timeout)
            .json(params)
            .send()
            .await
            .map_err(|error| self.map_request_error(error, timeout_ms))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|error| self.map_request_error(error, timeout_ms))?;
        tracing::debug!(
            skill,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "skill invocation completed"
        );

        let body = decode_response_body(&text)?;
        Ok(RawSkillResponse { status, body })
    }
}

/// Every response body must be JSON, whatever the status code.
fn decode_response_body(text: &str) -> Result<Value, InvokeError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        InvokeError::Transport(truncate_chars(
            &format!("malformed response body: {error}"),
            DIAGNOSTIC_MAX_CHARS,
        ))
    })
}

fn error_chain_text(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
