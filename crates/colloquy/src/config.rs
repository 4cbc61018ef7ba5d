use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Default API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
/// Header carrying the API version.
pub const HDR_API_VERSION: &str = "anthropic-version";
/// Header carrying opted-in beta features.
pub const HDR_BETA: &str = "anthropic-beta";
/// Header carrying the API key.
pub const HDR_API_KEY: &str = "x-api-key";

/// Authentication method for the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// API key sent in the `x-api-key` header.
    ApiKey(String),
    /// Bearer token sent in the `Authorization` header.
    Bearer(String),
    /// Both an API key and a bearer token.
    Both {
        /// API key for the `x-api-key` header.
        api_key: String,
        /// Bearer token for the `Authorization` header.
        bearer: String,
    },
    /// No credentials configured.
    None,
}

/// Configuration for [`Client`](crate::Client).
///
/// Reads credentials from the environment by default; all fields can be
/// overridden with the `with_*` builders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    base_url: String,
    version: String,
    #[serde(skip)]
    auth: Auth,
    #[serde(skip)]
    beta: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let bearer = std::env::var("ANTHROPIC_AUTH_TOKEN").ok();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let auth = match (api_key, bearer) {
            (Some(k), Some(t)) => Auth::Both {
                api_key: k,
                bearer: t,
            },
            (Some(k), None) => Auth::ApiKey(k),
            (None, Some(t)) => Auth::Bearer(t),
            _ => Auth::None,
        };

        Self {
            base_url,
            version: DEFAULT_API_VERSION.into(),
            auth,
            beta: vec![],
        }
    }
}

impl ApiConfig {
    /// Creates a configuration from environment variables.
    ///
    /// - `ANTHROPIC_API_KEY` for API key authentication
    /// - `ANTHROPIC_AUTH_TOKEN` for bearer token authentication
    /// - `ANTHROPIC_BASE_URL` for a custom endpoint
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    /// Sets the API version string.
    #[must_use]
    pub fn with_version(mut self, v: impl Into<String>) -> Self {
        self.version = v.into();
        self
    }

    /// Sets API key authentication.
    #[must_use]
    pub fn with_api_key(mut self, k: impl Into<String>) -> Self {
        self.auth = Auth::ApiKey(k.into());
        self
    }

    /// Sets bearer token authentication.
    #[must_use]
    pub fn with_bearer(mut self, t: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(t.into());
        self
    }

    /// Sets beta feature strings, sent comma-joined in the beta header.
    #[must_use]
    pub fn with_beta<I, S>(mut self, beta: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.beta = beta.into_iter().map(Into::into).collect();
        self
    }

    /// Sets beta features using the typed [`BetaFeature`] enum.
    #[must_use]
    pub fn with_beta_features<I: IntoIterator<Item = BetaFeature>>(mut self, features: I) -> Self {
        self.beta = features.into_iter().map(Into::<String>::into).collect();
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that some credential is configured.
    pub fn validate_auth(&self) -> Result<(), crate::error::Error> {
        match &self.auth {
            Auth::None => Err(crate::error::Error::Config(
                "missing credentials: set ANTHROPIC_API_KEY or ANTHROPIC_AUTH_TOKEN".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Configuration seam consumed by [`Client`](crate::Client).
///
/// Implement this to supply custom authentication, routing, or headers; the
/// transport owns these concerns so the streaming core never sees them.
pub trait Config: Send + Sync {
    /// HTTP headers to include in every request.
    fn headers(&self) -> Result<HeaderMap, crate::error::Error>;

    /// Full URL for an API path.
    fn url(&self, path: &str) -> String;

    /// Query parameters to include in every request.
    fn query(&self) -> Vec<(&str, &str)>;

    /// Checks that authentication is properly configured.
    fn validate_auth(&self) -> Result<(), crate::error::Error>;
}

impl Config for ApiConfig {
    fn headers(&self) -> Result<HeaderMap, crate::error::Error> {
        use crate::error::Error;

        let mut h = HeaderMap::new();

        h.insert(
            HDR_API_VERSION,
            HeaderValue::from_str(&self.version)
                .map_err(|_| Error::Config("invalid api version header".into()))?,
        );

        if !self.beta.is_empty() {
            let v = self.beta.join(",");
            h.insert(
                HDR_BETA,
                HeaderValue::from_str(&v)
                    .map_err(|_| Error::Config("invalid beta header".into()))?,
            );
        }

        match &self.auth {
            Auth::ApiKey(k) => {
                h.insert(
                    HDR_API_KEY,
                    HeaderValue::from_str(k)
                        .map_err(|_| Error::Config("invalid x-api-key value".into()))?,
                );
            }
            Auth::Bearer(t) => {
                let v = format!("Bearer {t}");
                h.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&v)
                        .map_err(|_| Error::Config("invalid Authorization header".into()))?,
                );
            }
            Auth::Both { api_key, bearer } => {
                h.insert(
                    HDR_API_KEY,
                    HeaderValue::from_str(api_key)
                        .map_err(|_| Error::Config("invalid x-api-key value".into()))?,
                );
                let v = format!("Bearer {bearer}");
                h.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&v)
                        .map_err(|_| Error::Config("invalid Authorization header".into()))?,
                );
            }
            Auth::None => {}
        }

        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn query(&self) -> Vec<(&str, &str)> {
        vec![]
    }

    fn validate_auth(&self) -> Result<(), crate::error::Error> {
        self.validate_auth()
    }
}

/// Known beta feature strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetaFeature {
    /// Prompt caching (2024-07-31).
    PromptCaching20240731,
    /// Extended cache TTL (2025-04-11).
    ExtendedCacheTtl20250411,
    /// Token counting (2024-11-01).
    TokenCounting20241101,
    /// Message batches (2024-09-24).
    MessageBatches20240924,
    /// Structured outputs (2025-11-13).
    StructuredOutputs20251113,
    /// Any other beta feature string.
    Other(String),
}

impl From<BetaFeature> for String {
    fn from(b: BetaFeature) -> Self {
        match b {
            BetaFeature::PromptCaching20240731 => "prompt-caching-2024-07-31".into(),
            BetaFeature::ExtendedCacheTtl20250411 => "extended-cache-ttl-2025-04-11".into(),
            BetaFeature::TokenCounting20241101 => "token-counting-2024-11-01".into(),
            BetaFeature::MessageBatches20240924 => "message-batches-2024-09-24".into(),
            BetaFeature::StructuredOutputs20251113 => "structured-outputs-2025-11-13".into(),
            BetaFeature::Other(s) => s,
        }
    }
}
