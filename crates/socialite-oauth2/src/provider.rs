// Provider trait and the plumbing shared by every provider.
//
// `ProviderBase` carries what all providers need (config, redirect URL,
// scopes, state, transport). `Provider` is the trait each social provider
// implements; it supplies the chainable builders and `redirect()`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use socialite_core::utils::generate_state;
use socialite_core::{HttpClient, ProviderConfig, ReqwestHttpClient, Result, SocialiteError, User};

/// Scope separator used unless a provider or caller overrides it.
pub const DEFAULT_SCOPE_SEPARATOR: &str = ",";

/// State shared by every provider instance.
#[derive(Clone)]
pub struct ProviderBase {
    pub config: ProviderConfig,
    /// Callback URL; initialized from the `redirect` config key.
    pub redirect_url: Option<String>,
    pub scopes: Vec<String>,
    pub scope_separator: String,
    /// CSRF state sent with the authorization request.
    pub state: Option<String>,
    /// When set, no state is generated or sent.
    pub stateless: bool,
    pub http: Arc<dyn HttpClient>,
}

impl fmt::Debug for ProviderBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBase")
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .field("scope_separator", &self.scope_separator)
            .field("stateless", &self.stateless)
            .finish_non_exhaustive()
    }
}

impl ProviderBase {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            redirect_url: config.redirect(),
            config,
            scopes: Vec::new(),
            scope_separator: DEFAULT_SCOPE_SEPARATOR.to_string(),
            state: None,
            stateless: false,
            http: Arc::new(ReqwestHttpClient::new()),
        }
    }

    /// Join the configured scopes with the scope separator.
    pub fn format_scopes(&self) -> String {
        self.scopes.join(&self.scope_separator)
    }

    /// The `client_id` config value; providers cannot build URLs without it.
    pub fn client_id(&self) -> Result<String> {
        self.config
            .client_id()
            .ok_or_else(|| SocialiteError::Config("missing client_id".into()))
    }
}

/// Where to send the user, and the state the callback must echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub url: Url,
    /// The caller stores this and compares it with the callback's `state`.
    pub state: Option<String>,
}

impl RedirectResponse {
    pub fn target_url(&self) -> &str {
        self.url.as_str()
    }
}

/// A social login provider.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    /// Provider identifier (e.g. "wework-provider").
    fn name(&self) -> &str;

    fn base(&self) -> &ProviderBase;

    fn base_mut(&mut self) -> &mut ProviderBase;

    /// The authorization URL for the current scopes and state.
    fn auth_url(&self) -> Result<Url>;

    /// Standard OAuth token endpoint. Empty for providers that obtain tokens
    /// another way.
    fn token_url(&self) -> &str;

    /// Look a user up from an access token.
    async fn user_by_token(&self, token: &str) -> Result<serde_json::Value>;

    /// Exchange an authorization code for a user.
    async fn user_from_code(&mut self, code: &str) -> Result<User>;

    fn config(&self) -> &ProviderConfig {
        &self.base().config
    }

    fn format_scopes(&self) -> String {
        self.base().format_scopes()
    }

    /// Build the redirect, generating a state unless stateless or one was
    /// already supplied.
    fn redirect(&mut self) -> Result<RedirectResponse> {
        let base = self.base_mut();
        if base.stateless {
            base.state = None;
        } else if base.state.is_none() {
            base.state = Some(generate_state());
        }

        let url = self.auth_url()?;
        tracing::debug!(provider = self.name(), url = %url, "built authorization redirect");

        Ok(RedirectResponse {
            url,
            state: self.base().state.clone(),
        })
    }

    fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_mut().scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    fn with_scope_separator(mut self, separator: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().scope_separator = separator.into();
        self
    }

    fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().redirect_url = Some(redirect_url.into());
        self
    }

    fn with_state(mut self, state: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().state = Some(state.into());
        self
    }

    fn stateless(mut self) -> Self
    where
        Self: Sized,
    {
        self.base_mut().stateless = true;
        self
    }

    fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().http = http;
        self
    }
}
