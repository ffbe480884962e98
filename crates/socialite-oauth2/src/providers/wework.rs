// WeWork (企业微信) login.
//
// Two login flavours share one provider: in-app OAuth when scopes are set and
// QR-code login otherwise. Users are resolved with the corp-level API access
// token rather than a per-user OAuth token:
//
//   gettoken (corpid + corpsecret) -> getuserinfo (code) [-> getuserdetail (user_ticket)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use url::Url;

use socialite_core::{ProviderConfig, Result, SocialiteError, User};

use crate::authorization_url::build_url;
use crate::provider::{Provider, ProviderBase};

pub const NAME: &str = "wework-provider";

pub const OAUTH_AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
pub const QR_CONNECT_URL: &str = "https://open.work.weixin.qq.com/wwopen/sso/qrConnect";
pub const API_BASE_URL: &str = "https://qyapi.weixin.qq.com";

const OAUTH_FRAGMENT: &str = "wechat_redirect";

const GET_TOKEN_PATH: &str = "/cgi-bin/gettoken";
const GET_USER_INFO_PATH: &str = "/cgi-bin/user/getuserinfo";
const GET_USER_DETAIL_PATH: &str = "/cgi-bin/user/getuserdetail";

const CORP_ID_KEYS: &[&str] = &["corp_id", "corpid"];
const CORP_SECRET_KEYS: &[&str] = &["corp_secret", "corpsecret"];
const AGENT_ID_KEYS: &[&str] = &["agent_id", "agentid"];

/// How much profile data `user_from_code_with` should resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileScope {
    /// Identity only: `UserId`/`OpenId` and `DeviceId`.
    #[default]
    Basic,
    /// Name, avatar and email via `getuserdetail`, when the identity
    /// response carries a `user_ticket`.
    Detailed,
}

#[derive(Debug, Clone)]
pub struct WeWorkProvider {
    base: ProviderBase,
    agent_id: Option<i64>,
    detailed: bool,
    api_access_token: Option<String>,
    api_base_url: String,
}

impl WeWorkProvider {
    /// Create a provider. `agent_id` / `agentid` in the config, when numeric,
    /// become the initial agent id.
    pub fn new(config: ProviderConfig) -> Self {
        let agent_id = config
            .first_of(AGENT_ID_KEYS)
            .and_then(|id| id.parse().ok());

        Self {
            base: ProviderBase::new(config),
            agent_id,
            detailed: false,
            api_access_token: None,
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    pub fn set_agent_id(mut self, agent_id: i64) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn agent_id(&self) -> Option<i64> {
        self.agent_id
    }

    /// Request name/avatar/email on the next `user_from_code`. One-shot: the
    /// flag is cleared when the identity response has no `user_ticket`.
    pub fn detailed(mut self) -> Self {
        self.detailed = true;
        self
    }

    pub fn is_detailed(&self) -> bool {
        self.detailed
    }

    /// Use an API access token obtained elsewhere instead of calling
    /// `gettoken`.
    pub fn with_api_access_token(mut self, token: impl Into<String>) -> Self {
        self.api_access_token = Some(token.into());
        self
    }

    /// Point API calls at another host (a proxy, or a local test server).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// In-app (web page) authorization.
    pub fn oauth_url(&self) -> Result<Url> {
        let scope = self.format_scopes();
        let url = build_url(
            OAUTH_AUTHORIZE_URL,
            &[
                ("appid", Some(self.base.client_id()?)),
                ("redirect_uri", self.base.redirect_url.clone()),
                ("response_type", Some("code".to_string())),
                ("scope", Some(scope)),
                ("agentid", self.agent_id.map(|id| id.to_string())),
                ("state", self.base.state.clone()),
            ],
            Some(OAUTH_FRAGMENT),
        )?;
        Ok(url)
    }

    /// Third-party web login by scanning a QR code.
    pub fn qr_connect_url(&self) -> Result<Url> {
        let url = build_url(
            QR_CONNECT_URL,
            &[
                ("appid", Some(self.base.client_id()?)),
                ("agentid", self.agent_id.map(|id| id.to_string())),
                ("redirect_uri", self.base.redirect_url.clone()),
                ("state", self.base.state.clone()),
            ],
            None,
        )?;
        Ok(url)
    }

    /// The corp API access token, fetched on first use and cached for the
    /// lifetime of this instance.
    pub async fn api_access_token(&mut self) -> Result<String> {
        if let Some(token) = &self.api_access_token {
            return Ok(token.clone());
        }

        let token = self.create_api_access_token().await?;
        self.api_access_token = Some(token.clone());
        Ok(token)
    }

    async fn create_api_access_token(&self) -> Result<String> {
        let url = self.api_url(GET_TOKEN_PATH);
        let query = non_empty_pairs([
            ("corpid", self.base.config.first_of(CORP_ID_KEYS)),
            ("corpsecret", self.base.config.first_of(CORP_SECRET_KEYS)),
        ]);

        tracing::debug!(endpoint = %url, "requesting WeWork api access token");
        let body = self
            .base
            .http
            .get(&url, &query)
            .await?
            .error_for_status(GET_TOKEN_PATH)?
            .json_or_empty();

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        match token {
            Some(token) if is_ok(&body) => Ok(token),
            _ => {
                tracing::warn!(errcode = ?errcode(&body), "WeWork gettoken failed");
                Err(SocialiteError::authorize_failed(
                    format!("Failed to get api access_token: {}", errmsg(&body)),
                    body,
                ))
            }
        }
    }

    async fn user_identity(&self, token: &str, code: &str) -> Result<Value> {
        let url = self.api_url(GET_USER_INFO_PATH);
        let query = non_empty_pairs([
            ("access_token", Some(token.to_string())),
            ("code", Some(code.to_string())),
        ]);

        tracing::debug!(endpoint = %url, "resolving WeWork user identity");
        let body = self
            .base
            .http
            .get(&url, &query)
            .await?
            .error_for_status(GET_USER_INFO_PATH)?
            .json_or_empty();

        // Only corp members, who carry a `UserId`, may log in.
        if !is_ok(&body) || non_empty_str(&body, "UserId").is_none() {
            tracing::warn!(errcode = ?errcode(&body), "WeWork getuserinfo failed");
            return Err(SocialiteError::authorize_failed(
                format!("Failed to get user openid: {}", errmsg(&body)),
                body,
            ));
        }

        Ok(body)
    }

    async fn user_detail(&self, token: &str, ticket: &str) -> Result<Value> {
        let url = self.api_url(GET_USER_DETAIL_PATH);
        let query = non_empty_pairs([("access_token", Some(token.to_string()))]);

        tracing::debug!(endpoint = %url, "fetching WeWork user detail");
        let body = self
            .base
            .http
            .post_json(&url, &query, &json!({ "user_ticket": ticket }))
            .await?
            .error_for_status(GET_USER_DETAIL_PATH)?
            .json_or_empty();

        Ok(body)
    }

    /// Resolve a user with an explicit detail level.
    ///
    /// `Detailed` only takes effect when the identity response carries a
    /// `user_ticket`; otherwise the basic shape is returned and the instance's
    /// `detailed` flag is cleared.
    pub async fn user_from_code_with(&mut self, code: &str, scope: ProfileScope) -> Result<User> {
        let token = self.api_access_token().await?;
        let identity = self.user_identity(&token, code).await?;

        let ticket = identity
            .get("user_ticket")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let (ProfileScope::Detailed, Some(ticket)) = (scope, ticket) {
            let detail = self.user_detail(&token, &ticket).await?;
            return Ok(map_detailed_user(&detail).set_provider(NAME).set_raw(detail));
        }

        self.detailed = false;

        Ok(map_basic_user(&identity).set_provider(NAME).set_raw(identity))
    }
}

#[async_trait]
impl Provider for WeWorkProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn base(&self) -> &ProviderBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProviderBase {
        &mut self.base
    }

    /// Any configured scope selects in-app OAuth; no scopes means QR login.
    fn auth_url(&self) -> Result<Url> {
        if self.base.scopes.is_empty() {
            self.qr_connect_url()
        } else {
            self.oauth_url()
        }
    }

    fn token_url(&self) -> &str {
        ""
    }

    async fn user_by_token(&self, _token: &str) -> Result<Value> {
        Err(SocialiteError::MethodNotSupported(
            "WeWork doesn't support access_token mode".into(),
        ))
    }

    async fn user_from_code(&mut self, code: &str) -> Result<User> {
        let scope = if self.detailed {
            ProfileScope::Detailed
        } else {
            ProfileScope::Basic
        };
        self.user_from_code_with(code, scope).await
    }
}

/// Query pairs with missing or empty values dropped.
fn non_empty_pairs<const N: usize>(pairs: [(&str, Option<String>); N]) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((key.to_string(), v)),
            _ => None,
        })
        .collect()
}

/// `errcode` as a number; WeWork sends an integer but tolerate a string.
fn errcode(body: &Value) -> Option<i64> {
    match body.get("errcode")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Success requires an explicit zero `errcode`.
fn is_ok(body: &Value) -> bool {
    errcode(body) == Some(0)
}

fn errmsg(body: &Value) -> &str {
    body.get("errmsg")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .unwrap_or("Unknown.")
}

/// A string field, or `None` when missing, null or empty.
fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// `UserId`, falling back to `OpenId` when it is empty.
fn identity(body: &Value) -> Option<&str> {
    non_empty_str(body, "UserId").or_else(|| non_empty_str(body, "OpenId"))
}

/// Identity-only user; absent fields are left out rather than set to null.
fn map_basic_user(body: &Value) -> User {
    let mut attributes = Map::new();
    let fields = [
        ("id", identity(body)),
        ("userId", non_empty_str(body, "UserId")),
        ("openid", non_empty_str(body, "OpenId")),
        ("deviceId", non_empty_str(body, "DeviceId")),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            attributes.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    User::new(attributes)
}

/// Detail-endpoint user; every field is present, null when missing.
fn map_detailed_user(body: &Value) -> User {
    let mut attributes = Map::new();
    for (key, source) in [
        ("id", "userid"),
        ("name", "name"),
        ("avatar", "avatar"),
        ("email", "email"),
    ] {
        attributes.insert(
            key.to_string(),
            body.get(source).cloned().unwrap_or(Value::Null),
        );
    }
    User::new(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errcode_parsing() {
        assert_eq!(errcode(&json!({"errcode": 0})), Some(0));
        assert_eq!(errcode(&json!({"errcode": "40029"})), Some(40029));
        assert_eq!(errcode(&json!({"errcode": null})), None);
        assert_eq!(errcode(&json!({})), None);
    }

    #[test]
    fn test_is_ok_requires_zero() {
        assert!(is_ok(&json!({"errcode": 0})));
        assert!(!is_ok(&json!({"errcode": 1})));
        assert!(!is_ok(&json!({"errcode": -1})));
        assert!(!is_ok(&json!({"access_token": "x"})));
    }

    #[test]
    fn test_errmsg_fallback() {
        assert_eq!(errmsg(&json!({"errmsg": "invalid code"})), "invalid code");
        assert_eq!(errmsg(&json!({"errmsg": ""})), "Unknown.");
        assert_eq!(errmsg(&json!({})), "Unknown.");
    }

    #[test]
    fn test_non_empty_pairs() {
        let pairs = non_empty_pairs([
            ("corpid", Some("ww1".to_string())),
            ("corpsecret", Some(String::new())),
            ("code", None),
        ]);
        assert_eq!(pairs, vec![("corpid".to_string(), "ww1".to_string())]);
    }

    #[test]
    fn test_map_basic_user_with_user_id() {
        let user = map_basic_user(&json!({
            "errcode": 0,
            "UserId": "zhangsan",
            "DeviceId": "dev-1"
        }));
        assert_eq!(user.id(), Some("zhangsan"));
        assert_eq!(user.attribute("userId"), Some(&json!("zhangsan")));
        assert_eq!(user.attribute("deviceId"), Some(&json!("dev-1")));
        assert!(!user.has_attribute("openid"));
    }

    #[test]
    fn test_map_basic_user_falls_back_to_open_id() {
        let user = map_basic_user(&json!({"errcode": 0, "UserId": "", "OpenId": "oAbc"}));
        assert_eq!(user.id(), Some("oAbc"));
        assert_eq!(user.attribute("openid"), Some(&json!("oAbc")));
        assert!(!user.has_attribute("userId"));
        assert!(!user.has_attribute("deviceId"));
    }

    #[test]
    fn test_map_detailed_user_sets_nulls() {
        let user = map_detailed_user(&json!({"userid": "lisi", "name": "Li Si"}));
        assert_eq!(user.id(), Some("lisi"));
        assert_eq!(user.name(), Some("Li Si"));
        assert!(user.has_attribute("avatar"));
        assert_eq!(user.attribute("email"), Some(&Value::Null));
    }

    #[test]
    fn test_agent_id_from_config() {
        let provider = WeWorkProvider::new(ProviderConfig::new().with("agentid", "1000002"));
        assert_eq!(provider.agent_id(), Some(1000002));

        let provider = WeWorkProvider::new(ProviderConfig::new().with("agent_id", "not-a-number"));
        assert_eq!(provider.agent_id(), None);
    }

    #[test]
    fn test_api_base_url_trims_slash() {
        let provider = WeWorkProvider::new(ProviderConfig::new())
            .with_api_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            provider.api_url(GET_TOKEN_PATH),
            "http://127.0.0.1:8080/cgi-bin/gettoken"
        );
    }
}
