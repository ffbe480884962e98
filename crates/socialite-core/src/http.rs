// Pluggable HTTP transport used by providers.
//
// Providers only need two shapes of request: a GET with a query string and a
// POST with a query string and a JSON body. `ReqwestHttpClient` is the default
// implementation; tests substitute a scripted client.

use std::fmt;

use async_trait::async_trait;

use crate::error::{Result, SocialiteError};

/// Query string pairs, appended in order.
pub type Query = [(String, String)];

/// A buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. Bodies that are not valid JSON, or decode to
    /// `null`, become an empty object so callers can probe fields uniformly.
    pub fn json_or_empty(&self) -> serde_json::Value {
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::Null) | Err(_) => serde_json::Value::Object(Default::default()),
            Ok(value) => value,
        }
    }

    /// Turn a non-2xx response into `SocialiteError::Http`.
    pub fn error_for_status(self, endpoint: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(SocialiteError::Http(format!(
            "{endpoint} returned {}: {}",
            self.status, self.body
        )))
    }
}

/// The transport seam between providers and the network.
#[async_trait]
pub trait HttpClient: Send + Sync + fmt::Debug {
    async fn get(&self, url: &str, query: &Query) -> Result<HttpResponse>;

    async fn post_json(
        &self,
        url: &str,
        query: &Query,
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn buffer(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, query: &Query) -> Result<HttpResponse> {
        tracing::debug!(url, params = query.len(), "sending GET request");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| SocialiteError::Http(format!("GET {url} failed: {e}")))?;
        Self::buffer(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        query: &Query,
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        tracing::debug!(url, params = query.len(), "sending POST request");
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| SocialiteError::Http(format!("POST {url} failed: {e}")))?;
        Self::buffer(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_json_or_empty_on_garbage() {
        let response = HttpResponse::new(200, "<html>oops</html>");
        assert_eq!(response.json_or_empty(), json!({}));
    }

    #[test]
    fn test_json_or_empty_on_null() {
        let response = HttpResponse::new(200, "null");
        assert_eq!(response.json_or_empty(), json!({}));
    }

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(204, "").error_for_status("x").is_ok());

        let err = HttpResponse::new(502, "bad gateway")
            .error_for_status("gettoken")
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: gettoken returned 502: bad gateway");
    }

    #[tokio::test]
    async fn test_reqwest_get_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/gettoken"))
            .and(query_param("corpid", "ww1"))
            .and(query_param("corpsecret", "s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errcode": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let response = client
            .get(
                &format!("{}/cgi-bin/gettoken", server.uri()),
                &query(&[("corpid", "ww1"), ("corpsecret", "s")]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.json_or_empty(), json!({"errcode": 0}));
    }

    #[tokio::test]
    async fn test_reqwest_post_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/user/getuserdetail"))
            .and(query_param("access_token", "tok"))
            .and(body_json(json!({"user_ticket": "ticket"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userid": "u1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let response = client
            .post_json(
                &format!("{}/cgi-bin/user/getuserdetail", server.uri()),
                &query(&[("access_token", "tok")]),
                &json!({"user_ticket": "ticket"}),
            )
            .await
            .unwrap();

        assert_eq!(response.json_or_empty()["userid"], "u1");
    }

    #[tokio::test]
    async fn test_reqwest_keeps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let response = ReqwestHttpClient::new()
            .get(&server.uri(), &[])
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert!(!response.is_success());
        assert_eq!(response.body, "boom");
    }
}
