//! End-to-end WeWork flow over real HTTP against a local mock server.

use serde_json::json;
use socialite_core::{ErrorCode, ProviderConfig};
use socialite_oauth2::{Provider, WeWorkProvider};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> ProviderConfig {
    ProviderConfig::new()
        .with("client_id", "ww100000a5f2191")
        .with("redirect", "http://www.oa.com")
        .with("corpid", "ww100000a5f2191")
        .with("corpsecret", "corp-secret")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .and(query_param("corpid", "ww100000a5f2191"))
        .and(query_param("corpsecret", "corp-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "access_token": "API_TOKEN",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn detailed_login_flow() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/getuserinfo"))
        .and(query_param("access_token", "API_TOKEN"))
        .and(query_param("code", "CODE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "UserId": "lisi",
            "DeviceId": "DEVICE",
            "user_ticket": "TICKET",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/user/getuserdetail"))
        .and(query_param("access_token", "API_TOKEN"))
        .and(body_json(json!({"user_ticket": "TICKET"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "userid": "lisi",
            "name": "Li Si",
            "avatar": "https://wework.qpic.cn/avatar/0",
            "email": "lisi@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut provider = WeWorkProvider::new(config())
        .with_api_base_url(server.uri())
        .detailed();

    let user = provider.user_from_code("CODE").await.unwrap();

    assert_eq!(user.id(), Some("lisi"));
    assert_eq!(user.name(), Some("Li Si"));
    assert_eq!(user.email(), Some("lisi@example.com"));
    assert_eq!(user.provider(), Some("wework-provider"));
}

#[tokio::test]
async fn upstream_error_surfaces_as_authorize_failed() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/getuserinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 40029,
            "errmsg": "invalid code"
        })))
        .mount(&server)
        .await;

    let mut provider = WeWorkProvider::new(config()).with_api_base_url(server.uri());

    let err = provider.user_from_code("EXPIRED").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthorizeFailed);
    assert_eq!(err.to_string(), "Failed to get user openid: invalid code");
}
