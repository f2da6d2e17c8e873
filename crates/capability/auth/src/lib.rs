//! 会话认证：以邮箱/密码换取一次运行使用的 Bearer token。

use api_contract::{LoginRequest, LoginResponse};
use async_trait::async_trait;
use domain::SessionToken;
use reqwest::StatusCode;
use tracing::info;

/// 认证相关错误。整轮运行都依赖 token，任何一种都会终止本轮。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication failed: status {status}, body {body}")]
    Rejected { status: u16, body: String },
    #[error("authentication response carries no token")]
    MissingToken,
    #[error("invalid authentication response: {0}")]
    InvalidResponse(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// 登录凭据（进程内只读，不落盘）。
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// 认证能力 trait，便于替换实现与测试。
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<SessionToken, AuthError>;
}

/// 基于 HTTP 登录接口的认证实现。
pub struct HttpAuthenticator {
    client: reqwest::Client,
    login_url: String,
    credentials: Credentials,
}

impl HttpAuthenticator {
    pub fn new(client: reqwest::Client, login_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            login_url: login_url.into(),
            credentials,
        }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self) -> Result<SessionToken, AuthError> {
        authenticate(
            &self.client,
            &self.login_url,
            &self.credentials.email,
            &self.credentials.password,
        )
        .await
    }
}

/// POST 凭据到登录接口；仅 200 且 `data` 为非空字符串时视为成功。
pub async fn authenticate(
    client: &reqwest::Client,
    login_url: &str,
    email: &str,
    password: &str,
) -> Result<SessionToken, AuthError> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = client
        .post(login_url)
        .json(&request)
        .send()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;
    if status != StatusCode::OK {
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: LoginResponse =
        serde_json::from_str(&body).map_err(|err| AuthError::InvalidResponse(err.to_string()))?;
    match parsed.data {
        Some(token) if !token.is_empty() => {
            info!("session token acquired");
            Ok(SessionToken::new(token))
        }
        _ => Err(AuthError::MissingToken),
    }
}
