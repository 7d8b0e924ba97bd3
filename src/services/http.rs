use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::errors::{ConsoleError, ConsoleResult, ErrorBody};
use crate::models::{Permission, PermissionCategory, Role, RoleCreateRequest, RoleUpdateRequest};
use crate::services::{PermissionCatalogService, RoleService};

/// Status the backend answers with when the session token has gone stale.
/// The backend rotates the token in that response, so one retry suffices.
const STALE_SESSION_STATUS: u16 = 419;

fn gateway_user_agent() -> String {
    format!("widget-console/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP implementation of both collaborator services, speaking to the admin
/// backend's REST API.
pub struct HttpAdminGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpAdminGateway {
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(gateway_user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    /// Send the request, retrying exactly once when the session token is
    /// reported stale.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ConsoleResult<reqwest::Response> {
        let response = self.request(method.clone(), path, body).send().await?;

        if response.status().as_u16() == STALE_SESSION_STATUS {
            tracing::warn!(path = %path, "stale session token, retrying once");
            let retried = self.request(method, path, body).send().await?;
            return Self::check(retried).await;
        }

        Self::check(response).await
    }

    /// Map non-2xx responses into the local error taxonomy, keeping the
    /// backend's human-readable message where one is present.
    async fn check(response: reqwest::Response) -> ConsoleResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message);

        Err(match status.as_u16() {
            STALE_SESSION_STATUS => {
                ConsoleError::permission_denied(message.unwrap_or_else(|| "session expired".into()))
            }
            _ => {
                let message =
                    message.unwrap_or_else(|| format!("request failed with status {status}"));
                match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        ConsoleError::permission_denied(message)
                    }
                    StatusCode::NOT_FOUND => ConsoleError::not_found(message),
                    _ => ConsoleError::persistence(message),
                }
            }
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ConsoleResult<T> {
        let bytes = response.bytes().await?;
        let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
        serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| ConsoleError::decode(error.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let response = self.dispatch(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    fn to_body<B: serde::Serialize>(body: &B) -> ConsoleResult<Value> {
        serde_json::to_value(body)
            .map_err(|error| ConsoleError::internal(format!("failed to serialize request: {error}")))
    }
}

#[async_trait]
impl PermissionCatalogService for HttpAdminGateway {
    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>> {
        self.get_json("/permissions").await
    }

    async fn list_permission_categories(&self) -> ConsoleResult<Vec<PermissionCategory>> {
        self.get_json("/permission-categories").await
    }
}

#[async_trait]
impl RoleService for HttpAdminGateway {
    async fn list_roles(&self) -> ConsoleResult<Vec<Role>> {
        self.get_json("/roles").await
    }

    async fn create_role(&self, request: &RoleCreateRequest) -> ConsoleResult<Role> {
        let body = Self::to_body(request)?;
        let response = self.dispatch(Method::POST, "/roles", Some(&body)).await?;
        Self::decode(response).await
    }

    async fn update_role(&self, role_id: &str, request: &RoleUpdateRequest) -> ConsoleResult<Role> {
        let body = Self::to_body(request)?;
        let path = format!("/roles/{role_id}");
        let response = self.dispatch(Method::PUT, &path, Some(&body)).await?;
        Self::decode(response).await
    }

    async fn delete_role(&self, role_id: &str) -> ConsoleResult<()> {
        let path = format!("/roles/{role_id}");
        self.dispatch(Method::DELETE, &path, None).await?;
        Ok(())
    }
}
