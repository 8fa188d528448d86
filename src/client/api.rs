use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use super::session::{Session, SessionStore};
use crate::{
    auth::dto::{AuthResponse, PublicUser, RefreshRequest},
    dashboard::DashboardSummary,
    goals::{dto::GoalInput, Goals},
    meals::{dto::MealHistory, MealRecord},
    nutrition::Macros,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Typed access to the HTTP API. Holds the session and announces data changes:
/// views that show meals subscribe to [`NutritionClient::meal_changes`] and
/// reload when the revision moves.
#[derive(Clone)]
pub struct NutritionClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    revision: Arc<watch::Sender<u64>>,
}

impl NutritionClient {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: SessionStore::new(),
            revision: Arc::new(revision),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn meal_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = self.session.current().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(session.access_token))
    }

    async fn check(&self, res: Response) -> Result<Response, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        if status == StatusCode::UNAUTHORIZED && self.session.clear() {
            warn!(%message, "session rejected by server; signed out");
        }
        Err(ClientError::Api { status, message })
    }

    async fn decode<T: DeserializeOwned>(&self, res: Response) -> Result<T, ClientError> {
        Ok(self.check(res).await?.json::<T>().await?)
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let res = self
            .request(Method::POST, path)
            .json(&Credentials { email, password })
            .send()
            .await?;
        let auth: AuthResponse = self.decode(res).await?;
        let user = auth.user.clone();
        self.session.set(Session::from(auth));
        debug!(user_id = %user.id, "signed in");
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        self.authenticate("/auth/register", email, password).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        self.authenticate("/auth/login", email, password).await
    }

    /// Drops the local session even if the server call fails.
    pub async fn sign_out(&self) {
        if let Ok(req) = self.authed(Method::POST, "/auth/logout") {
            if let Err(e) = req.send().await {
                warn!(error = %e, "logout request failed");
            }
        }
        self.session.clear();
    }

    /// Exchanges the refresh token for a new pair.
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let session = self.session.current().ok_or(ClientError::NotAuthenticated)?;
        let res = self
            .request(Method::POST, "/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: session.refresh_token,
            })
            .send()
            .await?;
        let auth: AuthResponse = self.decode(res).await?;
        self.session.set(Session::from(auth));
        Ok(())
    }

    pub async fn parse_meal(&self, text: &str) -> Result<Macros, ClientError> {
        let res = self
            .request(Method::POST, "/parse-meal")
            .json(&json!({ "text": text }))
            .send()
            .await?;
        self.decode(res).await
    }

    pub async fn add_meal(&self, text: &str) -> Result<MealRecord, ClientError> {
        let res = self
            .authed(Method::POST, "/meals")?
            .json(&json!({ "text": text }))
            .send()
            .await?;
        let meal = self.decode(res).await?;
        self.bump_revision();
        Ok(meal)
    }

    pub async fn meals(&self, tz_offset_minutes: i32) -> Result<MealHistory, ClientError> {
        let res = self
            .authed(Method::GET, "/meals")?
            .query(&[("tz_offset_minutes", tz_offset_minutes)])
            .send()
            .await?;
        self.decode(res).await
    }

    pub async fn delete_meal(&self, id: Uuid) -> Result<(), ClientError> {
        let res = self
            .authed(Method::DELETE, &format!("/meals/{id}"))?
            .send()
            .await?;
        self.check(res).await?;
        self.bump_revision();
        Ok(())
    }

    pub async fn dashboard(&self, tz_offset_minutes: i32) -> Result<DashboardSummary, ClientError> {
        let res = self
            .authed(Method::GET, "/dashboard")?
            .query(&[("tz_offset_minutes", tz_offset_minutes)])
            .send()
            .await?;
        self.decode(res).await
    }

    pub async fn goals(&self) -> Result<Goals, ClientError> {
        let res = self.authed(Method::GET, "/goals")?.send().await?;
        self.decode(res).await
    }

    pub async fn save_goals(&self, input: &GoalInput) -> Result<Goals, ClientError> {
        let res = self.authed(Method::PUT, "/goals")?.json(input).send().await?;
        self.decode(res).await
    }

    pub async fn apply_preset(&self, slug: &str) -> Result<Goals, ClientError> {
        let res = self
            .authed(Method::POST, &format!("/goals/presets/{slug}"))?
            .send()
            .await?;
        self.decode(res).await
    }
}
