//! HTTP gateway to the backend API.
//!
//! Every outbound request is built by [`ApiClient::request`], the one place
//! that reads the current credential and attaches the bearer header. A
//! request without a stored token simply goes out unauthenticated.

use reqwest::{Method, StatusCode};
use shared::{Interview, InterviewsResponse, SignInRequest, SignInResponse, User, VerifyResponse};
use thiserror::Error;

use crate::credentials::CredentialStore;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connect, DNS, timeout, interrupted body).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend rejected the bearer credential.
    #[error("unauthorized")]
    Unauthorized,
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Server-side selection for the interview listing, independent of the
/// client-side filters.
#[derive(Debug, Clone, Default)]
pub struct InterviewQuery {
    id: Option<String>,
    public_only: bool,
}

impl InterviewQuery {
    /// The caller's own interviews.
    pub fn mine() -> Self {
        Self::default()
    }

    /// A single record, for editing.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            public_only: false,
        }
    }

    /// The community feed: publicly shared, completed interviews.
    pub fn community() -> Self {
        Self {
            id: None,
            public_only: true,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        if let Some(id) = &self.id {
            return vec![("id", id.clone())];
        }
        if self.public_only {
            return vec![
                ("is_public", "true".to_string()),
                ("status", "completed".to_string()),
            ];
        }
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: CredentialStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Builds a request with the bearer header attached when a live token is
    /// stored; no token means an unauthenticated request, not an error.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.credentials.get() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        match resp.status() {
            status if status.is_success() => Ok(resp),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            status => Err(ApiError::Status(status)),
        }
    }

    /// `GET /getInterviews{?query}`.
    pub async fn fetch_interviews(&self, query: &InterviewQuery) -> Result<Vec<Interview>, ApiError> {
        let params = query.params();
        let mut builder = self.request(Method::GET, "/getInterviews");
        if !params.is_empty() {
            builder = builder.query(&params);
        }
        let resp = Self::check(builder.send().await?)?;
        let body: InterviewsResponse = resp.json().await.map_err(ApiError::Decode)?;
        Ok(body.interviews)
    }

    /// Saves a record: `POST /interview` for a new one, `PUT /interview` when
    /// the record already carries an id.
    pub async fn save_interview(&self, interview: &Interview) -> Result<Interview, ApiError> {
        let method = if interview.id.is_some() { Method::PUT } else { Method::POST };
        let resp = Self::check(self.request(method, "/interview").json(interview).send().await?)?;
        resp.json().await.map_err(ApiError::Decode)
    }

    /// `GET /auth/user`: who the stored credential belongs to.
    pub async fn verify_user(&self) -> Result<User, ApiError> {
        let resp = Self::check(self.request(Method::GET, "/auth/user").send().await?)?;
        let body: VerifyResponse = resp.json().await.map_err(ApiError::Decode)?;
        Ok(body.user)
    }

    /// `POST /auth/google`: exchanges a Google ID token for an app bearer
    /// token plus the identity it belongs to. Does not store anything.
    pub async fn sign_in(&self, id_token: &str) -> Result<SignInResponse, ApiError> {
        let body = SignInRequest {
            token: id_token.to_string(),
        };
        let resp = Self::check(self.request(Method::POST, "/auth/google").json(&body).send().await?)?;
        resp.json().await.map_err(ApiError::Decode)
    }
}
