use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Res, config::Config, error::Error, spotify::auth::SessionManager};

/// A call against the Web API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

/// Joins `segments` into an absolute path, percent-encoding each of them so
/// that an id cannot change the request target.
///
/// ```
/// assert_eq!(encoded_path(&["users", "a/b#c", "playlists"])?, "/users/a%2Fb%23c/playlists");
/// ```
pub fn encoded_path(segments: &[&str]) -> Res<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| Error::Config(format!("cannot build request path: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config("cannot build request path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Bearer-authenticated access to the Web API.
///
/// Tokens come from the owned [`SessionManager`]. A 401 answer triggers one
/// refresh and one retry, never more: a token that is rejected twice is
/// reported to the caller.
pub struct ApiGateway {
    http: Client,
    base_url: String,
    session: SessionManager,
}

impl ApiGateway {
    pub fn new(config: &Config, session: SessionManager) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session
    }

    /// Executes `request` and returns the parsed JSON body (`Value::Null`
    /// for an empty body).
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] when no token can be obtained
    /// - [`Error::TokenRefreshFailed`] when the refresh after a 401 fails
    /// - [`Error::RemoteRequestFailed`] for any other non-2xx status, including
    ///   a second 401
    /// - [`Error::RemoteResponseMalformed`] when a 2xx body is not JSON
    pub async fn call(&mut self, request: &ApiRequest) -> Res<Value> {
        let token = self.session.ensure_token().await?;
        let mut response = self.send(request, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.session.has_refresh_token() {
            let token = self.session.refresh().await?;
            response = self.send(request, &token).await?;
        }

        read_json(response).await
    }

    /// Like [`call`](Self::call), mapping the body into `T`. A body that does
    /// not have the expected shape is a [`Error::RemoteResponseMalformed`].
    pub async fn call_as<T: DeserializeOwned>(&mut self, request: &ApiRequest) -> Res<T> {
        let value = self.call(request).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::RemoteResponseMalformed(format!("{} {}: {}", request.method, request.path, e))
        })
    }

    async fn send(&self, request: &ApiRequest, token: &str) -> Res<Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(token);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

async fn read_json(response: Response) -> Res<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::RemoteRequestFailed {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| Error::RemoteResponseMalformed(e.to_string()))
}
