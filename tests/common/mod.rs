#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, Ordering},
    },
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use jammming::{
    config::Config,
    management::CredentialStore,
    spotify::{ApiGateway, Clock, SessionManager},
    types::{Session, Track},
};

pub const NOW: i64 = 1_700_000_000;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Scripted behaviour of the fake accounts service and Web API.
pub struct MockState {
    pub requests: Vec<RecordedRequest>,
    /// Bearer tokens the API accepts; everything else gets a 401.
    pub valid_tokens: HashSet<String>,
    /// Answers of the token endpoint, in order. When empty a fresh token is
    /// issued.
    pub token_responses: VecDeque<(u16, String)>,
    pub user_id: Option<String>,
    pub create_playlist_status: u16,
    /// Zero-based indices of track writes that answer with 500.
    pub failing_batches: HashSet<usize>,
    pub search_body: String,
    track_writes: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            valid_tokens: HashSet::from(["valid-token".to_string(), "fresh-token".to_string()]),
            token_responses: VecDeque::new(),
            user_id: Some("user1".to_string()),
            create_playlist_status: 201,
            failing_batches: HashSet::new(),
            search_body: json!({ "tracks": { "items": [] } }).to_string(),
            track_writes: 0,
        }
    }
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub base_url: String,
    pub state: Shared,
}

impl MockServer {
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path_prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(path_prefix))
            .collect()
    }

    pub fn token_requests(&self) -> Vec<RecordedRequest> {
        self.requests_to("/api/token")
    }

    pub fn config(&self, data_dir: &Path) -> Config {
        Config {
            client_id: "client-123".to_string(),
            redirect_uri: "http://127.0.0.1:5173/callback".to_string(),
            scope: "playlist-modify-public playlist-modify-private".to_string(),
            auth_url: format!("{}/authorize", self.base_url),
            token_url: format!("{}/api/token", self.base_url),
            api_url: format!("{}/v1", self.base_url),
            server_addr: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_path_buf(),
        }
    }
}

fn json_response(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut st = state.lock().unwrap();
    st.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if path == "/api/token" {
        let (status, body) = st.token_responses.pop_front().unwrap_or_else(|| {
            (
                200,
                json!({
                    "access_token": "fresh-token",
                    "refresh_token": "fresh-refresh",
                    "expires_in": 3600
                })
                .to_string(),
            )
        });
        return json_response(status, body);
    }

    let authorized = authorization
        .as_deref()
        .and_then(|a| a.strip_prefix("Bearer "))
        .is_some_and(|token| st.valid_tokens.contains(token));
    if !authorized {
        return json_response(
            401,
            json!({ "error": { "status": 401, "message": "The access token expired" } })
                .to_string(),
        );
    }

    let p = path.as_str();
    if method == Method::GET && p == "/v1/me" {
        let body = match &st.user_id {
            Some(id) => json!({ "id": id, "display_name": "Test User" }),
            None => json!({ "display_name": "Nobody" }),
        };
        json_response(200, body.to_string())
    } else if method == Method::GET && p == "/v1/search" {
        json_response(200, st.search_body.clone())
    } else if method == Method::POST && p.starts_with("/v1/users/") && p.ends_with("/playlists") {
        let status = st.create_playlist_status;
        if (200..300).contains(&status) {
            json_response(status, json!({ "id": "pl1", "name": "x" }).to_string())
        } else {
            json_response(status, json!({ "error": "nope" }).to_string())
        }
    } else if method == Method::POST && p.starts_with("/v1/playlists/") && p.ends_with("/tracks") {
        let index = st.track_writes;
        st.track_writes += 1;
        if st.failing_batches.contains(&index) {
            json_response(500, json!({ "error": "boom" }).to_string())
        } else {
            json_response(201, json!({ "snapshot_id": format!("snap{index}") }).to_string())
        }
    } else {
        json_response(404, json!({ "error": "not found" }).to_string())
    }
}

/// Clock whose time only moves when a test says so.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(now)))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn session(access_token: &str, refresh_token: Option<&str>, expires_at: i64) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
    }
}

/// Stores `session` in `config.data_dir` and opens a manager on it.
pub async fn open_session(
    config: &Config,
    session: Option<Session>,
    clock: Arc<FixedClock>,
) -> SessionManager {
    let store = CredentialStore::new(config.data_dir.clone());
    if let Some(session) = session {
        store.save(&session).await.unwrap();
    }
    SessionManager::open_with_clock(config.clone(), store, clock)
        .await
        .unwrap()
}

pub async fn authorized_gateway(server: &MockServer, data_dir: &Path) -> ApiGateway {
    let config = server.config(data_dir);
    let manager = open_session(
        &config,
        Some(session("valid-token", Some("refresh-1"), NOW + 3600)),
        FixedClock::new(NOW),
    )
    .await;
    ApiGateway::new(&config, manager)
}

pub fn track(n: usize) -> Track {
    Track {
        id: format!("id{n}"),
        name: format!("Song {n}"),
        artist: format!("Artist {n}"),
        album: format!("Album {n}"),
        uri: format!("spotify:track:{n}"),
    }
}
