use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};
use tokio::time;

use mobile_core::config::Config;
use mobile_core::credentials::MemoryStore;
use mobile_core::gateway::{ChannelState, GatewayEvent};
use mobile_core::Client;
use sitedocs_common::User;

/// In-memory stand-in for the Sitedocs backend.
///
/// Serves login, refresh, a couple of data routes, and the gateway WebSocket.
/// Tests flip the flags to script failures and read the counters to assert
/// how often the client actually called.
pub struct Backend {
    /// Access token the data routes currently accept.
    pub valid_token: Mutex<String>,
    /// Refresh token `/refresh-token` currently accepts.
    pub valid_refresh: Mutex<String>,
    token_seq: AtomicUsize,

    /// When false, `/refresh-token` rejects everything with 403.
    pub allow_refresh: AtomicBool,
    /// When true, refresh responses also rotate the refresh token.
    pub rotate_refresh: AtomicBool,
    /// When true, `/objects` rejects every token with 403.
    pub always_reject_data: AtomicBool,
    /// When true, `/objects` answers 500 after passing auth.
    pub fail_data: AtomicBool,

    pub data_hits: AtomicUsize,
    pub works_hits: AtomicUsize,
    pub refresh_hits: AtomicUsize,
    pub gateway_hits: AtomicUsize,

    /// Token query parameter presented on the latest gateway connection.
    pub gateway_token: Mutex<Option<String>>,
    /// Frames pushed, in order, to every new gateway connection.
    pub frames: Mutex<Vec<String>>,
    /// When true, the server closes each gateway connection after its frames.
    pub close_after_frames: AtomicBool,
    /// When true, the server re-sends its frames every 100ms instead of
    /// going quiet after the first round.
    pub repeat_frames: AtomicBool,

    pub objects: Mutex<Vec<Value>>,
    pub works: Mutex<Vec<Value>>,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            valid_token: Mutex::new("A1".to_string()),
            valid_refresh: Mutex::new("R1".to_string()),
            token_seq: AtomicUsize::new(1),
            allow_refresh: AtomicBool::new(true),
            rotate_refresh: AtomicBool::new(false),
            always_reject_data: AtomicBool::new(false),
            fail_data: AtomicBool::new(false),
            data_hits: AtomicUsize::new(0),
            works_hits: AtomicUsize::new(0),
            refresh_hits: AtomicUsize::new(0),
            gateway_hits: AtomicUsize::new(0),
            gateway_token: Mutex::new(None),
            frames: Mutex::new(Vec::new()),
            close_after_frames: AtomicBool::new(false),
            repeat_frames: AtomicBool::new(false),
            objects: Mutex::new(Vec::new()),
            works: Mutex::new(Vec::new()),
        }
    }

    /// Invalidate the access token the client holds, as if it expired
    /// server-side. The next refresh issues a working replacement.
    pub fn expire_access(&self) {
        *self.valid_token.lock().unwrap() = "expired-elsewhere".to_string();
    }
}

fn router(state: Arc<Backend>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/objects", get(objects))
        .route("/pendingworks", get(pending_works))
        .route("/gateway", get(gateway))
        .with_state(state)
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<Value> {
    let email = body["email"].as_str().unwrap_or("kate@site.example");
    let access = backend.valid_token.lock().unwrap().clone();
    let refresh = backend.valid_refresh.lock().unwrap().clone();
    Json(json!({
        "accessToken": access,
        "refreshToken": refresh,
        "user": {
            "id": 1,
            "username": "kvasha",
            "email": email,
            "name": "Kate",
            "surname": "Vasha",
            "emailconfirmed": true,
            "role": "foreman",
        }
    }))
}

async fn refresh_token(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_hits.fetch_add(1, Ordering::SeqCst);

    if !backend.allow_refresh.load(Ordering::SeqCst) {
        return forbidden();
    }
    let presented = body["token"].as_str().unwrap_or_default();
    if presented != *backend.valid_refresh.lock().unwrap() {
        return forbidden();
    }

    let seq = backend.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
    let access = format!("A{seq}");
    *backend.valid_token.lock().unwrap() = access.clone();

    let mut resp = json!({ "accessToken": access });
    if backend.rotate_refresh.load(Ordering::SeqCst) {
        let refresh = format!("R{seq}");
        *backend.valid_refresh.lock().unwrap() = refresh.clone();
        resp["refreshToken"] = json!(refresh);
    }
    Json(resp).into_response()
}

async fn objects(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.data_hits.fetch_add(1, Ordering::SeqCst);

    if backend.always_reject_data.load(Ordering::SeqCst) {
        return forbidden();
    }
    if let Err(resp) = authorize(&backend, &headers) {
        return resp;
    }
    if backend.fail_data.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "backend exploded" })),
        )
            .into_response();
    }
    Json(backend.objects.lock().unwrap().clone()).into_response()
}

async fn pending_works(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.works_hits.fetch_add(1, Ordering::SeqCst);

    if let Err(resp) = authorize(&backend, &headers) {
        return resp;
    }
    Json(backend.works.lock().unwrap().clone()).into_response()
}

async fn gateway(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    backend.gateway_hits.fetch_add(1, Ordering::SeqCst);
    *backend.gateway_token.lock().unwrap() = params.get("token").cloned();
    ws.on_upgrade(move |socket| push_frames(socket, backend))
}

async fn push_frames(mut socket: WebSocket, backend: Arc<Backend>) {
    loop {
        let frames = backend.frames.lock().unwrap().clone();
        for frame in frames {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        if !backend.repeat_frames.load(Ordering::SeqCst) {
            break;
        }
        time::sleep(Duration::from_millis(100)).await;
    }
    if backend.close_after_frames.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    // Hold the connection open until the client goes away.
    while let Some(Ok(_)) = socket.recv().await {}
}

fn authorize(backend: &Backend, headers: &HeaderMap) -> Result<(), Response> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let expected = format!("Bearer {}", backend.valid_token.lock().unwrap());
    if presented == expected {
        Ok(())
    } else {
        Err(forbidden())
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "message": "forbidden" })),
    )
        .into_response()
}

/// Helper: start the mock backend on an ephemeral port.
/// Returns (addr, state). The server runs in the background.
pub async fn start_backend() -> (SocketAddr, Arc<Backend>) {
    let state = Arc::new(Backend::new());
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Helper: client configuration pointed at the mock backend.
pub fn test_config(addr: SocketAddr) -> Config {
    Config {
        api_url: format!("http://{addr}"),
        gateway_url: format!("ws://{addr}/gateway"),
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
    }
}

/// Helper: a client with a fresh in-memory credential store.
pub fn test_client(addr: SocketAddr) -> Client {
    Client::new(test_config(addr), Arc::new(MemoryStore::new())).expect("build client")
}

/// Helper: log in against the mock backend; the session ends up holding the
/// backend's current token pair.
pub async fn log_in(client: &Client) -> User {
    client
        .api
        .log_in("kate@site.example", "hunter2")
        .await
        .expect("login")
}

/// Helper: build one wire frame the way the service pushes them.
pub fn frame(tag: &str, object: Value) -> String {
    json!({ "type": tag, "object": object }).to_string()
}

pub fn site_json(id: i64, title: &str) -> Value {
    json!({ "id": id, "title": title, "address": "1 Forge Yard" })
}

pub fn work_json(id: i64, title: &str, quantity: f64) -> Value {
    json!({ "id": id, "title": title, "unit": "m2", "quantity": quantity })
}

/// Helper: wait for the next decoded event, failing the test after 10s.
pub async fn recv_event(events: &mut mpsc::Receiver<GatewayEvent>) -> GatewayEvent {
    time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("timeout waiting for event")
        .expect("event stream ended")
}

/// Helper: wait until the channel reports `want`.
pub async fn wait_for_state(states: &mut watch::Receiver<ChannelState>, want: ChannelState) {
    time::timeout(Duration::from_secs(10), async {
        while *states.borrow() != want {
            states.changed().await.expect("state watch closed");
        }
    })
    .await
    .expect("timeout waiting for channel state");
}
