//! In-process stand-in for the Fale Com Jesus REST backend.
//!
//! Routes mirror the real backend's paths and response shapes. Knobs on
//! [`StubState`] script failures (401s, refresh rejection, chat status
//! codes) and counters record what the client actually sent.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};

use fale_client::{ApiClient, AppContext, ClientConfig, EventBus, SessionStore, SharedDatabase, Transport};
use fale_shared::token::is_token_expired;

pub const PASSWORD: &str = "Senha@123";
pub const REFRESH_TOKEN: &str = "refresh-token-1";

static NONCE: AtomicU64 = AtomicU64::new(0);

/// Unsigned JWT expiring `exp_offset_secs` from now. Every call yields a
/// distinct token.
pub fn mint_token(exp_offset_secs: i64, sub: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + exp_offset_secs;
    let jti = NONCE.fetch_add(1, Ordering::SeqCst);
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD
        .encode(format!(r#"{{"exp":{exp},"sub":{sub},"jti":{jti}}}"#).as_bytes());
    format!("{header}.{body}.stub-signature")
}

#[derive(Default)]
pub struct StubState {
    // scripting
    pub unauthorized_remaining: AtomicUsize,
    pub issue_expired_access: AtomicBool,
    pub refresh_fails: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub chat_status: Mutex<Option<u16>>,
    pub force_conversation_id: Mutex<Option<i64>>,
    pub daily: Mutex<Option<Value>>,

    // counters
    pub protected_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,

    // recorded traffic
    pub chat_bodies: Mutex<Vec<Value>>,
    pub deleted_key_bodies: Mutex<Vec<Value>>,

    // data
    pub keys: Mutex<Vec<Value>>,
    pub conversations: Mutex<Vec<Value>>,
    pub messages: Mutex<Vec<Value>>,
    pub templates: Mutex<Vec<Value>>,
    pub notes: Mutex<Vec<Value>>,
    next_id: AtomicI64,
}

impl StubState {
    fn next_id(&self) -> i64 {
        100 + self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn last_chat_body(&self) -> Option<Value> {
        self.chat_bodies.lock().unwrap().last().cloned()
    }

    pub fn seed_template(&self, name: &str, is_system: bool) -> i64 {
        let id = self.next_id();
        let owner = if is_system { Value::Null } else { json!(1) };
        self.templates.lock().unwrap().push(json!({
            "id": id,
            "name": name,
            "description": null,
            "template": format!("{name}: {{input}}"),
            "is_system": is_system,
            "user_id": owner,
            "created_at": "2024-01-01T00:00:00",
            "updated_at": null
        }));
        id
    }

    pub fn seed_key(&self, provider: &str, is_active: bool) -> i64 {
        let id = self.next_id();
        self.keys.lock().unwrap().push(api_key_json(id, provider, is_active));
        id
    }
}

type Shared = Arc<StubState>;

pub struct StubServer {
    pub url: String,
    pub state: Shared,
}

pub async fn spawn() -> StubServer {
    let state: Shared = Arc::new(StubState::default());

    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/forgot-password", post(forgot_password))
        .route("/api/v1/auth/reset-password", post(reset_password))
        .route("/api/v1/auth/verify-reset-token", post(verify_reset_token))
        .route("/api/v1/users/me", get(me).put(update_me))
        .route("/api/keys", get(list_keys).post(add_key).delete(delete_key))
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation)
                .put(rename_conversation)
                .delete(delete_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages).post(add_message),
        )
        .route("/api/chat/message", post(chat))
        .route("/api/prompts", get(list_templates).post(create_template))
        .route("/api/prompts/system", post(create_system_template))
        .route(
            "/api/prompts/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/api/v1/daily-messages/today", get(daily_today))
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route("/api/v1/notes/recent", get(recent_notes))
        .route("/api/v1/notes/{id}", put(update_note).delete(delete_note))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer {
        url: format!("http://{addr}"),
        state,
    }
}

impl StubServer {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_api_url(&self.url)
    }

    /// Anonymous context over a throwaway database.
    pub async fn context(&self) -> AppContext {
        self.context_with(SharedDatabase::in_memory().unwrap()).await
    }

    pub async fn context_with(&self, db: SharedDatabase) -> AppContext {
        AppContext::with_database(self.config(), db).await.unwrap()
    }

    /// Session and gateway without the context's sign-in side effects, so
    /// request counters start from zero.
    pub fn bare_session(&self, db: SharedDatabase) -> (Arc<SessionStore>, ApiClient) {
        let transport = Transport::new(&self.config()).unwrap();
        let session = Arc::new(SessionStore::new(transport, db, EventBus::new()));
        let api = ApiClient::new(Arc::clone(&session));
        (session, api)
    }

    pub async fn logged_in_context(&self) -> AppContext {
        let ctx = self.context().await;
        ctx.login("maria@example.com", PASSWORD).await.unwrap();
        ctx
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn ok(body: Value) -> Response {
    reply(StatusCode::OK, body)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Gate for protected routes: scripted 401s first, then a real expiry check.
fn authorize(state: &StubState, headers: &HeaderMap) -> Result<(), Response> {
    state.protected_calls.fetch_add(1, Ordering::SeqCst);

    let scripted = state
        .unauthorized_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if scripted {
        return Err(reply(
            StatusCode::UNAUTHORIZED,
            json!({"msg": "Token has been revoked"}),
        ));
    }

    match bearer(headers) {
        Some(token) if !is_token_expired(Some(&token)) => Ok(()),
        _ => Err(reply(
            StatusCode::UNAUTHORIZED,
            json!({"msg": "Token has expired"}),
        )),
    }
}

fn user_json() -> Value {
    json!({
        "id": 1,
        "email": "maria@example.com",
        "first_name": "Maria",
        "last_name": "Silva",
        "is_active": true,
        "created_at": "2024-01-01T08:00:00",
        "last_login": null
    })
}

fn api_key_json(id: i64, provider: &str, is_active: bool) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "provider": provider,
        "is_active": is_active,
        "last_used": null,
        "created_at": "2024-01-01T08:00:00",
        "updated_at": null
    })
}

fn auth_payload(state: &StubState) -> Value {
    let offset = if state.issue_expired_access.load(Ordering::SeqCst) {
        -60
    } else {
        3600
    };
    json!({
        "message": "Login successful",
        "access_token": mint_token(offset, 1),
        "refresh_token": REFRESH_TOKEN,
        "user": user_json()
    })
}

fn find_index(list: &[Value], id: i64) -> Option<usize> {
    list.iter().position(|v| v["id"].as_i64() == Some(id))
}

// ---------------------------------------------------------------------------
// auth
// ---------------------------------------------------------------------------

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        ok(auth_payload(&state))
    } else {
        reply(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Invalid email or password"}),
        )
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return reply(
            StatusCode::CONFLICT,
            json!({"message": "Email already registered"}),
        );
    }
    reply(StatusCode::CREATED, auth_payload(&state))
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.refresh_fails.load(Ordering::SeqCst)
        || bearer(&headers).as_deref() != Some(REFRESH_TOKEN)
    {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"msg": "Token has expired"}),
        );
    }
    ok(json!({"access_token": mint_token(3600, 1)}))
}

async fn logout(State(state): State<Shared>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    ok(json!({"message": "Logout successful"}))
}

async fn forgot_password(Json(_body): Json<Value>) -> Response {
    ok(json!({
        "message": "If your email is registered, you will receive instructions to reset your password"
    }))
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    if body["token"] == "good-token" {
        ok(json!({"message": "Password has been reset successfully"}))
    } else {
        reply(
            StatusCode::BAD_REQUEST,
            json!({"message": "Invalid or expired token"}),
        )
    }
}

async fn verify_reset_token(Json(body): Json<Value>) -> Response {
    ok(json!({"valid": body["token"] == "good-token"}))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    ok(user_json())
}

async fn update_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let mut user = user_json();
    if let Some(first) = body.get("first_name") {
        user["first_name"] = first.clone();
    }
    if let Some(last) = body.get("last_name") {
        user["last_name"] = last.clone();
    }
    ok(user)
}

// ---------------------------------------------------------------------------
// api keys
// ---------------------------------------------------------------------------

async fn list_keys(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let keys = state.keys.lock().unwrap().clone();
    ok(json!({"count": keys.len(), "api_keys": keys}))
}

async fn add_key(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let provider = body["provider"].as_str().unwrap_or_default().to_string();
    let key = api_key_json(state.next_id(), &provider, true);
    state.keys.lock().unwrap().push(key.clone());
    reply(
        StatusCode::CREATED,
        json!({"message": "API key added successfully", "api_key": key}),
    )
}

async fn delete_key(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    state.deleted_key_bodies.lock().unwrap().push(body.clone());
    let id = body["id"].as_i64().unwrap_or_default();
    let mut keys = state.keys.lock().unwrap();
    match find_index(&keys, id) {
        Some(i) => {
            keys.remove(i);
            ok(json!({"message": "API key deleted successfully"}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "API key not found"})),
    }
}

// ---------------------------------------------------------------------------
// conversations
// ---------------------------------------------------------------------------

fn conversation_with_messages(state: &StubState, conversation: &Value) -> Value {
    let id = conversation["id"].as_i64();
    let messages: Vec<Value> = state
        .messages
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m["conversation_id"].as_i64() == id)
        .cloned()
        .collect();
    let mut full = conversation.clone();
    full["messages"] = Value::Array(messages);
    full
}

fn new_conversation(state: &StubState, title: &str) -> Value {
    let conversation = json!({
        "id": state.next_id(),
        "user_id": 1,
        "title": title,
        "created_at": "2024-05-10T12:00:00",
        "updated_at": "2024-05-10T12:00:00"
    });
    state.conversations.lock().unwrap().push(conversation.clone());
    conversation
}

fn store_message(state: &StubState, conversation_id: i64, content: &str, sender: &str, metadata: Value) -> Value {
    let message = json!({
        "id": state.next_id(),
        "conversation_id": conversation_id,
        "content": content,
        "sender": sender,
        "metadata": metadata,
        "created_at": "2024-05-10T12:00:05"
    });
    state.messages.lock().unwrap().push(message.clone());
    message
}

async fn list_conversations(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let conversations = state.conversations.lock().unwrap().clone();
    ok(json!({"count": conversations.len(), "conversations": conversations}))
}

async fn create_conversation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let title = body["title"].as_str().unwrap_or("Nova conversa");
    let conversation = new_conversation(&state, title);
    reply(
        StatusCode::CREATED,
        json!({"message": "Conversa criada com sucesso", "conversation": conversation}),
    )
}

async fn get_conversation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let found = {
        let conversations = state.conversations.lock().unwrap();
        find_index(&conversations, id).map(|i| conversations[i].clone())
    };
    match found {
        Some(c) => ok(conversation_with_messages(&state, &c)),
        None => reply(
            StatusCode::NOT_FOUND,
            json!({"error": "Conversa não encontrada"}),
        ),
    }
}

async fn rename_conversation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut conversations = state.conversations.lock().unwrap();
    match find_index(&conversations, id) {
        Some(i) => {
            conversations[i]["title"] = body["title"].clone();
            let conversation = conversations[i].clone();
            ok(json!({"message": "Conversa atualizada com sucesso", "conversation": conversation}))
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({"error": "Conversa não encontrada"}),
        ),
    }
}

async fn delete_conversation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut conversations = state.conversations.lock().unwrap();
    match find_index(&conversations, id) {
        Some(i) => {
            conversations.remove(i);
            ok(json!({"message": "Conversa excluída com sucesso"}))
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({"error": "Conversa não encontrada"}),
        ),
    }
}

async fn list_messages(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let messages: Vec<Value> = state
        .messages
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m["conversation_id"].as_i64() == Some(id))
        .cloned()
        .collect();
    ok(json!({"count": messages.len(), "messages": messages}))
}

async fn add_message(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let message = store_message(
        &state,
        id,
        body["content"].as_str().unwrap_or_default(),
        body["sender"].as_str().unwrap_or("user"),
        body.get("metadata").cloned().unwrap_or(Value::Null),
    );
    reply(
        StatusCode::CREATED,
        json!({"message": "Mensagem adicionada com sucesso", "data": message}),
    )
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

async fn chat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.chat_calls.fetch_add(1, Ordering::SeqCst);
    state.chat_bodies.lock().unwrap().push(body.clone());

    if let Some(status) = *state.chat_status.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap();
        return reply(status, json!({"error": "Scripted failure"}));
    }

    let message = body["message"].as_str().unwrap_or_default().to_string();
    let regenerate = body["regenerate"].as_bool().unwrap_or(false);

    let conversation_id = match body["conversation_id"].as_i64() {
        Some(id) => id,
        None => {
            let title: String = message.chars().take(50).collect();
            new_conversation(&state, &title)["id"].as_i64().unwrap()
        }
    };

    let response = if regenerate {
        format!("Nova resposta para: {message}")
    } else {
        store_message(&state, conversation_id, &message, "user", Value::Null);
        format!("Resposta para: {message}")
    };
    store_message(
        &state,
        conversation_id,
        &response,
        "bot",
        json!({"provider": body["provider"], "model": body["model"], "regenerated": regenerate}),
    );

    let reported = state
        .force_conversation_id
        .lock()
        .unwrap()
        .unwrap_or(conversation_id);
    ok(json!({"response": response, "conversation_id": reported}))
}

// ---------------------------------------------------------------------------
// prompt templates
// ---------------------------------------------------------------------------

async fn list_templates(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let templates = state.templates.lock().unwrap().clone();
    ok(json!({"count": templates.len(), "templates": templates}))
}

fn template_from_body(state: &StubState, body: &Value, is_system: bool) -> Value {
    json!({
        "id": state.next_id(),
        "name": body["name"],
        "description": body["description"],
        "template": body["template"],
        "is_system": is_system,
        "user_id": 1,
        "created_at": "2024-05-10T12:00:00",
        "updated_at": null
    })
}

async fn create_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let template = template_from_body(&state, &body, false);
    state.templates.lock().unwrap().push(template.clone());
    reply(StatusCode::CREATED, template)
}

async fn create_system_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    reply(
        StatusCode::FORBIDDEN,
        json!({"error": "Admin access required"}),
    )
}

async fn get_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let templates = state.templates.lock().unwrap();
    match find_index(&templates, id) {
        Some(i) => ok(templates[i].clone()),
        None => reply(StatusCode::NOT_FOUND, json!({"error": "Template not found"})),
    }
}

async fn update_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut templates = state.templates.lock().unwrap();
    let Some(i) = find_index(&templates, id) else {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Template not found"}));
    };
    if templates[i]["is_system"] == true {
        return reply(
            StatusCode::FORBIDDEN,
            json!({"error": "System templates cannot be modified"}),
        );
    }
    for field in ["name", "description", "template"] {
        templates[i][field] = body[field].clone();
    }
    ok(templates[i].clone())
}

async fn delete_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut templates = state.templates.lock().unwrap();
    let Some(i) = find_index(&templates, id) else {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Template not found"}));
    };
    if templates[i]["is_system"] == true {
        return reply(
            StatusCode::FORBIDDEN,
            json!({"error": "System templates cannot be deleted"}),
        );
    }
    templates.remove(i);
    ok(json!({"message": "Template deleted successfully"}))
}

// ---------------------------------------------------------------------------
// daily message and notes
// ---------------------------------------------------------------------------

async fn daily_today(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match state.daily.lock().unwrap().clone() {
        Some(message) => ok(message),
        None => reply(
            StatusCode::NOT_FOUND,
            json!({"message": "No daily message available for today"}),
        ),
    }
}

async fn list_notes(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    ok(Value::Array(state.notes.lock().unwrap().clone()))
}

async fn recent_notes(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let notes = state.notes.lock().unwrap();
    let recent: Vec<Value> = notes.iter().rev().take(5).cloned().collect();
    ok(Value::Array(recent))
}

async fn create_note(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let note = json!({
        "id": state.next_id(),
        "content": body["content"],
        "title": body.get("title").cloned().unwrap_or(Value::Null),
        "is_favorite": body.get("is_favorite").and_then(Value::as_bool).unwrap_or(false),
        "user_id": 1,
        "daily_message_id": body.get("daily_message_id").cloned().unwrap_or(Value::Null),
        "created_at": "2024-05-10T12:00:00",
        "updated_at": "2024-05-10T12:00:00"
    });
    state.notes.lock().unwrap().push(note.clone());
    reply(StatusCode::CREATED, note)
}

async fn update_note(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut notes = state.notes.lock().unwrap();
    let Some(i) = find_index(&notes, id) else {
        return reply(StatusCode::NOT_FOUND, json!({"message": "Note not found"}));
    };
    for field in ["content", "title", "is_favorite"] {
        if let Some(value) = body.get(field) {
            notes[i][field] = value.clone();
        }
    }
    ok(notes[i].clone())
}

async fn delete_note(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    let mut notes = state.notes.lock().unwrap();
    match find_index(&notes, id) {
        Some(i) => {
            notes.remove(i);
            ok(json!({"message": "Note deleted successfully"}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"message": "Note not found"})),
    }
}
