//! HTTP surface for Mnemon.
//!
//! One OpenAI-style chat completions endpoint, returning either a single
//! JSON response or a server-sent-event stream, mapped onto the
//! conversation augmentor. All memory behavior lives in mnemon-rs-core;
//! this crate only translates requests and errors.

use futures_util::{Stream, StreamExt, stream};
use log::warn;
use mnemon_rs_config::ServerConfig;
use mnemon_rs_core::{ConversationAugmentor, CoreError, MemoryWriter, ScopeArgs};
use mnemon_rs_protocol::{ChatCompletionRequest, ChatCompletionResponse};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::stream::{Event, EventStream};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{Build, Rocket, State, get, post, routes};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::pin::Pin;
use std::sync::Arc;

/// Shared server state built once at startup.
pub struct ServerState {
    augmentor: Arc<ConversationAugmentor>,
    writer: Arc<MemoryWriter>,
    default_model: String,
}

impl ServerState {
    /// Bundle the augmentor and writer with the configured default model.
    pub fn new(
        augmentor: Arc<ConversationAugmentor>,
        writer: Arc<MemoryWriter>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            augmentor,
            writer,
            default_model: default_model.into(),
        }
    }

    /// The background writer, for draining at shutdown.
    pub fn writer(&self) -> &Arc<MemoryWriter> {
        &self.writer
    }
}

/// Chat completion body: the OpenAI-style request plus memory scoping.
#[derive(Debug, Deserialize)]
pub struct CompletionBody {
    #[serde(flatten)]
    pub request: ChatCompletionRequest,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CompletionBody {
    fn scope(&self) -> ScopeArgs {
        ScopeArgs {
            user_id: self.user_id.clone(),
            agent_id: self.agent_id.clone(),
            run_id: self.run_id.clone(),
            actor_id: self.actor_id.clone(),
            metadata: self.metadata.clone(),
            filters: self.filters.clone(),
        }
    }
}

/// JSON error payload.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error responder carrying a status and a JSON message.
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    body: ErrorBody,
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::MissingScope => Status::BadRequest,
            CoreError::Upstream(_) => Status::BadGateway,
            CoreError::Memory(_) | CoreError::UnknownProvider(_) => Status::InternalServerError,
        };
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
            },
        }
    }
}

impl<'r> Responder<'r, 'r> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'r> {
        let mut response = Json(self.body).respond_to(request)?;
        response.set_status(self.status);
        Ok(response)
    }
}

type EventStreamBox = EventStream<Pin<Box<dyn Stream<Item = Event> + Send>>>;

/// Either a single JSON completion or an SSE stream.
pub enum CompletionResponder {
    Single(Json<ChatCompletionResponse>),
    Stream(EventStreamBox),
}

impl<'r> Responder<'r, 'r> for CompletionResponder {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'r> {
        match self {
            Self::Single(json) => json.respond_to(request),
            Self::Stream(events) => events.respond_to(request),
        }
    }
}

#[get("/health")]
fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[post("/v1/chat/completions", format = "json", data = "<body>")]
async fn chat_completions(
    state: &State<ServerState>,
    body: Json<CompletionBody>,
) -> Result<CompletionResponder, ApiError> {
    let body = body.into_inner();
    let scope = body.scope();
    let limit = body.limit;
    let mut request = body.request;
    if request.model.is_empty() {
        request.model = state.default_model.clone();
    }

    if request.stream {
        let chunks = state.augmentor.create_stream(request, scope, limit).await?;
        let events = chunks
            .map(|chunk| match chunk {
                Ok(chunk) => Event::json(&chunk),
                Err(err) => {
                    warn!("stream interrupted (err={err})");
                    Event::json(&serde_json::json!({ "error": err.to_string() })).event("error")
                }
            })
            .chain(stream::iter(vec![Event::data("[DONE]")]));
        let boxed: Pin<Box<dyn Stream<Item = Event> + Send>> = Box::pin(events);
        return Ok(CompletionResponder::Stream(EventStream::from(boxed)));
    }

    let response = state.augmentor.create(request, scope, limit).await?;
    Ok(CompletionResponder::Single(Json(response)))
}

/// Assemble the Rocket application over prepared state.
pub fn rocket(state: ServerState, config: &ServerConfig) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.host.clone()))
        .merge(("port", config.port));
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![health, chat_completions])
}
