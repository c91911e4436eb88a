//! WebSocket transport for hosted cooking sessions.
//!
//! One socket hosts one session. The first frame must be `session_start`,
//! carrying the client identity plus the optional continuation and user
//! payloads; the gateway answers with `session_ready` and from then on the
//! client drives tool calls while the gateway pushes attribute updates, data
//! events, and RPC requests back. Tool calls run on their own tasks so an
//! `rpc_response` frame can still be read while a bridge call is waiting on
//! it.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{rpc::RpcManager, AppState};
use crate::agent::CookingAgent;
use crate::bridge::ClientBridge;
use crate::notify::ToolActivityReporter;
use crate::runtime::{RoomHandle, RpcError, RpcRequest};
use crate::session::{ContinuationContext, UserContext};
use crate::tools::{self, ToolDispatcher};

/// Incoming frame from the client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Opens the session; must be the first frame on the socket
    SessionStart {
        /// Identity of the connecting participant
        #[serde(default)]
        identity: Option<String>,
        /// Persisted state of an interrupted session, if any
        #[serde(default)]
        continuation: Option<ContinuationContext>,
        /// Per-user personalization payload
        #[serde(default)]
        user_context: Option<UserContext>,
    },
    /// The realtime model invoked a tool
    ToolCall {
        /// Correlation id echoed back on the result frame
        id: String,
        name: String,
        /// Raw JSON arguments; empty means no arguments
        #[serde(default)]
        arguments: String,
    },
    /// Response to an earlier `rpc_request` frame
    RpcResponse {
        id: Uuid,
        ok: bool,
        /// Handler response when `ok`, error text otherwise
        #[serde(default)]
        payload: String,
    },
    /// Ping to keep connection alive
    Ping,
}

/// Outgoing frame to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Session accepted; carries everything the client needs to run the
    /// realtime model
    SessionReady {
        agent: String,
        voice: String,
        /// Standing persona instructions
        instructions: String,
        /// What the first reply must cover
        opening: String,
        /// Tools the model may call
        tools: Vec<tools::ToolDefinition>,
    },
    /// Result of an earlier `tool_call` frame
    ToolResult {
        id: String,
        /// Tool output, or the error message when `is_error`
        output: String,
        is_error: bool,
    },
    /// Shared attribute update (state visible on join)
    Attribute { key: String, value: String },
    /// Data-channel event
    Data { payload: serde_json::Value },
    /// RPC addressed to the linked participant; answer with `rpc_response`
    RpcRequest {
        id: Uuid,
        destination: String,
        method: String,
        payload: String,
    },
    /// Protocol error
    Error { code: String, message: String },
    /// Pong response
    Pong,
}

/// Room backed by one WebSocket connection.
///
/// Everything the agent pushes toward the client funnels through the
/// outbound channel; RPC responses come back through the [`RpcManager`].
pub struct WsRoom {
    tx: mpsc::Sender<Outbound>,
    rpc: Arc<RpcManager>,
    linked: Mutex<Option<String>>,
}

impl WsRoom {
    fn new(tx: mpsc::Sender<Outbound>, rpc: Arc<RpcManager>, identity: Option<String>) -> Self {
        Self {
            tx,
            rpc,
            linked: Mutex::new(identity),
        }
    }

    async fn send(&self, frame: Outbound) -> crate::Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| crate::Error::Session("outbound channel closed".to_string()))
    }
}

#[async_trait]
impl RoomHandle for WsRoom {
    fn linked_participant(&self) -> Option<String> {
        self.linked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn set_local_attribute(&self, key: &str, value: &str) -> crate::Result<()> {
        self.send(Outbound::Attribute {
            key: key.to_string(),
            value: value.to_string(),
        })
        .await
    }

    async fn publish_data(&self, payload: &serde_json::Value, _reliable: bool) -> crate::Result<()> {
        self.send(Outbound::Data {
            payload: payload.clone(),
        })
        .await
    }

    async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcError> {
        let id = Uuid::new_v4();
        let rx = self.rpc.register(id);

        let frame = Outbound::RpcRequest {
            id,
            destination: request.destination,
            method: request.method,
            payload: request.payload,
        };
        if self.tx.send(frame).await.is_err() {
            return Err(RpcError::ChannelClosed);
        }

        match rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(message)) => Err(RpcError::Remote(message)),
            // sender dropped: disconnect cancelled the pending map
            Err(_) => Err(RpcError::ChannelClosed),
        }
    }
}

/// Build the session router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", get(ws_upgrade))
        .with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one hosted session over its socket
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<Outbound>(32);
    let rpc = Arc::new(RpcManager::new());

    // Forward outbound frames to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&frame) {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    let rpc_for_recv = Arc::clone(&rpc);
    let mut recv_task = tokio::spawn(async move {
        let mut agent: Option<Arc<CookingAgent>> = None;

        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) =
                        handle_frame(&text, &state, &tx, &rpc_for_recv, &mut agent).await
                    {
                        let error = Outbound::Error {
                            code: "protocol_error".to_string(),
                            message: e.to_string(),
                        };
                        if tx.send(error).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("session closed by client");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // unblock any bridge call still waiting on a response
    rpc.cancel_all();

    tracing::info!("session disconnected");
}

/// Handle a single inbound frame
async fn handle_frame(
    text: &str,
    state: &Arc<AppState>,
    tx: &mpsc::Sender<Outbound>,
    rpc: &Arc<RpcManager>,
    agent: &mut Option<Arc<CookingAgent>>,
) -> crate::Result<()> {
    let inbound: Inbound = serde_json::from_str(text)
        .map_err(|e| crate::Error::Session(format!("invalid frame: {e}")))?;

    match inbound {
        Inbound::Ping => {
            tx.send(Outbound::Pong)
                .await
                .map_err(|_| crate::Error::Session("outbound channel closed".to_string()))?;
        }
        Inbound::SessionStart {
            identity,
            continuation,
            user_context,
        } => {
            if agent.is_some() {
                return Err(crate::Error::Session(
                    "session already started".to_string(),
                ));
            }
            let started = start_session(state, tx, rpc, identity, continuation, user_context);
            let ready = {
                let persona = started.persona();
                Outbound::SessionReady {
                    agent: persona.name.clone(),
                    voice: persona.voice.clone(),
                    instructions: persona.instructions.clone(),
                    opening: started.opening().to_string(),
                    tools: tools::definitions(),
                }
            };
            tx.send(ready)
                .await
                .map_err(|_| crate::Error::Session("outbound channel closed".to_string()))?;
            *agent = Some(started);
        }
        Inbound::ToolCall {
            id,
            name,
            arguments,
        } => {
            let Some(agent) = agent.as_ref() else {
                return Err(crate::Error::Session(
                    "tool_call before session_start".to_string(),
                ));
            };
            // own task: a bridge call inside blocks on the next rpc_response
            // frame, which this loop still has to read
            let agent = Arc::clone(agent);
            let tx = tx.clone();
            tokio::spawn(async move {
                let frame = match agent.handle_tool_call(&name, &arguments).await {
                    Ok(output) => Outbound::ToolResult {
                        id,
                        output,
                        is_error: false,
                    },
                    Err(e) => Outbound::ToolResult {
                        id,
                        output: e.to_string(),
                        is_error: true,
                    },
                };
                let _ = tx.send(frame).await;
            });
        }
        Inbound::RpcResponse { id, ok, payload } => {
            let outcome = if ok { Ok(payload) } else { Err(payload) };
            rpc.respond(id, outcome);
        }
    }

    Ok(())
}

/// Assemble the per-session object graph around a fresh room handle
fn start_session(
    state: &Arc<AppState>,
    tx: &mpsc::Sender<Outbound>,
    rpc: &Arc<RpcManager>,
    identity: Option<String>,
    continuation: Option<ContinuationContext>,
    user_context: Option<UserContext>,
) -> Arc<CookingAgent> {
    let room: Arc<dyn RoomHandle> =
        Arc::new(WsRoom::new(tx.clone(), Arc::clone(rpc), identity));

    let bridge = ClientBridge::new(Arc::clone(&room), state.config.rpc_timeout);
    let reporter = ToolActivityReporter::new(room);
    let dispatcher = ToolDispatcher::new(state.recipes.clone(), bridge, reporter);

    Arc::new(CookingAgent::start(
        state.persona.clone(),
        dispatcher,
        continuation,
        user_context,
    ))
}
