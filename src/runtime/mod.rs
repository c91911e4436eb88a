//! Seam to the externally supplied real-time agent runtime.
//!
//! The audio session, turn-taking, and realtime language model live outside
//! this process and are consumed through a fixed interface. [`RoomHandle`] is
//! that interface: shared attributes and data-channel messages toward the
//! connected client, plus remote procedure calls addressed to the linked
//! participant. The WebSocket-backed implementation lives in
//! `server::ws`; tests substitute in-memory mocks.

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a remote procedure call, before tool-boundary translation
#[derive(Debug, Error)]
pub enum RpcError {
    /// The connection to the participant dropped before a response arrived
    #[error("rpc channel closed")]
    ChannelClosed,

    /// The participant's handler responded with an explicit error
    #[error("{0}")]
    Remote(String),
}

/// A remote procedure call addressed to a participant
#[derive(Debug, Clone)]
pub struct RpcRequest {
    /// Identity of the participant that should handle the call
    pub destination: String,
    /// Method name registered on the participant
    pub method: String,
    /// JSON-serialized payload
    pub payload: String,
}

/// Handle to the room a session is hosted in.
///
/// All methods are advisory-or-bounded: attribute and data publishing are
/// fire-and-forget from the caller's perspective, and `perform_rpc` resolves
/// when the participant responds or the connection drops — the caller applies
/// its own time box.
#[async_trait]
pub trait RoomHandle: Send + Sync {
    /// Identity of the single participant currently linked to this session,
    /// if any.
    fn linked_participant(&self) -> Option<String>;

    /// Set a key-value attribute visible to every participant on join.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute could not be delivered to the room.
    async fn set_local_attribute(&self, key: &str, value: &str) -> crate::Result<()>;

    /// Publish a message on the room's data channel.
    ///
    /// `reliable` requests delivery-preferring transport; the channel may
    /// still drop or reorder messages relative to attribute updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed to the channel.
    async fn publish_data(&self, payload: &serde_json::Value, reliable: bool) -> crate::Result<()>;

    /// Perform a remote procedure call and wait for the participant's
    /// response.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Remote`] if the handler reported a failure and
    /// [`RpcError::ChannelClosed`] if the participant disconnected first.
    async fn perform_rpc(&self, request: RpcRequest) -> std::result::Result<String, RpcError>;
}
