//! Client bridge — write operations delegated to the linked participant.
//!
//! Preferences, cooking-session progress, and favorites live in the client's
//! own store, not in this process. Each operation serializes its parameters,
//! performs one RPC addressed to the linked participant, and returns the
//! remote response verbatim. Failures are never absorbed: a lost write here
//! means the session cannot be reconstructed on reconnect, so the caller must
//! hear about it.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::runtime::{RoomHandle, RpcRequest};
use crate::session::CookingPhase;
use crate::ToolError;

/// RPC method handled by the client for preference updates
pub const METHOD_UPDATE_USER_PREFERENCES: &str = "update_user_preferences";

/// RPC method handled by the client for session-progress updates
pub const METHOD_UPDATE_COOKING_SESSION: &str = "update_cooking_session";

/// RPC method handled by the client for adding favorites
pub const METHOD_ADD_TO_FAVORITES: &str = "add_to_favorites";

/// Preference fields to merge into the user's stored profile.
///
/// Multi-value fields travel as comma-joined strings. Omitted fields
/// serialize as `null` so the client can distinguish "unchanged" from an
/// explicit empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    /// e.g. "vegetarian, gluten-free"
    pub dietary_restrictions: Option<String>,
    /// e.g. "cilantro, olives"
    pub disliked_ingredients: Option<String>,
    /// e.g. "italian, thai"
    pub favorite_cuisines: Option<String>,
    /// Free text: skill level, time constraints, anything worth remembering
    pub notes: Option<String>,
}

/// Full cooking-session snapshot written through to the client's store.
///
/// Early-phase updates legitimately omit recipe fields, so everything
/// defaults rather than failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookingSessionUpdate {
    /// Validated ingredients gathered so far
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Identifier of the chosen recipe; empty until one is picked
    #[serde(default)]
    pub recipe_id: String,
    /// Display name of the chosen recipe
    #[serde(default)]
    pub recipe_name: String,
    /// Opaque instruction breakdown, stored for later resumption
    #[serde(default)]
    pub recipe_data: serde_json::Value,
    /// 1-based step; meaningful only when the phase is cooking
    pub current_step: Option<u32>,
    /// Phase the session has reached
    pub current_phase: Option<CookingPhase>,
}

/// A recipe the user asked to keep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecipe {
    /// Provider identifier
    pub recipe_id: String,
    /// Display name
    pub recipe_name: String,
    /// Image URL, if the provider supplied one
    pub recipe_image: Option<String>,
    /// User rating, 1–5
    pub rating: Option<u8>,
    /// Short description
    pub description: Option<String>,
    /// Comma-joined ingredient list
    pub ingredients: Option<String>,
}

/// Relay for write operations addressed to the linked participant
#[derive(Clone)]
pub struct ClientBridge {
    room: Arc<dyn RoomHandle>,
    timeout: Duration,
}

impl ClientBridge {
    /// Create a bridge bound to a room, with the given RPC time box
    #[must_use]
    pub fn new(room: Arc<dyn RoomHandle>, timeout: Duration) -> Self {
        Self { room, timeout }
    }

    /// Merge preference fields into the user's stored profile
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn update_user_preferences(
        &self,
        update: &PreferencesUpdate,
    ) -> Result<String, ToolError> {
        self.call(METHOD_UPDATE_USER_PREFERENCES, update).await
    }

    /// Persist the current cooking-session snapshot
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn update_cooking_session(
        &self,
        update: &CookingSessionUpdate,
    ) -> Result<String, ToolError> {
        self.call(METHOD_UPDATE_COOKING_SESSION, update).await
    }

    /// Add a recipe to the user's favorites
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn add_to_favorites(&self, favorite: &FavoriteRecipe) -> Result<String, ToolError> {
        self.call(METHOD_ADD_TO_FAVORITES, favorite).await
    }

    /// Serialize `payload` and perform one RPC against the linked
    /// participant, waiting at most the configured time box.
    ///
    /// # Errors
    ///
    /// - no participant linked → [`ToolError::NoLinkedParticipant`], before
    ///   any RPC is attempted
    /// - handler error or dropped connection → [`ToolError::Rpc`]
    /// - no response within the time box → [`ToolError::Timeout`]
    async fn call<T: Serialize + Sync>(
        &self,
        method: &str,
        payload: &T,
    ) -> Result<String, ToolError> {
        let destination = self
            .room
            .linked_participant()
            .ok_or(ToolError::NoLinkedParticipant)?;

        let payload = serde_json::to_string(payload)
            .map_err(|e| ToolError::Rpc(format!("payload encoding failed: {e}")))?;

        let request = RpcRequest {
            destination,
            method: method.to_string(),
            payload,
        };

        tracing::debug!(method, "performing client rpc");

        match tokio::time::timeout(self.timeout, self.room.perform_rpc(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ToolError::Rpc(e.to_string())),
            Err(_) => Err(ToolError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::runtime::RpcError;

    /// Room mock with a scriptable RPC outcome and an attempt counter
    struct ScriptedRoom {
        participant: Option<String>,
        attempts: AtomicUsize,
        requests: Mutex<Vec<RpcRequest>>,
        outcome: Outcome,
    }

    enum Outcome {
        Respond(String),
        Fail(String),
        Hang,
    }

    impl ScriptedRoom {
        fn with_outcome(outcome: Outcome) -> Self {
            Self {
                participant: Some("client-7".to_string()),
                attempts: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome,
            }
        }

        fn unlinked() -> Self {
            Self {
                participant: None,
                attempts: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome: Outcome::Respond(String::new()),
            }
        }
    }

    #[async_trait]
    impl RoomHandle for ScriptedRoom {
        fn linked_participant(&self) -> Option<String> {
            self.participant.clone()
        }

        async fn set_local_attribute(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Ok(())
        }

        async fn publish_data(
            &self,
            _payload: &serde_json::Value,
            _reliable: bool,
        ) -> crate::Result<()> {
            Ok(())
        }

        async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            match &self.outcome {
                Outcome::Respond(body) => Ok(body.clone()),
                Outcome::Fail(msg) => Err(RpcError::Remote(msg.clone())),
                Outcome::Hang => {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn bridge(room: Arc<ScriptedRoom>) -> ClientBridge {
        ClientBridge::new(room as Arc<dyn RoomHandle>, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn unlinked_session_fails_without_any_rpc() {
        let room = Arc::new(ScriptedRoom::unlinked());
        let bridge = ClientBridge::new(
            Arc::clone(&room) as Arc<dyn RoomHandle>,
            Duration::from_secs(10),
        );

        let err = bridge
            .update_user_preferences(&PreferencesUpdate::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::NoLinkedParticipant));
        assert_eq!(room.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn response_is_returned_verbatim() {
        let room = Arc::new(ScriptedRoom::with_outcome(Outcome::Respond(
            r#"{"status":"saved"}"#.to_string(),
        )));
        let out = bridge(Arc::clone(&room))
            .update_cooking_session(&CookingSessionUpdate::default())
            .await
            .unwrap();
        assert_eq!(out, r#"{"status":"saved"}"#);
        assert_eq!(room.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_failure_surfaces_as_rpc_error() {
        let room = Arc::new(ScriptedRoom::with_outcome(Outcome::Fail(
            "storage write rejected".to_string(),
        )));
        let err = bridge(room)
            .add_to_favorites(&FavoriteRecipe::default())
            .await
            .unwrap_err();
        match err {
            ToolError::Rpc(msg) => assert!(msg.contains("storage write rejected")),
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresponsive_client_times_out() {
        let room = Arc::new(ScriptedRoom::with_outcome(Outcome::Hang));
        let bridge = ClientBridge::new(room as Arc<dyn RoomHandle>, Duration::from_millis(20));
        let err = bridge
            .update_cooking_session(&CookingSessionUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout(_)));
    }

    #[tokio::test]
    async fn rpc_addresses_the_linked_participant() {
        let room = Arc::new(ScriptedRoom::with_outcome(Outcome::Respond("ok".to_string())));
        bridge(Arc::clone(&room))
            .update_user_preferences(&PreferencesUpdate {
                favorite_cuisines: Some("thai".to_string()),
                ..PreferencesUpdate::default()
            })
            .await
            .unwrap();

        let requests = room.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].destination, "client-7");
        assert_eq!(requests[0].method, METHOD_UPDATE_USER_PREFERENCES);
    }

    #[test]
    fn omitted_favorite_fields_serialize_as_null() {
        let favorite = FavoriteRecipe {
            recipe_id: "12345".to_string(),
            recipe_name: "Chicken Stir Fry".to_string(),
            rating: Some(5),
            ..FavoriteRecipe::default()
        };
        let value = serde_json::to_value(&favorite).unwrap();
        assert_eq!(value["recipe_id"], "12345");
        assert_eq!(value["rating"], 5);
        // absent, not empty strings that could read as explicit values
        assert!(value["recipe_image"].is_null());
        assert!(value["description"].is_null());
        assert!(value["ingredients"].is_null());
    }

    #[test]
    fn session_update_round_trips_phase_and_step() {
        let update = CookingSessionUpdate {
            ingredients: vec!["chicken".to_string(), "rice".to_string()],
            recipe_id: "12345".to_string(),
            recipe_name: "Chicken Stir Fry".to_string(),
            recipe_data: serde_json::json!({"steps": ["heat the wok"]}),
            current_step: Some(1),
            current_phase: Some(CookingPhase::Cooking),
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains(r#""current_phase":"cooking""#));
        let back: CookingSessionUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }
}
