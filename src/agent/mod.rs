//! The cooking agent — per-session orchestration.
//!
//! One agent exists per hosted session. At start it resolves how the
//! conversation opens from the continuation payload, then mediates every tool
//! call the realtime model makes: the sequence policy rules on legality, the
//! dispatcher executes, and successful calls feed back into the policy.

use std::sync::Mutex;

use crate::persona::Persona;
use crate::session::{
    opening_instructions, ContinuationContext, ContinuationState, SequencePolicy, UserContext,
};
use crate::tools::ToolDispatcher;
use crate::ToolError;

/// Orchestrates one cooking session
pub struct CookingAgent {
    persona: Persona,
    dispatcher: ToolDispatcher,
    policy: Mutex<SequencePolicy>,
    state: ContinuationState,
    opening: String,
}

impl CookingAgent {
    /// Start a session, resolving the opening state exactly once from the
    /// payloads delivered by the hosting runtime.
    #[must_use]
    pub fn start(
        persona: Persona,
        dispatcher: ToolDispatcher,
        continuation: Option<ContinuationContext>,
        user: Option<UserContext>,
    ) -> Self {
        let state = ContinuationState::resolve(continuation.as_ref());
        let opening = opening_instructions(state, continuation.as_ref(), user.as_ref());
        let policy = SequencePolicy::new(state, continuation.as_ref());

        tracing::info!(state = ?state, agent = %persona.name, "session started");

        Self {
            persona,
            dispatcher,
            policy: Mutex::new(policy),
            state,
            opening,
        }
    }

    /// The agent's identity
    #[must_use]
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Reply-generation hints for the session's first turn
    #[must_use]
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// How the session was resolved to open
    #[must_use]
    pub fn state(&self) -> ContinuationState {
        self.state
    }

    /// Execute one tool call on behalf of the realtime model.
    ///
    /// The policy rules first; a rejected call never reaches a backend and
    /// never produces activity signals. Successful calls update the policy so
    /// later checks see their effect.
    ///
    /// # Errors
    ///
    /// [`ToolError::OutOfSequence`] for calls the policy rejects, otherwise
    /// whatever the tool itself returns.
    pub async fn handle_tool_call(
        &self,
        name: &str,
        arguments: &str,
    ) -> Result<String, ToolError> {
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .check(name)?;

        let result = self.dispatcher.dispatch(name, arguments).await;

        match &result {
            Ok(_) => self
                .policy
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .observe_success(name),
            Err(e) => tracing::warn!(tool = name, error = %e, "tool call failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::bridge::ClientBridge;
    use crate::config::RecipeApiConfig;
    use crate::notify::ToolActivityReporter;
    use crate::recipes::RecipeClient;
    use crate::runtime::{RoomHandle, RpcError, RpcRequest};

    /// Room that answers every RPC and drops activity signals silently
    struct QuietRoom;

    #[async_trait]
    impl RoomHandle for QuietRoom {
        fn linked_participant(&self) -> Option<String> {
            Some("client-1".to_string())
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

        async fn perform_rpc(&self, _request: RpcRequest) -> Result<String, RpcError> {
            Ok(r#"{"status":"saved"}"#.to_string())
        }
    }

    fn agent(continuation: Option<ContinuationContext>) -> CookingAgent {
        let room: Arc<dyn RoomHandle> = Arc::new(QuietRoom);
        // nothing listens here; recipe lookups in these tests must not happen
        let recipes =
            RecipeClient::new(&RecipeApiConfig::for_endpoint("http://127.0.0.1:9", "k")).unwrap();
        let bridge = ClientBridge::new(Arc::clone(&room), Duration::from_secs(1));
        let reporter = ToolActivityReporter::new(room);
        CookingAgent::start(
            Persona::basil(),
            ToolDispatcher::new(recipes, bridge, reporter),
            continuation,
            None,
        )
    }

    #[tokio::test]
    async fn fresh_session_rejects_premature_instruction_fetch() {
        let agent = agent(None);
        let err = agent
            .handle_tool_call("get_recipe_instructions", r#"{"id":"12345"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::OutOfSequence { .. }));
    }

    #[tokio::test]
    async fn resumed_session_rejects_searches() {
        let ctx = ContinuationContext {
            is_continuation: true,
            recipe_id: Some("715538".to_string()),
            recipe_data: Some(serde_json::json!({"steps": [1]})),
            ..ContinuationContext::default()
        };
        let agent = agent(Some(ctx));
        assert_eq!(agent.state(), ContinuationState::ContinuingWithData);

        let err = agent
            .handle_tool_call("search_recipes_by_ingredients", r#"{"ingredients":"eggs"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::OutOfSequence { .. }));
    }

    #[tokio::test]
    async fn bridge_writes_flow_in_any_state() {
        let agent = agent(None);
        let out = agent
            .handle_tool_call("update_user_preferences", r#"{"notes":"hates cilantro"}"#)
            .await
            .unwrap();
        assert_eq!(out, r#"{"status":"saved"}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_such() {
        let agent = agent(None);
        let err = agent.handle_tool_call("order_takeout", "{}").await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[test]
    fn opening_comes_from_resolved_state() {
        let agent = agent(None);
        assert_eq!(agent.state(), ContinuationState::Fresh);
        assert!(agent.opening().contains("ingredients"));
    }
}
