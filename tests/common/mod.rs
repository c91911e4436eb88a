//! Shared test utilities

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::Router;

use sous_gateway::agent::CookingAgent;
use sous_gateway::bridge::ClientBridge;
use sous_gateway::config::RecipeApiConfig;
use sous_gateway::notify::ToolActivityReporter;
use sous_gateway::recipes::RecipeClient;
use sous_gateway::runtime::{RoomHandle, RpcError, RpcRequest};
use sous_gateway::session::{ContinuationContext, UserContext};
use sous_gateway::tools::ToolDispatcher;
use sous_gateway::Persona;

/// Room that records every signal the agent emits and answers every RPC
#[derive(Default)]
pub struct RecordingRoom {
    pub attributes: Mutex<Vec<(String, String)>>,
    pub data: Mutex<Vec<serde_json::Value>>,
    pub rpcs: Mutex<Vec<RpcRequest>>,
}

#[async_trait]
impl RoomHandle for RecordingRoom {
    fn linked_participant(&self) -> Option<String> {
        Some("test-client".to_string())
    }

    async fn set_local_attribute(&self, key: &str, value: &str) -> sous_gateway::Result<()> {
        self.attributes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn publish_data(
        &self,
        payload: &serde_json::Value,
        _reliable: bool,
    ) -> sous_gateway::Result<()> {
        self.data.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcError> {
        self.rpcs.lock().unwrap().push(request);
        Ok(r#"{"status":"saved"}"#.to_string())
    }
}

/// Requests the stub provider has served, as full path-and-query strings
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Spawn a canned recipe provider on an ephemeral port.
///
/// Serves fixed bodies keyed by path, records every request, and returns 402
/// with a quota message for any recipe id of "402".
pub async fn spawn_recipe_stub() -> (String, RequestLog) {
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));

    let log_for_handler = Arc::clone(&log);
    let app = Router::new().fallback(move |uri: Uri| {
        let log = Arc::clone(&log_for_handler);
        async move {
            log.lock().unwrap().push(uri.to_string());
            stub_response(uri.path())
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("stub has no local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), log)
}

fn stub_response(path: &str) -> axum::response::Response {
    if path.starts_with("/recipes/402/") {
        return (
            axum::http::StatusCode::PAYMENT_REQUIRED,
            r#"{"message":"daily quota exceeded"}"#,
        )
            .into_response();
    }

    let body = match path {
        "/food/ingredients/search" => {
            r#"{"results":[{"id":9003,"name":"apple"}],"totalResults":1}"#
        }
        "/recipes/findByIngredients" => {
            r#"[{"id":12345,"title":"Chicken Stir Fry","missedIngredientCount":1}]"#
        }
        p if p.ends_with("/similar") => r#"[{"id":67890,"title":"Beef Stir Fry"}]"#,
        p if p.ends_with("/summary") => {
            r#"{"id":12345,"summary":"A quick weeknight stir fry."}"#
        }
        p if p.ends_with("/analyzedInstructions") => {
            r#"[{"name":"","steps":[{"number":1,"step":"Heat the wok."}]}]"#
        }
        _ => r#"{}"#,
    };
    (axum::http::StatusCode::OK, body).into_response()
}

/// Build an agent whose recipe lookups hit the stub and whose room is `room`
pub fn agent_over(
    room: Arc<RecordingRoom>,
    base_url: &str,
    continuation: Option<ContinuationContext>,
    user: Option<UserContext>,
) -> CookingAgent {
    let room: Arc<dyn RoomHandle> = room;
    let recipes = RecipeClient::new(&RecipeApiConfig::for_endpoint(base_url, "test-key"))
        .expect("failed to build recipe client");
    let bridge = ClientBridge::new(Arc::clone(&room), Duration::from_secs(2));
    let reporter = ToolActivityReporter::new(room);
    CookingAgent::start(
        Persona::basil(),
        ToolDispatcher::new(recipes, bridge, reporter),
        continuation,
        user,
    )
}
