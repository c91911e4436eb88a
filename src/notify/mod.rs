//! Tool activity reporter — advisory "agent is working" signals.
//!
//! Announces tool start and end to the connected client over two redundant
//! channels: a shared attribute (state visible on join) and a data-channel
//! message (event stream). Both are best-effort: delivery failures are logged
//! and swallowed, never propagated — a UI indicator is not worth aborting an
//! otherwise-successful tool call.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::runtime::RoomHandle;

/// Shared attribute key carrying the in-flight tool name.
///
/// Value is `{"name": <tool>}` while a tool runs and the empty string once it
/// finishes, so a client joining mid-call still sees the indicator.
pub const TOOL_CALL_ATTRIBUTE: &str = "agent.tool_call";

/// Event published on the data channel at each tool lifecycle edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolActivity {
    /// A tool began executing
    ToolCall {
        /// Tool name
        name: String,
    },
    /// A tool finished executing (successfully or not)
    ToolResult {
        /// Tool name
        name: String,
    },
}

/// Reports tool lifecycle edges to the connected client
#[derive(Clone)]
pub struct ToolActivityReporter {
    room: Arc<dyn RoomHandle>,
}

impl ToolActivityReporter {
    /// Create a reporter bound to a room
    #[must_use]
    pub fn new(room: Arc<dyn RoomHandle>) -> Self {
        Self { room }
    }

    /// Announce that `tool` is about to execute
    pub async fn report_start(&self, tool: &str) {
        let attr = serde_json::json!({ "name": tool }).to_string();
        if let Err(e) = self.room.set_local_attribute(TOOL_CALL_ATTRIBUTE, &attr).await {
            tracing::warn!(tool, error = %e, "failed to set tool-call attribute");
        }

        let event = ToolActivity::ToolCall {
            name: tool.to_string(),
        };
        self.publish(&event, tool).await;
        tracing::info!(tool, "tool started");
    }

    /// Announce that `tool` has finished executing
    pub async fn report_end(&self, tool: &str) {
        if let Err(e) = self.room.set_local_attribute(TOOL_CALL_ATTRIBUTE, "").await {
            tracing::warn!(tool, error = %e, "failed to clear tool-call attribute");
        }

        let event = ToolActivity::ToolResult {
            name: tool.to_string(),
        };
        self.publish(&event, tool).await;
        tracing::info!(tool, "tool ended");
    }

    /// Run a tool body bracketed by start/end notifications.
    ///
    /// The end notification fires regardless of how the body resolves, so a
    /// failing tool never leaves a stale "working" indicator behind.
    pub async fn instrument<T, F>(&self, tool: &str, body: F) -> T
    where
        F: Future<Output = T>,
    {
        self.report_start(tool).await;
        let result = body.await;
        self.report_end(tool).await;
        result
    }

    /// Serialize and publish an activity event, logging delivery failures
    async fn publish(&self, event: &ToolActivity, tool: &str) {
        match serde_json::to_value(event) {
            Ok(payload) => {
                if let Err(e) = self.room.publish_data(&payload, true).await {
                    tracing::warn!(tool, error = %e, "failed to publish tool activity");
                }
            }
            Err(e) => tracing::warn!(tool, error = %e, "failed to encode tool activity"),
        }
    }
}
