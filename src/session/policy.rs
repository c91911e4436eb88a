//! Legal tool-call sequences for a cooking session.
//!
//! The tools themselves stay stateless and order-agnostic; it is the
//! conversational layer that knows which calls make sense in which stretch of
//! the pipeline. The realtime model drives tool sequencing and is
//! non-deterministic, so the policy guards the two invariants that matter
//! rather than scripting an exact order: instructions are never fetched
//! before a recipe exists to fetch them for, and a session resumed with
//! persisted recipe data never re-runs searches or re-fetches instructions.

use crate::session::{ContinuationContext, ContinuationState};
use crate::tools::{
    GET_RECIPE_INSTRUCTIONS, GET_SIMILAR_RECIPES, SEARCH_INGREDIENTS,
    SEARCH_RECIPES_BY_INGREDIENTS, SUMMARIZE_RECIPE,
};
use crate::ToolError;

/// Gatekeeper for tool calls within one session
#[derive(Debug, Clone)]
pub struct SequencePolicy {
    /// Session resumed with persisted recipe data; lookups are frozen
    resumed_with_data: bool,
    /// A recipe is known, either from a search result or the prior session
    recipe_known: bool,
}

impl SequencePolicy {
    /// Build the policy for a freshly resolved session
    #[must_use]
    pub fn new(state: ContinuationState, context: Option<&ContinuationContext>) -> Self {
        let resumed_with_data = state == ContinuationState::ContinuingWithData;
        // Continuing without data: the prior session already picked a recipe,
        // so instruction fetches are legal as soon as the user confirms.
        let recipe_known = state == ContinuationState::ContinuingWithoutData
            && context.is_some_and(ContinuationContext::references_recipe);

        Self {
            resumed_with_data,
            recipe_known,
        }
    }

    /// Check whether `tool` may be invoked right now
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::OutOfSequence`] when the call would violate the
    /// pipeline invariants.
    pub fn check(&self, tool: &str) -> Result<(), ToolError> {
        match tool {
            SEARCH_INGREDIENTS | SEARCH_RECIPES_BY_INGREDIENTS if self.resumed_with_data => {
                Err(ToolError::OutOfSequence {
                    tool: tool.to_string(),
                    reason: "session resumed with stored recipe data; use it instead of searching"
                        .to_string(),
                })
            }
            GET_RECIPE_INSTRUCTIONS if self.resumed_with_data => Err(ToolError::OutOfSequence {
                tool: tool.to_string(),
                reason: "instructions were restored from the previous session".to_string(),
            }),
            GET_RECIPE_INSTRUCTIONS | SUMMARIZE_RECIPE | GET_SIMILAR_RECIPES
                if !self.recipe_known =>
            {
                Err(ToolError::OutOfSequence {
                    tool: tool.to_string(),
                    reason: "no recipe has been found yet; search by ingredients first"
                        .to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Record a successful call so later checks see its effect
    pub fn observe_success(&mut self, tool: &str) {
        if tool == SEARCH_RECIPES_BY_INGREDIENTS || tool == GET_SIMILAR_RECIPES {
            self.recipe_known = true;
        }
    }
}
