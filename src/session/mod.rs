//! Cooking-session state: phases, continuation payloads, and the
//! tool-sequence policy.
//!
//! The session itself is owned by the client/backend — the agent only writes
//! through the Client Bridge and reads state back via the continuation
//! payload delivered once at session start. What lives here is the pure
//! decision logic: which continuation state a payload resolves to, what the
//! opening reply should cover, and which tool calls are legal in the current
//! stretch of the pipeline.

mod policy;

pub use policy::SequencePolicy;

use serde::{Deserialize, Serialize};

/// Coarse-grained stage of a cooking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingPhase {
    /// Initial small talk, before ingredients come up
    Greeting,
    /// Collecting and validating what the user has on hand
    IngredientGathering,
    /// Candidates presented, waiting for a pick
    RecipeSelection,
    /// Step-by-step guidance; `current_step` is meaningful only here
    Cooking,
    /// Dish done
    Completed,
}

impl std::fmt::Display for CookingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::IngredientGathering => "ingredient_gathering",
            Self::RecipeSelection => "recipe_selection",
            Self::Cooking => "cooking",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One turn of a previously recorded conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// Speaker role ("user" or "assistant")
    pub role: String,
    /// What was said
    pub content: String,
}

/// Payload describing a previously interrupted cooking session.
///
/// Supplied once at session start by the hosting runtime; read-only to the
/// agent. All fields are optional on the wire — absent fields deserialize to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContinuationContext {
    /// Whether the client considers this a resumed session
    #[serde(default)]
    pub is_continuation: bool,

    /// Name of the recipe in progress, if one was chosen
    #[serde(default)]
    pub recipe_name: Option<String>,

    /// Identifier of the recipe in progress
    #[serde(default)]
    pub recipe_id: Option<String>,

    /// Full instruction breakdown persisted by the client; opaque here
    #[serde(default)]
    pub recipe_data: Option<serde_json::Value>,

    /// Step the user was on; meaningful only when the phase was cooking
    #[serde(default)]
    pub current_step: Option<u32>,

    /// Phase the session was in when interrupted
    #[serde(default)]
    pub current_phase: Option<CookingPhase>,

    /// Prior conversation, oldest first
    #[serde(default)]
    pub previous_transcript: Vec<TranscriptTurn>,

    /// Ingredients gathered so far
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl ContinuationContext {
    /// Whether the payload references a prior recipe at all
    #[must_use]
    pub fn references_recipe(&self) -> bool {
        self.recipe_id.as_deref().is_some_and(|s| !s.is_empty())
            || self.recipe_name.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether a usable instruction breakdown was persisted.
    ///
    /// `null`, `{}`, `[]`, and `""` all count as absent — clients have sent
    /// each of these to mean "nothing stored".
    #[must_use]
    pub fn has_recipe_data(&self) -> bool {
        match &self.recipe_data {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(m)) => !m.is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Per-user context delivered once at session start; personalization only
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserContext {
    /// Name to address the user by
    #[serde(default)]
    pub user_name: Option<String>,

    /// Free-form preference summary maintained by the client
    #[serde(default)]
    pub preferences: Option<String>,

    /// Short summary of prior interactions
    #[serde(default)]
    pub context_summary: Option<String>,
}

/// How the session opens, decided exactly once at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationState {
    /// No prior state: full greeting, ask for ingredients
    Fresh,
    /// A prior dish was completed: brief greeting, ask what to cook next
    Restarting,
    /// Mid-recipe with persisted instructions: resume from the stored step
    ContinuingWithData,
    /// Returning user without persisted instructions: confirm where they were
    ContinuingWithoutData,
}

impl ContinuationState {
    /// Resolve the opening state from the inbound payload.
    ///
    /// Pure function of the payload: the same input always yields the same
    /// state, and nothing else is consulted.
    #[must_use]
    pub fn resolve(context: Option<&ContinuationContext>) -> Self {
        let Some(ctx) = context else {
            return Self::Fresh;
        };

        if ctx.is_continuation {
            if ctx.has_recipe_data() {
                Self::ContinuingWithData
            } else {
                Self::ContinuingWithoutData
            }
        } else if ctx.references_recipe() {
            Self::Restarting
        } else {
            Self::Fresh
        }
    }
}

/// Build the reply-generation instructions for the session's opening turn.
///
/// These are hints handed to the realtime model, not literal speech: they
/// tell it what the first reply must cover for the resolved state.
#[must_use]
pub fn opening_instructions(
    state: ContinuationState,
    context: Option<&ContinuationContext>,
    user: Option<&UserContext>,
) -> String {
    let name_clause = user
        .and_then(|u| u.user_name.as_deref())
        .filter(|n| !n.is_empty())
        .map_or_else(String::new, |n| format!(" Address the user as {n}."));

    match state {
        ContinuationState::Fresh => format!(
            "Introduce yourself and ask what ingredients you two will be \
             working with today.{name_clause}"
        ),
        ContinuationState::Restarting => {
            let dish = context
                .and_then(|c| c.recipe_name.as_deref())
                .unwrap_or("the last dish");
            format!(
                "Greet the user briefly, mention that {dish} turned out last \
                 time, and ask what they would like to cook next.{name_clause}"
            )
        }
        ContinuationState::ContinuingWithData => {
            let dish = context
                .and_then(|c| c.recipe_name.as_deref())
                .unwrap_or("your recipe");
            let step = context.and_then(|c| c.current_step).unwrap_or(1);
            format!(
                "The user is returning mid-recipe. Skip the greeting and all \
                 ingredient or recipe questions. Confirm you are picking \
                 {dish} back up at step {step} and continue guiding from \
                 there using the stored instructions — do not fetch them \
                 again.{name_clause}"
            )
        }
        ContinuationState::ContinuingWithoutData => {
            let recap = context
                .map(|c| transcript_recap(&c.previous_transcript))
                .unwrap_or_default();
            format!(
                "The user is returning but no recipe data was stored. \
                 Acknowledge that they are back and ask them to confirm where \
                 they left off.{recap}{name_clause}"
            )
        }
    }
}

/// Fold the tail of a prior transcript into a short context clause
fn transcript_recap(transcript: &[TranscriptTurn]) -> String {
    if transcript.is_empty() {
        return String::new();
    }

    let tail: Vec<String> = transcript
        .iter()
        .rev()
        .take(4)
        .map(|t| format!("{}: {}", t.role, t.content))
        .collect();
    let mut lines = tail;
    lines.reverse();
    format!(" The conversation previously ended with: {}.", lines.join(" / "))
}
