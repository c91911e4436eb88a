//! Persona — the agent's identity and standing instructions

use serde::{Deserialize, Serialize};

/// Basil's standing instructions, embedded at compile time
const BASIL_INSTRUCTIONS: &str = include_str!("../prompts/basil.md");

/// The agent's identity as presented to the realtime model and to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Display name
    pub name: String,
    /// Voice identifier for the hosting runtime's TTS
    pub voice: String,
    /// Full natural-language instructions document
    pub instructions: String,
}

impl Persona {
    /// The default cooking companion persona
    #[must_use]
    pub fn basil() -> Self {
        Self {
            name: "Basil".to_string(),
            voice: "warm".to_string(),
            instructions: BASIL_INSTRUCTIONS.to_string(),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::basil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_persona_carries_the_pipeline() {
        let p = Persona::default();
        assert_eq!(p.name, "Basil");
        // the instructions must name every tool the model can call
        for tool in [
            "search_ingredients",
            "search_recipes_by_ingredients",
            "get_similar_recipes",
            "summarize_recipe",
            "get_recipe_instructions",
            "update_cooking_session",
            "update_user_preferences",
            "add_to_favorites",
        ] {
            assert!(p.instructions.contains(tool), "instructions missing {tool}");
        }
    }

    #[test]
    fn instructions_forbid_fabrication() {
        let p = Persona::basil();
        assert!(p.instructions.contains("Never invent"));
    }
}
