//! Tool registry and dispatcher.
//!
//! Every operation the realtime model may invoke is registered here with a
//! JSON schema, and every dispatch is bracketed by the activity reporter —
//! including the failure path. The tools themselves are stateless; sequencing
//! rules live with the session policy, not here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bridge::{ClientBridge, CookingSessionUpdate, FavoriteRecipe, PreferencesUpdate};
use crate::notify::ToolActivityReporter;
use crate::recipes::RecipeClient;
use crate::ToolError;

/// Validate ingredient terms against the provider's whole-food index
pub const SEARCH_INGREDIENTS: &str = "search_ingredients";
/// Find candidate recipes for a comma-separated ingredient list
pub const SEARCH_RECIPES_BY_INGREDIENTS: &str = "search_recipes_by_ingredients";
/// Find recipes similar to a given one
pub const GET_SIMILAR_RECIPES: &str = "get_similar_recipes";
/// Short natural-language summary of a recipe
pub const SUMMARIZE_RECIPE: &str = "summarize_recipe";
/// Full analyzed step breakdown of a recipe
pub const GET_RECIPE_INSTRUCTIONS: &str = "get_recipe_instructions";
/// Merge preference fields into the user's stored profile
pub const UPDATE_USER_PREFERENCES: &str = "update_user_preferences";
/// Persist the cooking-session snapshot
pub const UPDATE_COOKING_SESSION: &str = "update_cooking_session";
/// Save a recipe to the user's favorites
pub const ADD_TO_FAVORITES: &str = "add_to_favorites";

/// A tool exposed to the realtime model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Name the model invokes it by
    pub name: String,
    /// What the model is told it does
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

fn definition(name: &str, description: &str, parameters: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// The full tool surface announced to the realtime model at session start
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        definition(
            SEARCH_INGREDIENTS,
            "Search for simple whole foods (fruits, vegetables, grains, meat, fish, dairy) \
             by partial or full name.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Partial or full ingredient name" }
                },
                "required": ["query"]
            }),
        ),
        definition(
            SEARCH_RECIPES_BY_INGREDIENTS,
            "Find recipes that use as many of the given ingredients as possible and require \
             as few additional ingredients as possible.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ingredients": {
                        "type": "string",
                        "description": "Comma-separated list of ingredients the recipes should use"
                    }
                },
                "required": ["ingredients"]
            }),
        ),
        definition(
            GET_SIMILAR_RECIPES,
            "Find recipes similar to the given one.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Id of the source recipe" }
                },
                "required": ["id"]
            }),
        ),
        definition(
            SUMMARIZE_RECIPE,
            "Generate a short description summarizing key information about a recipe.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "The recipe id" }
                },
                "required": ["id"]
            }),
        ),
        definition(
            GET_RECIPE_INSTRUCTIONS,
            "Get an analyzed breakdown of a recipe's instructions; each step is enriched \
             with the ingredients and equipment required.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "The recipe id" }
                },
                "required": ["id"]
            }),
        ),
        definition(
            UPDATE_USER_PREFERENCES,
            "Update the user's cooking preferences whenever they mention dietary \
             restrictions, disliked ingredients, favorite cuisines, or anything worth \
             remembering. Pass multiple values as comma-separated strings.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "dietary_restrictions": { "type": ["string", "null"] },
                    "disliked_ingredients": { "type": ["string", "null"] },
                    "favorite_cuisines": { "type": ["string", "null"] },
                    "notes": { "type": ["string", "null"] }
                }
            }),
        ),
        definition(
            UPDATE_COOKING_SESSION,
            "Persist cooking-session progress. Call at every phase transition and after \
             every completed step so an interrupted session can resume.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ingredients": { "type": "array", "items": { "type": "string" } },
                    "recipe_id": { "type": "string" },
                    "recipe_name": { "type": "string" },
                    "recipe_data": { "description": "Full instruction breakdown, stored opaquely" },
                    "current_step": { "type": ["integer", "null"], "minimum": 1 },
                    "current_phase": {
                        "type": ["string", "null"],
                        "enum": [
                            "greeting", "ingredient_gathering", "recipe_selection",
                            "cooking", "completed", null
                        ]
                    }
                },
                "required": ["ingredients", "recipe_id", "recipe_name", "recipe_data"]
            }),
        ),
        definition(
            ADD_TO_FAVORITES,
            "Save a recipe to the user's favorites.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "recipe_id": { "type": "string" },
                    "recipe_name": { "type": "string" },
                    "recipe_image": { "type": ["string", "null"] },
                    "rating": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 },
                    "description": { "type": ["string", "null"] },
                    "ingredients": { "type": ["string", "null"] }
                },
                "required": ["recipe_id", "recipe_name"]
            }),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct IngredientsArgs {
    ingredients: String,
}

#[derive(Debug, Deserialize)]
struct RecipeIdArgs {
    id: String,
}

/// Routes named tool calls to the recipe gateway or the client bridge
#[derive(Clone)]
pub struct ToolDispatcher {
    recipes: RecipeClient,
    bridge: ClientBridge,
    reporter: ToolActivityReporter,
}

impl ToolDispatcher {
    /// Create a dispatcher over the two tool backends
    #[must_use]
    pub fn new(
        recipes: RecipeClient,
        bridge: ClientBridge,
        reporter: ToolActivityReporter,
    ) -> Self {
        Self {
            recipes,
            bridge,
            reporter,
        }
    }

    /// Execute a named tool with raw JSON arguments.
    ///
    /// The body runs inside the activity reporter's bracket, so the client
    /// sees start/end signals for every execution including failed ones.
    /// Argument parsing happens before the bracket — a call that never parsed
    /// never started.
    ///
    /// # Errors
    ///
    /// Returns the tool's own [`ToolError`], or [`ToolError::UnknownTool`] /
    /// [`ToolError::InvalidArguments`] for calls that never reach a backend.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        match name {
            SEARCH_INGREDIENTS => {
                let args: QueryArgs = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.recipes.search_ingredients(&args.query))
                    .await
            }
            SEARCH_RECIPES_BY_INGREDIENTS => {
                let args: IngredientsArgs = parse_args(name, arguments)?;
                self.reporter
                    .instrument(
                        name,
                        self.recipes.search_recipes_by_ingredients(&args.ingredients),
                    )
                    .await
            }
            GET_SIMILAR_RECIPES => {
                let args: RecipeIdArgs = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.recipes.similar_recipes(&args.id))
                    .await
            }
            SUMMARIZE_RECIPE => {
                let args: RecipeIdArgs = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.recipes.summarize_recipe(&args.id))
                    .await
            }
            GET_RECIPE_INSTRUCTIONS => {
                let args: RecipeIdArgs = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.recipes.recipe_instructions(&args.id))
                    .await
            }
            UPDATE_USER_PREFERENCES => {
                let args: PreferencesUpdate = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.bridge.update_user_preferences(&args))
                    .await
            }
            UPDATE_COOKING_SESSION => {
                let args: CookingSessionUpdate = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.bridge.update_cooking_session(&args))
                    .await
            }
            ADD_TO_FAVORITES => {
                let args: FavoriteRecipe = parse_args(name, arguments)?;
                self.reporter
                    .instrument(name, self.bridge.add_to_favorites(&args))
                    .await
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// Parse a tool's JSON arguments, treating an empty string as `{}`
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T, ToolError> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_announces_every_tool() {
        let defs = definitions();
        assert_eq!(defs.len(), 8);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        for expected in [
            SEARCH_INGREDIENTS,
            SEARCH_RECIPES_BY_INGREDIENTS,
            GET_SIMILAR_RECIPES,
            SUMMARIZE_RECIPE,
            GET_RECIPE_INSTRUCTIONS,
            UPDATE_USER_PREFERENCES,
            UPDATE_COOKING_SESSION,
            ADD_TO_FAVORITES,
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn every_schema_is_an_object() {
        for def in definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
        }
    }

    #[test]
    fn empty_arguments_parse_as_empty_object() {
        let prefs: PreferencesUpdate = parse_args(UPDATE_USER_PREFERENCES, "").unwrap();
        assert_eq!(prefs, PreferencesUpdate::default());
    }

    #[test]
    fn malformed_arguments_are_invalid_not_unknown() {
        let err = parse_args::<QueryArgs>(SEARCH_INGREDIENTS, "{not json").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
