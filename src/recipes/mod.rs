//! Remote tool gateway — read-only lookups against the recipe data provider.
//!
//! Stateless request/response: each operation takes a few string parameters,
//! issues one time-boxed GET, and hands the raw response body back for the
//! language model to interpret. No parsing happens here on purpose — the
//! provider's JSON is the contract between the model and the data, and the
//! gateway must never reshape (or fabricate) recipe content.

use std::time::Duration;

use reqwest::Client;

use crate::config::RecipeApiConfig;
use crate::{Error, Result, ToolError};

/// Recipe-by-ingredients results are capped at this many candidates
const MAX_RECIPE_RESULTS: u8 = 10;

/// Similar-recipe lookups return at most this many recipes
const MAX_SIMILAR_RESULTS: u8 = 3;

/// Provider ranking policy: maximize used ingredients, minimize missing ones
const INGREDIENT_RANKING: &str = "1";

/// Client for the recipe data provider
#[derive(Clone)]
pub struct RecipeClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl RecipeClient {
    /// Create a client with the provider settings from config
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RecipeApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("sous-gateway/0.1")
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout.as_secs().max(1),
        })
    }

    /// Search simple whole foods by partial or full name
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn search_ingredients(&self, query: &str) -> std::result::Result<String, ToolError> {
        self.get("/food/ingredients/search", &[("query", query)])
            .await
    }

    /// Find recipes using as many of the given ingredients as possible while
    /// requiring as few additional ones as possible.
    ///
    /// `ingredients` is a comma-separated list.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn search_recipes_by_ingredients(
        &self,
        ingredients: &str,
    ) -> std::result::Result<String, ToolError> {
        let number = MAX_RECIPE_RESULTS.to_string();
        self.get(
            "/recipes/findByIngredients",
            &[
                ("ignorePantry", "true"),
                ("ranking", INGREDIENT_RANKING),
                ("number", number.as_str()),
                ("ingredients", ingredients),
            ],
        )
        .await
    }

    /// Find recipes similar to the given one
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn similar_recipes(&self, id: &str) -> std::result::Result<String, ToolError> {
        let number = MAX_SIMILAR_RESULTS.to_string();
        let path = format!("/recipes/{}/similar", encode_id(id));
        self.get(&path, &[("number", number.as_str())]).await
    }

    /// Generate a short natural-language summary of a recipe
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn summarize_recipe(&self, id: &str) -> std::result::Result<String, ToolError> {
        let path = format!("/recipes/{}/summary", encode_id(id));
        self.get(&path, &[]).await
    }

    /// Get an analyzed step-by-step breakdown of a recipe's instructions,
    /// each step annotated with required ingredients and equipment.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn recipe_instructions(&self, id: &str) -> std::result::Result<String, ToolError> {
        let path = format!("/recipes/{}/analyzedInstructions", encode_id(id));
        self.get(&path, &[]).await
    }

    /// Issue one GET against the provider and return the raw body.
    ///
    /// The API key is always appended as a query parameter alongside the
    /// operation's own pairs.
    ///
    /// # Errors
    ///
    /// - status ≥400 → [`ToolError::Upstream`] with status and body verbatim
    /// - request time box exceeded → [`ToolError::Timeout`]
    /// - any other transport failure → [`ToolError::Transport`]
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<String, ToolError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        if status >= 400 {
            return Err(ToolError::Upstream { status, body });
        }

        Ok(body)
    }

    /// Translate a transport failure into the uniform tool error kind
    fn classify(&self, e: &reqwest::Error) -> ToolError {
        if e.is_timeout() {
            ToolError::Timeout(self.timeout_secs)
        } else {
            ToolError::Transport(e.to_string())
        }
    }
}

impl std::fmt::Debug for RecipeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Percent-encode an identifier before insertion into a request path
fn encode_id(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
