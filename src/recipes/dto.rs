use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub query: String,
}

/// A recommended recipe. Only the common fields are typed; anything else
/// the recommender sends is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub ingredientes: Option<Value>,
    #[serde(default)]
    pub instrucciones: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeList {
    #[serde(default)]
    pub recetas: Vec<Recipe>,
}
