use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix the backend puts on ids of recipes the user created.
pub const LOCAL_PREFIX: &str = "local-";

/// Number of numbered ingredient/measure slots in the catalog shape.
const INGREDIENT_SLOTS: usize = 20;

/// Identifier of a recipe, either a catalog id or a `local-` id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for recipes created by the user on the local backend.
    pub fn is_local(&self) -> bool {
        is_local_id(Some(&self.0))
    }

    /// Id without the `local-` prefix, as the backend stores it.
    pub fn bare(&self) -> &str {
        self.0.strip_prefix(LOCAL_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an optional raw id names a user-created recipe.
pub fn is_local_id(id: Option<&str>) -> bool {
    id.is_some_and(|id| id.starts_with(LOCAL_PREFIX))
}

/// Ids show up as strings from the catalog and sometimes as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for RecipeId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => RecipeId(s),
            RawId::Number(n) => RecipeId(n.to_string()),
        }
    }
}

/// Recipe as returned by the public catalog (and proxied by the backend).
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalMeal {
    #[serde(rename = "idMeal")]
    id_meal: RawId,
    #[serde(rename = "strMeal", default)]
    str_meal: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    str_meal_thumb: Option<String>,
    #[serde(rename = "strCategory", default)]
    str_category: Option<String>,
    #[serde(rename = "strArea", default)]
    str_area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    str_instructions: Option<String>,
    // Set by the backend when it maps its own recipes into this shape.
    #[serde(rename = "strIngredients", default)]
    str_ingredients: Option<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

/// Recipe as stored by the local backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalRecipe {
    id: RawId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    ingredients: Option<String>,
}

/// Either wire shape. Normalized into [`Recipe`] as soon as it is decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeShape {
    External(ExternalMeal),
    Local(LocalRecipe),
}

/// Canonical, render-ready recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub area: Option<String>,
    pub instructions: String,
    pub ingredients: Vec<String>,
}

impl Recipe {
    /// Ingredients joined back into the newline-delimited form the backend stores.
    pub fn ingredients_text(&self) -> String {
        self.ingredients.join("\n")
    }
}

impl From<RecipeShape> for Recipe {
    fn from(shape: RecipeShape) -> Self {
        match shape {
            RecipeShape::External(meal) => meal.into(),
            RecipeShape::Local(local) => local.into(),
        }
    }
}

impl From<ExternalMeal> for Recipe {
    fn from(meal: ExternalMeal) -> Self {
        let ingredients = match non_empty(meal.str_ingredients.as_deref()) {
            Some(text) => split_ingredients(text),
            None => numbered_ingredients(&meal.rest),
        };
        Recipe {
            id: meal.id_meal.into(),
            name: meal.str_meal.unwrap_or_default(),
            image_url: meal.str_meal_thumb.unwrap_or_default(),
            category: meal.str_category.unwrap_or_default(),
            area: meal.str_area.filter(|a| !a.trim().is_empty()),
            instructions: meal.str_instructions.unwrap_or_default(),
            ingredients,
        }
    }
}

impl From<LocalRecipe> for Recipe {
    fn from(local: LocalRecipe) -> Self {
        Recipe {
            id: local.id.into(),
            name: local.name.unwrap_or_default(),
            image_url: local.image_url.unwrap_or_default(),
            category: local.category.unwrap_or_default(),
            area: None,
            instructions: local.instructions.unwrap_or_default(),
            ingredients: local
                .ingredients
                .as_deref()
                .map(split_ingredients)
                .unwrap_or_default(),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Split a newline-delimited ingredient string into trimmed, non-empty lines.
pub fn split_ingredients(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn numbered_ingredients(rest: &BTreeMap<String, serde_json::Value>) -> Vec<String> {
    let text = |key: String| {
        rest.get(&key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("")
            .to_string()
    };

    (1..=INGREDIENT_SLOTS)
        .filter_map(|i| {
            let ingredient = text(format!("strIngredient{i}"));
            if ingredient.is_empty() {
                return None;
            }
            let measure = text(format!("strMeasure{i}"));
            Some(format!("{measure} {ingredient}").trim().to_string())
        })
        .collect()
}

/// `{ "meals": [...] | null }` envelope shared by every recipe endpoint.
#[derive(Debug, Deserialize)]
pub struct MealsEnvelope {
    #[serde(default)]
    meals: Option<Vec<RecipeShape>>,
}

impl MealsEnvelope {
    /// Normalized recipes; an absent or null list is empty.
    pub fn into_recipes(self) -> Vec<Recipe> {
        self.meals
            .unwrap_or_default()
            .into_iter()
            .map(Recipe::from)
            .collect()
    }
}

/// Recipe category used by the filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "strCategory")]
    pub name: String,
    #[serde(rename = "strCategoryDescription", default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesEnvelope {
    #[serde(default)]
    categories: Option<Vec<Category>>,
}

impl CategoriesEnvelope {
    pub fn into_categories(self) -> Vec<Category> {
        self.categories.unwrap_or_default()
    }
}

/// Body of `POST /add-recipe` and `PUT /user-recipe/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub instructions: String,
    pub ingredients: String,
}
