use crate::api::{ApiError, RecipeApi, Reply};
use crate::recipe::{Category, Recipe, RecipeDraft, RecipeId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory backend that records every call as `METHOD /path`.
pub struct FakeApi {
    state: Mutex<FakeState>,
}

struct FakeState {
    random: Vec<Recipe>,
    by_category: HashMap<String, Vec<Recipe>>,
    category_delay: HashMap<String, Duration>,
    details: HashMap<RecipeId, Recipe>,
    detail_delay: HashMap<RecipeId, Duration>,
    categories: Vec<Category>,
    mine: Vec<Recipe>,
    reply: Reply,
    fail_reads: bool,
    fail_writes: bool,
    calls: Vec<String>,
    drafts: Vec<(String, RecipeDraft)>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            state: Mutex::new(FakeState {
                random: Vec::new(),
                by_category: HashMap::new(),
                category_delay: HashMap::new(),
                details: HashMap::new(),
                detail_delay: HashMap::new(),
                categories: Vec::new(),
                mine: Vec::new(),
                reply: Reply {
                    status: 200,
                    message: Some("OK".to_string()),
                    detail: None,
                },
                fail_reads: false,
                fail_writes: false,
                calls: Vec::new(),
                drafts: Vec::new(),
            }),
        }
    }
}

/// Minimal recipe for fixtures.
pub fn recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        name: name.to_string(),
        image_url: String::new(),
        category: String::new(),
        area: None,
        instructions: String::new(),
        ingredients: Vec::new(),
    }
}

fn broken() -> ApiError {
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    ApiError::Decode(err)
}

impl FakeApi {
    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_random(&self, recipes: Vec<Recipe>) {
        self.with(|s| s.random = recipes);
    }

    pub fn set_category(&self, name: &str, recipes: Vec<Recipe>) {
        self.with(|s| s.by_category.insert(name.to_string(), recipes));
    }

    pub fn delay_category(&self, name: &str, delay: Duration) {
        self.with(|s| s.category_delay.insert(name.to_string(), delay));
    }

    pub fn set_categories(&self, names: &[&str]) {
        self.with(|s| {
            s.categories = names
                .iter()
                .map(|n| Category {
                    name: n.to_string(),
                    description: None,
                })
                .collect()
        });
    }

    pub fn set_detail(&self, recipe: Recipe) {
        self.with(|s| s.details.insert(recipe.id.clone(), recipe));
    }

    pub fn delay_detail(&self, id: &str, delay: Duration) {
        self.with(|s| s.detail_delay.insert(RecipeId::new(id), delay));
    }

    pub fn set_mine(&self, recipes: Vec<Recipe>) {
        self.with(|s| s.mine = recipes);
    }

    pub fn set_reply(&self, status: u16, message: Option<&str>, detail: Option<&str>) {
        self.with(|s| {
            s.reply = Reply {
                status,
                message: message.map(str::to_string),
                detail: detail.map(str::to_string),
            }
        });
    }

    pub fn fail_reads(&self) {
        self.with(|s| s.fail_reads = true);
    }

    pub fn fail_writes(&self) {
        self.with(|s| s.fail_writes = true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with(|s| {
            s.calls.clear();
            s.drafts.clear();
        });
    }

    pub fn drafts(&self) -> Vec<(String, RecipeDraft)> {
        self.with(|s| s.drafts.clone())
    }

    fn read<T>(&self, call: String, f: impl FnOnce(&FakeState) -> T) -> Result<T, ApiError> {
        self.with(|s| {
            s.calls.push(call);
            if s.fail_reads { Err(broken()) } else { Ok(f(s)) }
        })
    }

    fn write(&self, call: String, draft: Option<&RecipeDraft>) -> Result<Reply, ApiError> {
        self.with(|s| {
            if let Some(draft) = draft {
                s.drafts.push((call.clone(), draft.clone()));
            }
            s.calls.push(call);
            if s.fail_writes {
                Err(broken())
            } else {
                Ok(s.reply.clone())
            }
        })
    }
}

#[async_trait]
impl RecipeApi for FakeApi {
    async fn random_recipes(&self, count: usize) -> Result<Vec<Recipe>, ApiError> {
        self.read(format!("GET /recipes/random/{}", count), |s| s.random.clone())
    }

    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError> {
        let delay = self.with(|s| s.category_delay.get(category).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read(format!("GET /recipes/category/{}", category), |s| {
            s.by_category.get(category).cloned().unwrap_or_default()
        })
    }

    async fn recipe_details(&self, id: &RecipeId) -> Result<Option<Recipe>, ApiError> {
        let delay = self.with(|s| s.detail_delay.get(id).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read(format!("GET /recipe/{}", id), |s| s.details.get(id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.read("GET /categories".to_string(), |s| s.categories.clone())
    }

    async fn my_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        self.read("GET /my-recipes".to_string(), |s| s.mine.clone())
    }

    async fn save_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError> {
        self.write(format!("POST /my-recipes/{}", id), None)
    }

    async fn delete_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError> {
        self.write(format!("DELETE /my-recipes/{}", id), None)
    }

    async fn add_recipe(&self, draft: &RecipeDraft) -> Result<Reply, ApiError> {
        self.write("POST /add-recipe".to_string(), Some(draft))
    }

    async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Reply, ApiError> {
        self.write(format!("PUT /user-recipe/{}", id), Some(draft))
    }
}
