use crate::recipe::{
    CategoriesEnvelope, Category, MealsEnvelope, Recipe, RecipeDraft, RecipeId,
};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Text shown when a write reply carries neither `message` nor `detail`.
pub const MISSING_MESSAGE: &str = "The server did not return a message.";

/// Errors talking to either HTTP collaborator.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Short message suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidBaseUrl { url, .. } => format!("Bad backend address: {}", url),
            ApiError::Http(e) if e.is_timeout() => "The server took too long to answer".to_string(),
            ApiError::Http(e) if e.is_connect() => "Could not reach the server".to_string(),
            ApiError::Http(e) => match e.status() {
                Some(status) => format!("Server answered {}", status),
                None => format!("Network error: {}", e),
            },
            ApiError::Decode(_) => "The server sent something unexpected".to_string(),
        }
    }
}

/// Reply of a write endpoint. Non-2xx replies are still replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub message: Option<String>,
    pub detail: Option<String>,
}

impl Reply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `message`, else `detail`, else a fixed line.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.detail.as_deref())
            .unwrap_or(MISSING_MESSAGE)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReplyBody {
    #[serde(default)]
    message: Option<String>,
    // FastAPI puts validation errors in a list here; only strings are shown.
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Everything the view controller needs from the local backend.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn random_recipes(&self, count: usize) -> Result<Vec<Recipe>, ApiError>;
    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError>;
    async fn recipe_details(&self, id: &RecipeId) -> Result<Option<Recipe>, ApiError>;
    async fn categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn my_recipes(&self) -> Result<Vec<Recipe>, ApiError>;
    async fn save_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError>;
    async fn delete_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError>;
    async fn add_recipe(&self, draft: &RecipeDraft) -> Result<Reply, ApiError>;
    async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Reply, ApiError>;
}

/// Resolve `base` + path segments, percent-encoding each segment.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn parse_base(url: &str) -> Result<Url, ApiError> {
    Url::parse(url).map_err(|e| ApiError::InvalidBaseUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder()
        .user_agent(concat!("click-and-cook/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// reqwest client for the local backend.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: parse_base(base_url)?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let url = join_segments(&self.base, segments)?;
        debug!("GET {}", url);
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&RecipeDraft>,
    ) -> Result<Reply, ApiError> {
        let url = join_segments(&self.base, segments)?;
        info!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body: ReplyBody = serde_json::from_slice(&bytes)?;
        Ok(Reply {
            status,
            message: body.message,
            detail: body.detail.and_then(|d| d.as_str().map(str::to_string)),
        })
    }
}

#[async_trait]
impl RecipeApi for HttpBackend {
    async fn random_recipes(&self, count: usize) -> Result<Vec<Recipe>, ApiError> {
        let count = count.to_string();
        let env: MealsEnvelope = self.get_json(&["recipes", "random", &count]).await?;
        Ok(env.into_recipes())
    }

    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError> {
        let env: MealsEnvelope = self.get_json(&["recipes", "category", category]).await?;
        Ok(env.into_recipes())
    }

    async fn recipe_details(&self, id: &RecipeId) -> Result<Option<Recipe>, ApiError> {
        let env: MealsEnvelope = self.get_json(&["recipe", id.as_str()]).await?;
        Ok(env.into_recipes().into_iter().next())
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let env: CategoriesEnvelope = self.get_json(&["categories"]).await?;
        Ok(env.into_categories())
    }

    async fn my_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let env: MealsEnvelope = self.get_json(&["my-recipes"]).await?;
        Ok(env.into_recipes())
    }

    async fn save_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError> {
        self.write(Method::POST, &["my-recipes", id.as_str()], None).await
    }

    async fn delete_favorite(&self, id: &RecipeId) -> Result<Reply, ApiError> {
        self.write(Method::DELETE, &["my-recipes", id.as_str()], None).await
    }

    async fn add_recipe(&self, draft: &RecipeDraft) -> Result<Reply, ApiError> {
        self.write(Method::POST, &["add-recipe"], Some(draft)).await
    }

    async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Reply, ApiError> {
        self.write(Method::PUT, &["user-recipe", id], Some(draft)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{StatusCode, Uri},
        routing::{get, post, put},
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<String>>>;

    fn record(seen: &Seen, line: String) {
        seen.lock().unwrap().push(line);
    }

    async fn meals(State(seen): State<Seen>, uri: Uri) -> Json<Value> {
        record(&seen, format!("GET {}", uri.path()));
        Json(json!({ "meals": [
            { "idMeal": "52772", "strMeal": "Teriyaki Chicken", "strCategory": "Chicken" }
        ]}))
    }

    async fn no_meals(State(seen): State<Seen>, uri: Uri) -> Json<Value> {
        record(&seen, format!("GET {}", uri.path()));
        Json(json!({ "meals": null }))
    }

    async fn categories(State(seen): State<Seen>) -> Json<Value> {
        record(&seen, "GET /categories".to_string());
        Json(json!({ "categories": [{ "strCategory": "Beef" }, { "strCategory": "Dessert" }] }))
    }

    async fn save(State(seen): State<Seen>, Path(id): Path<String>) -> Json<Value> {
        record(&seen, format!("POST /my-recipes/{}", id));
        Json(json!({ "message": "Saved." }))
    }

    async fn remove(State(seen): State<Seen>, Path(id): Path<String>) -> Json<Value> {
        record(&seen, format!("DELETE /my-recipes/{}", id));
        Json(json!({ "message": "Removed." }))
    }

    async fn add(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
        record(&seen, format!("POST /add-recipe {}", body));
        Json(json!({ "message": "Added.", "recipe_id": "abc" }))
    }

    async fn update(
        State(seen): State<Seen>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        record(&seen, format!("PUT /user-recipe/{} {}", id, body["name"]));
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Recipe not found." })))
    }

    async fn serve() -> (HttpBackend, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route("/recipes/random/:count", get(meals))
            .route("/recipes/category/:name", get(meals))
            .route("/recipe/:id", get(no_meals))
            .route("/categories", get(categories))
            .route("/my-recipes", get(meals))
            .route("/my-recipes/:id", post(save).delete(remove))
            .route("/add-recipe", post(add))
            .route("/user-recipe/:id", put(update))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let backend =
            HttpBackend::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        (backend, seen)
    }

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "Pancakes".to_string(),
            category: "Breakfast".to_string(),
            image_url: String::new(),
            instructions: "Mix and fry.".to_string(),
            ingredients: "2 eggs\n1 cup flour".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_endpoints() {
        let (backend, seen) = serve().await;

        let random = backend.random_recipes(12).await.unwrap();
        assert_eq!(random.len(), 1);
        assert_eq!(random[0].name, "Teriyaki Chicken");

        backend.recipes_by_category("Side Dish").await.unwrap();
        backend.my_recipes().await.unwrap();
        let detail = backend.recipe_details(&RecipeId::new("1")).await.unwrap();
        assert!(detail.is_none());

        let cats = backend.categories().await.unwrap();
        assert_eq!(cats.len(), 2);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                "GET /recipes/random/12",
                "GET /recipes/category/Side%20Dish",
                "GET /my-recipes",
                "GET /recipe/1",
                "GET /categories",
            ]
        );
    }

    #[tokio::test]
    async fn test_write_endpoints() {
        let (backend, seen) = serve().await;

        let reply = backend.save_favorite(&RecipeId::new("52772")).await.unwrap();
        assert!(reply.is_ok());
        assert_eq!(reply.text(), "Saved.");

        let reply = backend
            .delete_favorite(&RecipeId::new("local-abc"))
            .await
            .unwrap();
        assert_eq!(reply.text(), "Removed.");

        let reply = backend.add_recipe(&draft()).await.unwrap();
        assert_eq!(reply.text(), "Added.");

        let reply = backend.update_recipe("abc", &draft()).await.unwrap();
        assert!(!reply.is_ok());
        assert_eq!(reply.status, 404);
        assert_eq!(reply.text(), "Recipe not found.");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen[0], "POST /my-recipes/52772");
        assert_eq!(seen[1], "DELETE /my-recipes/local-abc");
        let sent: Value =
            serde_json::from_str(seen[2].trim_start_matches("POST /add-recipe ")).unwrap();
        assert_eq!(sent["ingredients"], "2 eggs\n1 cup flour");
        assert_eq!(sent["name"], "Pancakes");
        assert_eq!(seen[3], "PUT /user-recipe/abc \"Pancakes\"");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = backend.categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }

    #[test]
    fn test_reply_text_fallbacks() {
        let reply = Reply { status: 200, message: Some("ok".into()), detail: Some("d".into()) };
        assert_eq!(reply.text(), "ok");
        let reply = Reply { status: 500, message: None, detail: Some("boom".into()) };
        assert_eq!(reply.text(), "boom");
        assert!(!reply.is_ok());
        let reply = Reply { status: 200, message: None, detail: None };
        assert_eq!(reply.text(), MISSING_MESSAGE);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpBackend::new("not a url", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
        assert!(err.user_message().contains("not a url"));
    }

    #[test]
    fn test_join_segments_keeps_base_path() {
        let base = parse_base("https://www.themealdb.com/api/json/v1/1/").unwrap();
        let url = join_segments(&base, &["lookup.php"]).unwrap();
        assert_eq!(url.as_str(), "https://www.themealdb.com/api/json/v1/1/lookup.php");
    }
}
