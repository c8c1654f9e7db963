use crate::api::{ApiError, build_client, join_segments, parse_base};
use crate::recipe::{MealsEnvelope, Recipe, RecipeId};
use log::debug;
use reqwest::{Client, Url};
use std::time::Duration;

/// Read-only client for the public recipe catalog (TheMealDB v1 API).
pub struct MealDbClient {
    client: Client,
    base: Url,
}

impl MealDbClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: parse_base(base_url)?,
        })
    }

    async fn meals(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Recipe>, ApiError> {
        let url = join_segments(&self.base, &[endpoint])?;
        debug!("GET {} {:?}", url, query);
        let bytes = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let env: MealsEnvelope = serde_json::from_slice(&bytes)?;
        Ok(env.into_recipes())
    }

    /// `search.php?s={query}`
    pub async fn search(&self, query: &str) -> Result<Vec<Recipe>, ApiError> {
        self.meals("search.php", &[("s", query)]).await
    }

    /// `random.php` returns a single meal, so it is called `count` times.
    pub async fn random(&self, count: usize) -> Result<Vec<Recipe>, ApiError> {
        let mut recipes = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(first) = self.meals("random.php", &[]).await?.into_iter().next() {
                recipes.push(first);
            }
        }
        Ok(recipes)
    }

    /// `lookup.php?i={id}`
    pub async fn lookup(&self, id: &RecipeId) -> Result<Option<Recipe>, ApiError> {
        Ok(self
            .meals("lookup.php", &[("i", id.as_str())])
            .await?
            .into_iter()
            .next())
    }
}
