use crate::api::{ApiError, RecipeApi, Reply};
use crate::form::RecipeForm;
use crate::recipe::{Category, Recipe, RecipeId};
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Token of the synthetic "All" category button.
pub const ALL_CATEGORIES: &str = "all";

pub const MSG_LOADING_CATEGORY: &str = "Loading recipes...";
pub const MSG_LOADING_RANDOM: &str = "Looking for inspiration...";
pub const MSG_LOADING_MINE: &str = "Loading your saved recipes...";
pub const MSG_EMPTY: &str = "No recipes found for this view.";
pub const MSG_LOAD_FAILED: &str = "Could not load recipes. Press r to retry.";

pub const ALERT_ALREADY_MINE: &str = "Recipes you created are already in your list.";
pub const ALERT_SAVE_FAILED: &str = "Could not save the recipe.";
pub const ALERT_DELETE_FAILED: &str = "Could not delete the recipe.";
pub const ALERT_ADD_FAILED: &str = "Could not add the recipe.";
pub const ALERT_UPDATE_FAILED: &str = "Could not update the recipe.";

/// Which section is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Explore,
    MyRecipes,
    AddRecipe,
}

impl View {
    pub const ALL: [View; 3] = [Self::Explore, Self::MyRecipes, Self::AddRecipe];

    pub fn next(self) -> Self {
        match self {
            Self::Explore => Self::MyRecipes,
            Self::MyRecipes => Self::AddRecipe,
            Self::AddRecipe => Self::Explore,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Explore => Self::AddRecipe,
            Self::MyRecipes => Self::Explore,
            Self::AddRecipe => Self::MyRecipes,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Explore => "Explore",
            Self::MyRecipes => "My Recipes",
            Self::AddRecipe => "Add Recipe",
        }
    }

    /// Section id used in logs.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Explore => "explorar",
            Self::MyRecipes => "mis-recetas",
            Self::AddRecipe => "agregar-receta",
        }
    }
}

/// Input mode for text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
}

/// Action buttons shown in the detail modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetailActions {
    pub favorite: bool,
    pub edit: bool,
    pub delete: bool,
}

impl DetailActions {
    /// In "my recipes", own recipes can be edited and deleted and saved ones
    /// only deleted; everywhere else the only action is saving.
    pub fn for_view(view: View, id: &RecipeId) -> Self {
        match view {
            View::MyRecipes => Self {
                favorite: false,
                edit: id.is_local(),
                delete: true,
            },
            _ => Self {
                favorite: true,
                edit: false,
                delete: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailModal {
    pub recipe: Recipe,
    pub actions: DetailActions,
    pub scroll: u16,
}

#[derive(Debug, Clone)]
pub struct EditModal {
    /// Backend id, without the `local-` prefix.
    pub id: String,
    pub form: RecipeForm,
}

#[derive(Debug, Clone)]
pub enum Modal {
    Detail(DetailModal),
    Edit(EditModal),
}

/// One rendered recipe tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card<'a> {
    pub id: &'a RecipeId,
    pub title: &'a str,
    pub category: &'a str,
    pub image_url: &'a str,
}

/// What the recipe grid shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grid<'a> {
    Placeholder(&'a str),
    Cards(Vec<Card<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryButton<'a> {
    pub label: &'a str,
    pub token: &'a str,
    pub active: bool,
}

/// User actions, decoupled from the keys that trigger them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SwitchView(View),
    SelectCategory(String),
    Search(String),
    OpenDetail(RecipeId),
    CloseModal,
    Favorite(RecipeId),
    Edit(RecipeId),
    Delete(RecipeId),
    ConfirmDelete,
    CancelDelete,
    SubmitAdd,
    SubmitEdit,
    DismissAlert,
}

/// Which fetch produced a recipe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Random,
    Category(String),
    Mine,
}

/// Result of a background request, applied on the UI loop.
#[derive(Debug)]
pub enum Outcome {
    Recipes {
        generation: u64,
        source: ListSource,
        result: Result<Vec<Recipe>, ApiError>,
    },
    Categories(Result<Vec<Category>, ApiError>),
    Detail {
        generation: u64,
        result: Result<Option<Recipe>, ApiError>,
    },
    Saved(Result<Reply, ApiError>),
    Deleted(Result<Reply, ApiError>),
    Added(Result<Reply, ApiError>),
    Updated(Result<Reply, ApiError>),
}

/// Recipe view controller state.
pub struct App {
    api: Arc<dyn RecipeApi>,
    pub random_count: usize,
    pub should_quit: bool,
    pub show_help: bool,

    pub view: View,
    pub input_mode: InputMode,

    // Last applied list fetch
    pub all_recipes: Vec<Recipe>,
    pub categories: Vec<Category>,
    pub active_category: String,

    // Search over the cached list
    pub query: String,
    pub visible: Vec<usize>,
    pub selected: usize,
    pub loading: Option<&'static str>,

    pub modal: Option<Modal>,
    pub pending_delete: Option<RecipeId>,
    pub alert: Option<String>,
    pub add_form: RecipeForm,

    pub status_msg: String,

    list_generation: u64,
    detail_generation: u64,
    in_flight: usize,
    tx: UnboundedSender<Outcome>,
    rx: UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(api: Arc<dyn RecipeApi>, random_count: usize) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            random_count,
            should_quit: false,
            show_help: false,

            view: View::Explore,
            input_mode: InputMode::Normal,

            all_recipes: Vec::new(),
            categories: Vec::new(),
            active_category: ALL_CATEGORIES.to_string(),

            query: String::new(),
            visible: Vec::new(),
            selected: 0,
            loading: None,

            modal: None,
            pending_delete: None,
            alert: None,
            add_form: RecipeForm::default(),

            status_msg: String::new(),

            list_generation: 0,
            detail_generation: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Initial load: categories and a random selection.
    pub fn init(&mut self) {
        self.fetch_categories();
        self.fetch_random_recipes();
    }

    /// Single entry point for user actions.
    pub fn dispatch(&mut self, command: Command) {
        debug!("dispatch {:?} in {}", command, self.view.slug());
        match command {
            Command::SwitchView(view) => self.switch_view(view),
            Command::SelectCategory(token) => self.select_category(token),
            Command::Search(query) => self.set_query(query),
            Command::OpenDetail(id) => self.fetch_recipe_details(id),
            Command::CloseModal => self.close_modal(),
            Command::Favorite(id) => self.save_recipe_to_favorites(id),
            Command::Edit(id) => {
                let recipe = self
                    .detail()
                    .map(|d| &d.recipe)
                    .filter(|r| r.id == id)
                    .or_else(|| self.cached(&id))
                    .cloned();
                if let Some(recipe) = recipe {
                    self.open_edit_modal(&recipe);
                }
            }
            Command::Delete(id) => self.pending_delete = Some(id),
            Command::ConfirmDelete => {
                if let Some(id) = self.pending_delete.take() {
                    self.delete_recipe_from_favorites(id);
                }
            }
            Command::CancelDelete => self.pending_delete = None,
            Command::SubmitAdd => {
                let draft = self.add_form.to_draft();
                let api = Arc::clone(&self.api);
                self.spawn(async move { Outcome::Added(api.add_recipe(&draft).await) });
            }
            Command::SubmitEdit => {
                if let Some(Modal::Edit(edit)) = &self.modal {
                    let id = edit.id.clone();
                    let draft = edit.form.to_draft();
                    let api = Arc::clone(&self.api);
                    self.spawn(async move { Outcome::Updated(api.update_recipe(&id, &draft).await) });
                }
            }
            Command::DismissAlert => self.alert = None,
        }
    }

    // ── View switching ──

    fn switch_view(&mut self, view: View) {
        info!("switching to {}", view.slug());
        // A detail lookup still in flight belongs to the view being left
        self.detail_generation += 1;
        self.view = view;
        self.input_mode = InputMode::Normal;
        match view {
            View::Explore => {
                self.active_category = ALL_CATEGORIES.to_string();
                self.fetch_random_recipes();
            }
            View::MyRecipes => self.fetch_my_recipes(),
            View::AddRecipe => {}
        }
    }

    /// Re-run the current view's fetch.
    pub fn refresh(&mut self) {
        match self.view {
            View::Explore if self.active_category != ALL_CATEGORIES => {
                let category = self.active_category.clone();
                self.fetch_recipes_by_category(category);
            }
            View::Explore => self.fetch_random_recipes(),
            View::MyRecipes => self.fetch_my_recipes(),
            View::AddRecipe => {}
        }
    }

    /// The category bar is only part of the explore view.
    pub fn show_category_bar(&self) -> bool {
        self.view == View::Explore
    }

    fn select_category(&mut self, token: String) {
        if token == ALL_CATEGORIES {
            self.active_category = token;
            self.fetch_random_recipes();
        } else {
            self.active_category = token.clone();
            self.fetch_recipes_by_category(token);
        }
    }

    // ── Fetch operations ──

    fn begin_list_fetch(&mut self, placeholder: &'static str) -> u64 {
        self.list_generation += 1;
        self.loading = Some(placeholder);
        self.query.clear();
        self.apply_search();
        self.list_generation
    }

    pub fn fetch_recipes_by_category(&mut self, category: String) {
        let generation = self.begin_list_fetch(MSG_LOADING_CATEGORY);
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.recipes_by_category(&category).await;
            Outcome::Recipes {
                generation,
                source: ListSource::Category(category),
                result,
            }
        });
    }

    pub fn fetch_random_recipes(&mut self) {
        let generation = self.begin_list_fetch(MSG_LOADING_RANDOM);
        let api = Arc::clone(&self.api);
        let count = self.random_count;
        self.spawn(async move {
            Outcome::Recipes {
                generation,
                source: ListSource::Random,
                result: api.random_recipes(count).await,
            }
        });
    }

    pub fn fetch_my_recipes(&mut self) {
        let generation = self.begin_list_fetch(MSG_LOADING_MINE);
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Outcome::Recipes {
                generation,
                source: ListSource::Mine,
                result: api.my_recipes().await,
            }
        });
    }

    pub fn fetch_categories(&mut self) {
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::Categories(api.categories().await) });
    }

    /// Own recipes come from the cache; everything else is looked up.
    pub fn fetch_recipe_details(&mut self, id: RecipeId) {
        self.detail_generation += 1;
        if id.is_local() {
            if let Some(recipe) = self.cached(&id).cloned() {
                self.show_detail_modal(recipe);
            }
            return;
        }
        let generation = self.detail_generation;
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Outcome::Detail {
                generation,
                result: api.recipe_details(&id).await,
            }
        });
    }

    // ── Mutating operations ──

    pub fn save_recipe_to_favorites(&mut self, id: RecipeId) {
        if id.is_local() {
            self.alert = Some(ALERT_ALREADY_MINE.to_string());
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::Saved(api.save_favorite(&id).await) });
    }

    pub fn delete_recipe_from_favorites(&mut self, id: RecipeId) {
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::Deleted(api.delete_favorite(&id).await) });
    }

    // ── Modals ──

    pub fn show_detail_modal(&mut self, recipe: Recipe) {
        let actions = DetailActions::for_view(self.view, &recipe.id);
        self.modal = Some(Modal::Detail(DetailModal {
            recipe,
            actions,
            scroll: 0,
        }));
    }

    pub fn open_edit_modal(&mut self, recipe: &Recipe) {
        self.modal = Some(Modal::Edit(EditModal {
            id: recipe.id.bare().to_string(),
            form: RecipeForm::from_recipe(recipe),
        }));
        self.input_mode = InputMode::Form;
    }

    pub fn close_modal(&mut self) {
        self.detail_generation += 1;
        if matches!(self.modal, Some(Modal::Edit(_))) {
            self.input_mode = InputMode::Normal;
        }
        self.modal = None;
    }

    pub fn detail(&self) -> Option<&DetailModal> {
        match &self.modal {
            Some(Modal::Detail(d)) => Some(d),
            _ => None,
        }
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailModal> {
        match &mut self.modal {
            Some(Modal::Detail(d)) => Some(d),
            _ => None,
        }
    }

    /// Form receiving keystrokes in form mode.
    pub fn active_form_mut(&mut self) -> &mut RecipeForm {
        match &mut self.modal {
            Some(Modal::Edit(edit)) => &mut edit.form,
            _ => &mut self.add_form,
        }
    }

    pub fn editing(&self) -> bool {
        matches!(self.modal, Some(Modal::Edit(_)))
    }

    // ── Search and selection ──

    fn set_query(&mut self, query: String) {
        self.query = query;
        self.apply_search();
    }

    /// Case-insensitive substring match on the name, over the cached list.
    pub fn apply_search(&mut self) {
        let needle = self.query.to_lowercase();
        self.visible = self
            .all_recipes
            .iter()
            .enumerate()
            .filter(|(_, r)| needle.is_empty() || r.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    pub fn visible_recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.visible.iter().filter_map(|&i| self.all_recipes.get(i))
    }

    /// Nothing is selectable while the grid shows a placeholder.
    pub fn selected_recipe(&self) -> Option<&Recipe> {
        if self.loading.is_some() {
            return None;
        }
        self.visible
            .get(self.selected)
            .and_then(|&i| self.all_recipes.get(i))
    }

    pub fn select_next(&mut self) {
        if self.loading.is_none() && self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.loading.is_none() {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    fn cached(&self, id: &RecipeId) -> Option<&Recipe> {
        self.all_recipes.iter().find(|r| &r.id == id)
    }

    // ── Render projections ──

    pub fn grid(&self) -> Grid<'_> {
        if let Some(msg) = self.loading {
            return Grid::Placeholder(msg);
        }
        if self.visible.is_empty() {
            return Grid::Placeholder(MSG_EMPTY);
        }
        Grid::Cards(
            self.visible_recipes()
                .map(|r| Card {
                    id: &r.id,
                    title: &r.name,
                    category: &r.category,
                    image_url: &r.image_url,
                })
                .collect(),
        )
    }

    pub fn category_buttons(&self) -> Vec<CategoryButton<'_>> {
        let mut buttons = vec![CategoryButton {
            label: "All",
            token: ALL_CATEGORIES,
            active: self.active_category == ALL_CATEGORIES,
        }];
        buttons.extend(self.categories.iter().map(|c| CategoryButton {
            label: &c.name,
            token: &c.name,
            active: self.active_category == c.name,
        }));
        buttons
    }

    // ── Background requests ──

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The receiver lives as long as the app.
            let _ = tx.send(fut.await);
        });
    }

    /// Requests started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn drain(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(outcome);
        }
    }

    /// Wait until no request is outstanding, including follow-up fetches.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(outcome) => {
                    self.in_flight -= 1;
                    self.apply(outcome);
                }
                None => break,
            }
        }
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Recipes {
                generation,
                source,
                result,
            } => self.apply_recipes(generation, source, result),
            Outcome::Categories(Ok(categories)) => {
                info!("{} categories loaded", categories.len());
                self.categories = categories;
            }
            Outcome::Categories(Err(e)) => {
                error!("Error fetching categories: {}", e);
                self.status_msg = e.user_message();
            }
            Outcome::Detail { generation, result } => {
                if generation != self.detail_generation {
                    debug!("dropping stale detail response {}", generation);
                    return;
                }
                match result {
                    Ok(Some(recipe)) => self.show_detail_modal(recipe),
                    Ok(None) => self.status_msg = "Recipe not found".to_string(),
                    Err(e) => {
                        error!("Error fetching recipe details: {}", e);
                        self.status_msg = e.user_message();
                    }
                }
            }
            Outcome::Saved(result) => {
                if let Some(reply) = self.reply_or_alert(result, ALERT_SAVE_FAILED, "saving recipe") {
                    self.alert = Some(reply.text().to_string());
                }
            }
            Outcome::Deleted(result) => {
                if let Some(reply) = self.reply_or_alert(result, ALERT_DELETE_FAILED, "deleting recipe") {
                    self.alert = Some(reply.text().to_string());
                    if reply.is_ok() {
                        self.modal = None;
                        self.fetch_my_recipes();
                    }
                }
            }
            Outcome::Added(result) => {
                if let Some(reply) = self.reply_or_alert(result, ALERT_ADD_FAILED, "adding recipe") {
                    self.alert = Some(reply.text().to_string());
                    // Cleared on any reply, failed ones included.
                    self.add_form.reset();
                }
            }
            Outcome::Updated(result) => {
                if let Some(reply) = self.reply_or_alert(result, ALERT_UPDATE_FAILED, "updating recipe") {
                    self.alert = Some(reply.text().to_string());
                    if reply.is_ok() {
                        self.close_modal();
                        self.fetch_my_recipes();
                    }
                }
            }
        }
    }

    fn apply_recipes(
        &mut self,
        generation: u64,
        source: ListSource,
        result: Result<Vec<Recipe>, ApiError>,
    ) {
        if generation != self.list_generation {
            debug!("dropping stale {:?} response {}", source, generation);
            return;
        }
        match result {
            Ok(mut recipes) => {
                if let ListSource::Category(name) = &source {
                    for recipe in recipes.iter_mut().filter(|r| r.category.is_empty()) {
                        recipe.category = name.clone();
                    }
                }
                info!("{} recipes loaded from {:?}", recipes.len(), source);
                self.status_msg = format!("{} recipes", recipes.len());
                self.all_recipes = recipes;
                self.loading = None;
                self.selected = 0;
                self.apply_search();
            }
            Err(e) => {
                error!("Error fetching {:?} recipes: {}", source, e);
                self.loading = Some(MSG_LOAD_FAILED);
                self.status_msg = e.user_message();
            }
        }
    }

    fn reply_or_alert(
        &mut self,
        result: Result<Reply, ApiError>,
        fallback: &str,
        what: &str,
    ) -> Option<Reply> {
        match result {
            Ok(reply) => {
                if !reply.is_ok() {
                    warn!("backend refused {}: {} {}", what, reply.status, reply.text());
                }
                Some(reply)
            }
            Err(e) => {
                error!("Error {}: {}", what, e);
                self.alert = Some(fallback.to_string());
                None
            }
        }
    }
}
