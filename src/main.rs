mod api;
mod app;
mod catalog;
mod config;
#[cfg(test)]
mod fake_api;
mod form;
mod keys;
mod recipe;
mod ui;

use api::HttpBackend;
use app::App;
use catalog::MealDbClient;
use clap::{Parser, Subcommand};
use config::Settings;
use crossterm::event::{self, Event, KeyEventKind};
use log::{LevelFilter, error, info};
use recipe::{Recipe, RecipeId};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Terminal client for browsing, saving and writing recipes
#[derive(Parser)]
#[command(name = "click-and-cook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the recipe backend
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Append logs to this file
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive client (default)
    Run {
        /// Recipes shown by the explore view
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Search the public catalog by name
    Search { query: String },
    /// Print random recipes from the public catalog
    Random {
        #[arg(default_value_t = 3)]
        count: usize,
    },
    /// Print one catalog recipe in full
    Show { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| e.user_message())?;
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }
    if let Some(path) = cli.log_file {
        settings.log_file = Some(path);
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    init_logger(&settings.log_path(), settings.level_filter())?;
    let timeout = Duration::from_secs(settings.request_timeout_secs);

    match cli.command.unwrap_or(Commands::Run { count: None }) {
        Commands::Run { count } => {
            if let Some(count) = count {
                settings.random_count = count;
            }
            info!("starting against {}", settings.backend_url);
            let backend = HttpBackend::new(&settings.backend_url, timeout)
                .map_err(|e| e.user_message())?;

            let mut app = App::new(Arc::new(backend), settings.random_count);
            app.init();

            // Init terminal
            let mut terminal = ratatui::init();

            // Main loop
            let result = run_app(&mut terminal, &mut app);

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                error!("UI loop failed: {}", e);
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Search { query } => {
            let catalog = MealDbClient::new(&settings.catalog_url, timeout)
                .map_err(|e| e.user_message())?;
            let recipes = catalog.search(&query).await.map_err(|e| e.user_message())?;
            if recipes.is_empty() {
                println!("No recipes found for \"{}\"", query);
            }
            for recipe in &recipes {
                print_summary(recipe);
            }
        }
        Commands::Random { count } => {
            let catalog = MealDbClient::new(&settings.catalog_url, timeout)
                .map_err(|e| e.user_message())?;
            for recipe in &catalog.random(count).await.map_err(|e| e.user_message())? {
                print_summary(recipe);
            }
        }
        Commands::Show { id } => {
            let catalog = MealDbClient::new(&settings.catalog_url, timeout)
                .map_err(|e| e.user_message())?;
            match catalog
                .lookup(&RecipeId::new(id.as_str()))
                .await
                .map_err(|e| e.user_message())?
            {
                Some(recipe) => print_full(&recipe),
                None => {
                    eprintln!("No recipe with id {}", id);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_logger(path: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    WriteLogger::init(
        level,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        OpenOptions::new().create(true).append(true).open(path)?,
    )?;
    Ok(())
}

fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain();
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Short poll so finished requests show up promptly
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                keys::handle_key(app, key);
            }
        }
    }
}

fn print_summary(recipe: &Recipe) {
    let category = if recipe.category.is_empty() {
        "-"
    } else {
        recipe.category.as_str()
    };
    println!(
        "{:>8}  {:<40}  {}",
        recipe.id.as_str(),
        ui::truncate_str(&recipe.name, 40),
        category
    );
}

fn print_full(recipe: &Recipe) {
    println!("{} ({})", recipe.name, recipe.id);
    if !recipe.category.is_empty() {
        println!("Category: {}", recipe.category);
    }
    if let Some(area) = &recipe.area {
        println!("Area: {}", area);
    }
    if !recipe.image_url.is_empty() {
        println!("Image: {}", recipe.image_url);
    }
    println!();
    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient);
    }
    println!();
    println!("{}", recipe.instructions);
}
