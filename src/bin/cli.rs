//! bookshelf CLI
//!
//! Browse, search and page through book catalogs from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use bookshelf::{
    error::{AppError, Result},
    models::{Category, Config},
    services::{Browser, BrowserOptions, CacheStats, PageCache, Selection, Sources, ViewState},
    storage::{
        CategoryDefinition, CategoryStore, LocalStorage, default_categories, find_category,
        remove_category, upsert_category,
    },
    utils::truncate_graphemes,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

const DESCRIPTION_WIDTH: usize = 90;

/// bookshelf - Book Catalog Browser
#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Paginated, cached book catalog browser")]
struct Cli {
    /// Path to storage directory containing config files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the featured listing or a category
    Browse {
        /// Category to browse (default: featured listing)
        #[arg(short, long)]
        category: Option<Category>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },

    /// Full-text search
    Search {
        query: String,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },

    /// Read commands from stdin: category, search, more, show, stats, quit
    Interactive,

    /// Manage the categories offered for browsing
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },

    /// Write a default config.toml into the storage directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration files
    Validate,
}

#[derive(Subcommand, Debug)]
enum CategoriesAction {
    /// List categories in display order
    List,
    /// Add a category or change its label
    Add {
        category: Category,
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove a category
    Remove { category: Category },
    /// Restore the default list
    Reset,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    init_logging(cli.verbose, &config.logging.level);

    log::debug!("Loaded configuration from {}", cli.storage_dir.display());
    let storage = LocalStorage::new(&cli.storage_dir);

    match cli.command {
        Command::Browse { category, pages } => {
            let browser = build_browser(&config)?;
            match category {
                Some(category) => browser.select_category(Some(category)).await,
                None => browser.load_initial().await,
            }
            load_pages(&browser, pages).await;
            print_view(&browser.view());
            log_stats(&browser.cache().stats());
        }

        Command::Search { query, pages } => {
            let browser = build_browser(&config)?;
            browser.search(&query).await;
            load_pages(&browser, pages).await;
            print_view(&browser.view());
            log_stats(&browser.cache().stats());
        }

        Command::Interactive => {
            let browser = Arc::new(build_browser(&config)?);
            run_interactive(browser, &config, &storage).await?;
        }

        Command::Categories { action } => {
            run_categories(&storage, action).await?;
        }

        Command::Init { force } => {
            if config_path.exists() && !force {
                return Err(AppError::config(format!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                )));
            }
            Config::default().save(&config_path)?;
            log::info!("Wrote default configuration to {}", config_path.display());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let categories = storage.load_categories().await?;
            if categories.is_empty() {
                return Err(AppError::validation("No categories defined"));
            }
            log::info!("✓ {} categories", categories.len());

            log::info!("All validations passed!");
        }
    }

    Ok(())
}

fn build_browser(config: &Config) -> Result<Browser> {
    config.validate()?;
    let sources = Sources::from_config(config)?;
    let cache = Arc::new(PageCache::new(config.cache.clone()));
    Ok(Browser::new(sources, cache, BrowserOptions::from_config(config)))
}

/// Keep loading until `pages` pages are shown or the listing runs out.
async fn load_pages(browser: &Browser, pages: u32) {
    for _ in 1..pages {
        if !browser.view().has_more {
            break;
        }
        browser.load_more().await;
    }
}

async fn run_interactive(browser: Arc<Browser>, config: &Config, storage: &LocalStorage) -> Result<()> {
    let categories = storage.load_categories().await?;
    println!(
        "Categories: {}",
        categories
            .iter()
            .map(|d| format!("{} ({})", d.label, d.category))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Commands: category <name|all>, search <text>, more, show, stats, quit");

    let gate = browser.debounced(config.browser.debounce());
    let mut updates = browser.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            if !view.loading {
                print_view(&view);
            }
        }
    });

    browser.load_initial().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => {}
            "category" | "c" => match parse_category_arg(arg, &categories) {
                Ok(category) => gate.call(Selection::Category(category)),
                Err(e) => log::warn!("{}", e),
            },
            "search" | "s" => gate.call(Selection::Search(arg.to_string())),
            "more" | "m" => {
                let browser = Arc::clone(&browser);
                tokio::spawn(async move { browser.load_more().await });
            }
            "show" => print_view(&browser.view()),
            "stats" => print_stats(&browser.cache().stats()),
            "quit" | "exit" | "q" => break,
            other => log::warn!("Unknown command '{}'", other),
        }
    }

    gate.cancel();
    printer.abort();
    Ok(())
}

/// Resolve `category <name|all>` against the offered categories.
fn parse_category_arg(arg: &str, offered: &[CategoryDefinition]) -> Result<Option<Category>> {
    let arg = arg.trim();
    if arg.is_empty() || arg.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    find_category(offered, arg)
        .map(|d| Some(d.category))
        .ok_or_else(|| AppError::validation(format!("Category '{}' is not offered", arg)))
}

async fn run_categories(storage: &LocalStorage, action: CategoriesAction) -> Result<()> {
    let mut categories = storage.load_categories().await?;
    match action {
        CategoriesAction::List => {
            for (n, definition) in categories.iter().enumerate() {
                println!("{:>2}. {:<12} {}", n + 1, definition.category, definition.label);
            }
            return Ok(());
        }
        CategoriesAction::Add { category, label } => {
            let definition = match label {
                Some(label) => CategoryDefinition::new(category, label),
                None => CategoryDefinition::from(category),
            };
            upsert_category(&mut categories, definition);
        }
        CategoriesAction::Remove { category } => {
            if !remove_category(&mut categories, category) {
                log::warn!("Category '{}' is not in the list", category);
                return Ok(());
            }
        }
        CategoriesAction::Reset => categories = default_categories(),
    }
    storage.save_categories(&categories).await
}

fn print_view(view: &ViewState) {
    let heading = view
        .selection
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "nothing selected".to_string());

    if view.items.is_empty() {
        println!("[{}] No results. Try a different search or category.", heading);
        return;
    }

    println!("[{}] {} items", heading, view.items.len());
    for (n, item) in view.items.iter().enumerate() {
        println!("{:>4}. {} [{}]", n + 1, item.title, item.category);
        println!("      {}", truncate_graphemes(&item.description, DESCRIPTION_WIDTH));
        if !item.link.is_empty() {
            println!("      {}", item.link);
        }
    }
    if view.has_more {
        println!("      … more available");
    }
}

fn print_stats(stats: &CacheStats) {
    println!(
        "Cache: {} pages ({} fresh, {} expired, max {}), {} hits / {} misses",
        stats.total_entries,
        stats.valid_entries,
        stats.expired_entries,
        stats.max_entries,
        stats.hits,
        stats.misses
    );
}

fn log_stats(stats: &CacheStats) {
    log::debug!(
        "Cache: {} pages, {} hits / {} misses",
        stats.total_entries,
        stats.hits,
        stats.misses
    );
}
