//! overload - daily workout recommender

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use overload::catalog::{Catalog, CatalogFetcher, HttpCatalog, HttpCatalogConfig, InMemoryCatalog};
use overload::profile::{Difficulty, Goal, Proficiency, Rating, parse_gym_access};
use overload::{Database, Engine};

#[derive(Parser)]
#[command(name = "overload")]
#[command(author, version, about = "Daily workout recommender with progressive overload")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "OVERLOAD_DB", default_value = "overload.db")]
    db: String,

    /// Exercise catalog endpoint
    #[arg(long, env = "CATALOG_URL", default_value = "https://api.api-ninjas.com/v1/exercises")]
    catalog_url: String,

    /// Catalog API key
    #[arg(long, env = "API_NINJA_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Timeout for a single catalog page request
    #[arg(long, env = "CATALOG_TIMEOUT_SECS", default_value = "10")]
    timeout_secs: u64,

    /// Read exercises from a local JSON file instead of the remote catalog
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    NewUser { user: String },

    /// Show today's workout (computed once per day)
    Recommend {
        user: String,

        /// Number of exercises
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Plan for another day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Rate how hard an exercise was: easy, medium or hard
    RateDifficulty {
        user: String,
        exercise: String,
        difficulty: String,
    },

    /// Like (1/good) or dislike (0/bad) an exercise
    Rate {
        user: String,
        exercise: String,
        rating: String,
    },

    /// Set training goal: strength or weight_loss
    SetGoal { user: String, goal: String },

    /// Set proficiency: beginner, intermediate, expert or unset
    SetProficiency { user: String, proficiency: String },

    /// Set gym access: true or false
    SetGymAccess { user: String, access: String },

    /// Print every stored plan
    History { user: String },

    /// Print running totals
    Stats { user: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db).with_context(|| format!("opening {}", cli.db))?;
    let timeout = Duration::from_secs(cli.timeout_secs);

    match &cli.catalog_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let catalog = InMemoryCatalog::from_json(&json)?;
            run(Engine::new(CatalogFetcher::new(catalog, timeout), db), cli.command).await
        }
        None => {
            let catalog = HttpCatalog::new(HttpCatalogConfig {
                base_url: cli.catalog_url.clone(),
                api_key: cli.api_key.clone(),
                timeout,
            })?;
            run(Engine::new(CatalogFetcher::new(catalog, timeout), db), cli.command).await
        }
    }
}

async fn run<C: Catalog>(engine: Engine<C, Database>, command: Commands) -> Result<()> {
    match command {
        Commands::NewUser { user } => {
            engine.create_user(&user).await?;
            println!("Created {}", user);
        }

        Commands::Recommend { user, count, date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let plan = engine.compute_recommendation(&user, count, today).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }

        Commands::RateDifficulty { user, exercise, difficulty } => {
            let difficulty: Difficulty = difficulty.parse()?;
            engine.record_difficulty(&user, &exercise, difficulty).await?;
        }

        Commands::Rate { user, exercise, rating } => {
            let rating: Rating = rating.parse()?;
            let score = engine.record_rating(&user, &exercise, rating).await?;
            println!("{}: {:.3}", exercise, score);
        }

        Commands::SetGoal { user, goal } => {
            let goal: Goal = goal.parse()?;
            engine.set_goal(&user, goal).await?;
        }

        Commands::SetProficiency { user, proficiency } => {
            let proficiency = Proficiency::parse_optional(&proficiency)?;
            engine.set_proficiency(&user, proficiency).await?;
        }

        Commands::SetGymAccess { user, access } => {
            engine.set_gym_access(&user, parse_gym_access(&access)?).await?;
        }

        Commands::History { user } => {
            let history = engine.workout_history(&user)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }

        Commands::Stats { user } => {
            let stats = engine.stats(&user)?;
            println!("Training Statistics");
            println!("{:-<40}", "");
            println!("Total weight: {}", stats.total_weight);
            println!("Total reps:   {}", stats.total_reps);
            println!("Days planned: {}", stats.total_days);
        }
    }

    Ok(())
}
