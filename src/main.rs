use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Next-book recommendations for library patrons", long_about = None)]
struct Cli {
    /// Config file (default: ./bookwise.toml, then ~/.bookwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend books for one user
    Recommend {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Number of recommendations
        #[arg(short = 'k', long, default_value_t = 1)]
        top_k: usize,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Build a shelf of books around one personalized pick
    Shelf {
        /// User id (omit for an anonymous, popularity-only shelf)
        #[arg(short, long)]
        user: Option<String>,

        /// Shelf size
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the most borrowed books
    Popular {
        /// Number of books
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Recommend for several users in parallel
    Batch {
        /// User ids (repeat the flag for each user)
        #[arg(short, long = "user", required = true)]
        users: Vec<String>,

        /// Number of recommendations per user
        #[arg(short = 'k', long, default_value_t = 1)]
        top_k: usize,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show each scoring term for one user and book
    Explain {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Book id
        #[arg(short, long)]
        book: String,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show catalog, embedding and ledger state
    Status {
        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it as TOML to this path instead of printing
        #[arg(long)]
        write: Option<PathBuf>,
    },

    /// Record a borrow in the ledger
    Borrow {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Book id
        #[arg(short, long)]
        book: String,

        /// Borrow time (RFC 3339 or YYYY-MM-DD, default now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a return in the ledger
    Return {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Book id
        #[arg(short, long)]
        book: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("BOOKWISE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Recommend { user, top_k, json } => {
            commands::recommend::execute(config, &user, top_k, json)?;
        }
        Commands::Shelf { user, count, json } => {
            commands::shelf::execute(config, user.as_deref(), count, json)?;
        }
        Commands::Popular { count, json } => {
            commands::popular::execute(config, count, json)?;
        }
        Commands::Batch { users, top_k, json } => {
            commands::batch::execute(config, &users, top_k, json)?;
        }
        Commands::Explain { user, book, json } => {
            commands::explain::execute(config, &user, &book, json)?;
        }
        Commands::Status { json } => {
            commands::status::execute(config, json)?;
        }
        Commands::Config { write } => {
            commands::config::execute(config, write.as_deref())?;
        }
        Commands::Borrow { user, book, at } => {
            commands::ledger::borrow(config, &user, &book, at.as_deref())?;
        }
        Commands::Return { user, book } => {
            commands::ledger::give_back(config, &user, &book)?;
        }
    }

    Ok(())
}
