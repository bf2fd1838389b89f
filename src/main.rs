use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use notebridge::config::AppConfig;
use notebridge::db::Database;
use notebridge::http::{self, AppState};
use notebridge::logging::init_logging;
use notebridge::models::{RegisterUserRequest, Role};
use notebridge::service::UserService;
use notebridge::storage::build_blob_store;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overrides `server.bind_addr`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Create an account directly in the database
    CreateUser {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Plain-text password
        #[arg(short, long)]
        password: String,

        /// STUDENT, TEACHER or ADMIN
        #[arg(short, long, default_value = "STUDENT")]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging, keeping the file writer alive until exit
    let _log_guard = init_logging(&config.logging)?;

    info!("Starting notebridge");

    // Initialize database with configuration
    let db = Database::from_config(&config.database).context("Failed to open database")?;

    match cli.command {
        Commands::Serve { bind } => {
            let blobs = build_blob_store(&config.storage).await?;
            let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
            let state = AppState::new(db, blobs, &config);
            http::serve(state, &bind_addr).await?;
        }
        Commands::CreateUser {
            username,
            email,
            password,
            role,
        } => {
            let user = UserService::new(db)
                .create_user(RegisterUserRequest {
                    username: Some(username),
                    password: Some(password),
                    email: Some(email),
                    role: Some(role),
                    ..RegisterUserRequest::default()
                })
                .context("Failed to create user")?;
            info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        }
    }

    Ok(())
}
