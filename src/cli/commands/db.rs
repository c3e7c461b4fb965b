use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::crypto::BcryptPasswordMatcher;
use crate::database::{DatabaseManager, PgStore};
use crate::services::WorkspaceService;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply the workspace schema to DATABASE_URL")]
    Migrate,

    #[command(about = "Insert a user so it can own projects")]
    CreateUser {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password; stored as a bcrypt hash")]
        password: String,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("DATABASE_URL must point at a reachable Postgres database")?;
    DatabaseManager::migrate(&pool).await?;

    match cmd {
        DbCommands::Migrate => output_success(&output_format, "Schema is up to date", None),
        DbCommands::CreateUser { username, password } => {
            let service = WorkspaceService::from_config(Arc::new(PgStore::new(pool)), config);
            let user = service
                .create_user(&username, &BcryptPasswordMatcher::hash(&password)?)
                .await?;
            output_success(
                &output_format,
                &format!("Created user {} ({})", user.username, user.id),
                Some(json!({ "id": user.id, "username": user.username })),
            )
        }
    }
}
