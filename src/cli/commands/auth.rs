use clap::Subcommand;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::crypto::BcryptPasswordMatcher;
use crate::types::UserId;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Print the bcrypt hash of a password")]
    HashPassword {
        #[arg(help = "Plain password")]
        password: String,
    },

    #[command(about = "Issue a development JWT signed with JWT_SECRET")]
    Token {
        #[arg(help = "User id")]
        user_id: UserId,
        #[arg(help = "Username", default_value = "developer")]
        username: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::HashPassword { password } => {
            output_value(&output_format, "hash", &BcryptPasswordMatcher::hash(&password)?)
        }
        AuthCommands::Token { user_id, username } => {
            let token = generate_jwt(Claims::new(user_id, username))?;
            output_value(&output_format, "token", &token)
        }
    }
}
