pub mod commands;

use clap::{Parser, Subcommand};

use crate::auth::{password::DEFAULT_COST, Role};

#[derive(Parser)]
#[command(name = "bizdeskctl")]
#[command(about = "Operator tools for the bizdesk API: passwords, session tokens, route policy")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Hash a password for the users table")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
        #[arg(long, default_value_t = DEFAULT_COST, help = "bcrypt cost")]
        cost: u32,
    },

    #[command(about = "Issue a session token signed with JWT_SECRET_KEY")]
    IssueToken {
        #[arg(long, help = "Subject (user id)")]
        subject: String,
        #[arg(long, help = "SUPER_ADMIN, ADMIN or STAFF")]
        role: Role,
        #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a session token and print its claims")]
    VerifyToken {
        #[arg(help = "Compact JWT")]
        token: String,
    },

    #[command(about = "Show how the configured route policy classifies a path")]
    Classify {
        #[arg(help = "Request path, e.g. /api/admin/users")]
        path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::HashPassword { password, cost } => {
            commands::password::hash(password, cost, output_format).await
        }
        Commands::IssueToken {
            subject,
            role,
            hours,
        } => commands::token::issue(&subject, role, hours, output_format),
        Commands::VerifyToken { token } => commands::token::verify(&token, output_format),
        Commands::Classify { path } => commands::policy::classify(&path, output_format),
    }
}
