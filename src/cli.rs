use clap::{Parser, Subcommand};

/// Sharegate — scoped public share links for project collaboration tools
#[derive(Parser)]
#[command(name = "sharegate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the share-link server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Manage share tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// List share tokens for a project tool, including expired/revoked
    List {
        /// Tool key: fix-list, mood-boards, or decision-tracker
        #[arg(long)]
        tool: String,
        #[arg(long)]
        project_id: String,
    },
    /// Revoke a share token (idempotent)
    Revoke {
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        token_id: String,
    },
}
