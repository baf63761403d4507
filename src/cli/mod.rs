pub mod commands;

use clap::{Parser, Subcommand};

use crate::config;

#[derive(Parser)]
#[command(name = "umc-admin")]
#[command(about = "Administration tasks for the UMC Records API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create tables, counters and unique indexes (idempotent)")]
    Migrate,

    #[command(name = "create-admin", about = "Create an admin user")]
    CreateAdmin(commands::admin::CreateAdminArgs),

    #[command(about = "Issue a bearer token for an existing user")]
    Token(commands::token::TokenArgs),
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
    let config = config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateAdmin(args) => commands::admin::handle(args, config, output_format).await,
        Commands::Token(args) => commands::token::handle(args, config, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_admin() {
        let cli = Cli::parse_from([
            "umc-admin",
            "create-admin",
            "--username",
            "root",
            "--email",
            "root@umc.ph",
            "--password",
            "long-password",
        ]);
        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.username, "root");
                assert_eq!(args.email, "root@umc.ph");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::parse_from(["umc-admin", "token", "root", "--json"]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
    }
}
