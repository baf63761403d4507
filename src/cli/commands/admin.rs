use clap::Args;
use serde_json::json;

use crate::auth::AccessScope;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::models::user::MIN_PASSWORD_LEN;
use crate::services::RecordService;
use crate::types::{Collection, Role};

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn handle(args: CreateAdminArgs, config: &AppConfig, output: OutputFormat) -> anyhow::Result<()> {
    if args.password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }

    let store = super::connect_store(config).await?;
    let records = RecordService::standard(store);

    let body = json!({
        "username": args.username,
        "email": args.email,
        "password": args.password,
        "role": Role::Admin,
    });
    let serde_json::Value::Object(body) = body else {
        anyhow::bail!("admin body is not an object");
    };
    let mut user = records
        .create(Collection::Users, body, AccessScope::Unrestricted, None)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create admin: {e}"))?;
    user.remove("password");

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!(
            "Created admin {} ({})",
            user.get("username").and_then(|v| v.as_str()).unwrap_or_default(),
            user.get("customId").and_then(|v| v.as_str()).unwrap_or_default()
        ),
    }
    Ok(())
}
