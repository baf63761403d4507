use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::store::document_id;
use crate::filter::FilterData;
use crate::models::User;
use crate::types::Collection;

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Username of the token subject
    pub username: String,

    /// Lifetime in hours (defaults to JWT_EXPIRY_HOURS)
    #[arg(long)]
    pub hours: Option<u64>,
}

pub async fn handle(args: TokenArgs, config: &AppConfig, output: OutputFormat) -> anyhow::Result<()> {
    let store = super::connect_store(config).await?;

    let doc = store
        .find(Collection::Users, &FilterData::new().where_eq("username", &args.username))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("user '{}' not found", args.username))?;
    let id = document_id(&doc).ok_or_else(|| anyhow::anyhow!("user '{}' has no id", args.username))?;
    let user: User = serde_json::from_value(serde_json::Value::Object(doc))?;

    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let claims = Claims::new(id, user.role, user.scope(), hours);
    let token = generate_jwt(&config.security, &claims)?;

    match output {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "role": user.role, "expiresAt": claims.exp })
        ),
        OutputFormat::Text => println!("{token}"),
    }
    Ok(())
}
