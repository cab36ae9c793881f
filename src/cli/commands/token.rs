use anyhow::Context;
use chrono::Utc;
use serde_json::json;

use crate::auth::Role;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn issue(
    subject: &str,
    role: Role,
    hours: Option<u64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let keys = config.token_keys_for(hours.unwrap_or(config.security.jwt_expiry_hours))?;

    let issued = keys
        .issue(subject, role, Utc::now().timestamp())
        .context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": issued.token, "claims": issued.claims, "expiresIn": issued.expires_in })
        ),
        OutputFormat::Text => println!("{}", issued.token),
    }
    Ok(())
}

pub fn verify(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let claims = config
        .token_keys()?
        .verify(token, Utc::now().timestamp())
        .context("token rejected")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&claims)?),
        OutputFormat::Text => {
            println!("subject:  {}", claims.sub);
            println!("role:     {}", claims.role);
            println!("issued:   {}", claims.iat);
            println!("expires:  {}", claims.exp);
        }
    }
    Ok(())
}
