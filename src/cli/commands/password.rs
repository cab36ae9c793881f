use serde_json::json;

use crate::auth::password::hash_password_async;
use crate::cli::OutputFormat;

pub async fn hash(password: String, cost: u32, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = hash_password_async(password, cost).await?;
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "hash": hash })),
        OutputFormat::Text => println!("{}", hash),
    }
    Ok(())
}
