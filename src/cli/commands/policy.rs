use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::policy::{RouteClass, RoutePolicy};

pub fn classify(path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let policy = config.route_policy()?;
    let described = describe(&policy, path);

    match output_format {
        OutputFormat::Json => println!("{}", described),
        OutputFormat::Text => {
            print!("{} -> {}", path, described["class"].as_str().unwrap_or("?"));
            if let Some(roles) = described["roles"].as_array() {
                let roles: Vec<&str> = roles.iter().filter_map(Value::as_str).collect();
                print!(" [{}]", roles.join(", "));
            }
            println!();
        }
    }
    Ok(())
}

fn describe(policy: &RoutePolicy, path: &str) -> Value {
    match policy.classify(path) {
        RouteClass::Public if policy.is_login_page(path) => {
            json!({ "path": path, "class": "public", "login_page": true })
        }
        RouteClass::Public => json!({ "path": path, "class": "public" }),
        RouteClass::ProtectedApi(rule) => json!({
            "path": path,
            "class": "protected-api",
            "prefix": rule.prefix,
            "roles": rule.roles,
        }),
        RouteClass::ProtectedPage => json!({ "path": path, "class": "protected-page" }),
        RouteClass::Unclassified => json!({ "path": path, "class": "unclassified" }),
    }
}
