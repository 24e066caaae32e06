use stratus_storage::{split_config_key, StratusStorage};

use super::Context;
use crate::OutputFormat;

/// The stored value if one was set, else the configuration file's.
pub(crate) async fn cmd_config_get(ctx: &Context, path: &str) -> i32 {
    let (scope, key) = match split_config_key(path) {
        Ok(parts) => parts,
        Err(e) => {
            ctx.report(&e.to_string());
            return 1;
        }
    };
    let stored = match ctx.storage.config_get(scope, key).await {
        Ok(stored) => stored,
        Err(e) => {
            ctx.report(&e.to_string());
            return 1;
        }
    };
    match stored.or_else(|| ctx.config.file_value(scope, key)) {
        Some(value) => {
            match ctx.output {
                OutputFormat::Text => println!("{}", value),
                OutputFormat::Json => println!("{}", serde_json::json!({ "key": path, "value": value })),
            }
            0
        }
        None => {
            ctx.report(&format!("{} is not set", path));
            1
        }
    }
}

pub(crate) async fn cmd_config_set(ctx: &Context, path: &str, value: &str) -> i32 {
    let result = match split_config_key(path) {
        Ok((scope, key)) => ctx.storage.config_set(scope, key, value).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            if !ctx.quiet && ctx.output == OutputFormat::Text {
                eprintln!("{} = {}", path, value);
            }
            0
        }
        Err(e) => {
            ctx.report(&e.to_string());
            1
        }
    }
}
