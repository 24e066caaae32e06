use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::Ordering;

use stratus_core::{compile, revert_source, run, CancellationToken, Execution, RunOptions};
use stratus_storage::StratusStorage;
use tracing::{info, warn};

use super::Context;
use crate::OutputFormat;

pub(crate) async fn cmd_run(
    ctx: &Context,
    template: &Path,
    vars: &[String],
    message: Option<String>,
    dry_run: bool,
) -> i32 {
    let source = match read_template(template) {
        Ok(source) => source,
        Err(e) => {
            ctx.report(&e);
            return 1;
        }
    };
    let vars = match parse_vars(vars) {
        Ok(vars) => vars,
        Err(e) => {
            ctx.report(&e);
            return 1;
        }
    };
    execute(ctx, &source, vars, message.unwrap_or_default(), dry_run).await
}

/// Compile the reverse template of execution `id` and run it.
pub(crate) async fn cmd_revert(ctx: &Context, id: &str, dry_run: bool) -> i32 {
    let exec = match ctx.storage.load_execution(id).await {
        Ok(exec) => exec,
        Err(e) => {
            ctx.report(&e.to_string());
            return 1;
        }
    };
    let source = match revert_source(&exec) {
        Ok(source) => source,
        Err(e) => {
            ctx.report(&format!("cannot revert {}: {}", id, e));
            return 1;
        }
    };
    if !ctx.quiet && ctx.output == OutputFormat::Text {
        eprintln!("Reverting {}:\n{}", id, source);
    }
    execute(
        ctx,
        &source,
        BTreeMap::new(),
        format!("revert of {}", id),
        dry_run,
    )
    .await
}

async fn execute(
    ctx: &Context,
    source: &str,
    vars: BTreeMap<String, String>,
    message: String,
    dry_run: bool,
) -> i32 {
    if let Err(e) = ctx.install_factory(!dry_run) {
        ctx.report(&e);
        return 1;
    }
    let mut env = ctx.env().with_variables(vars);
    let compiled = match compile(source, &mut env) {
        Ok(compiled) => compiled,
        Err(e) => {
            ctx.report(&e.to_string());
            return 1;
        }
    };

    let cancel = CancellationToken::default();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current command");
            on_interrupt.store(true, Ordering::SeqCst);
        }
    });
    let exec = run(
        compiled,
        RunOptions {
            dry_run,
            meta: ctx.meta(message),
            cancel,
        },
    )
    .await;
    watcher.abort();

    if !dry_run {
        match ctx.storage.save_execution(&exec).await {
            Ok(()) => info!(id = %exec.id, "execution saved"),
            Err(e) => ctx.report(&format!("failed to save execution {}: {}", exec.id, e)),
        }
    }
    print_execution(ctx, &exec);
    if exec.has_errors() {
        1
    } else {
        0
    }
}

pub(crate) fn print_execution(ctx: &Context, exec: &Execution) {
    match ctx.output {
        OutputFormat::Json => match serde_json::to_string_pretty(exec) {
            Ok(json) => println!("{}", json),
            Err(e) => ctx.report(&format!("serialization error: {}", e)),
        },
        OutputFormat::Text => {
            if ctx.quiet {
                for result in exec.commands.iter().filter_map(|c| c.result.as_deref()) {
                    println!("{}", result);
                }
            } else {
                println!("{}", exec.render_log());
            }
        }
    }
}

fn read_template(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| format!("error reading template from stdin: {}", e))?;
        return Ok(source);
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("error reading template '{}': {}", path.display(), e))
}

/// `KEY=VALUE` pairs; later pairs override earlier ones.
fn parse_vars(raw: &[String]) -> Result<BTreeMap<String, String>, String> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => Err(format!("invalid --var '{}': expected KEY=VALUE", pair)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vars_split_on_first_equals() {
        let vars = parse_vars(&["name=web".into(), "data=a=b".into()]).unwrap();
        assert_eq!(vars["name"], "web");
        assert_eq!(vars["data"], "a=b");
    }

    #[test]
    fn vars_without_key_are_rejected() {
        assert!(parse_vars(&["=x".into()]).is_err());
        assert!(parse_vars(&["novalue".into()]).is_err());
    }
}
