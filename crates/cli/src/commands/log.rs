use stratus_storage::{ExecutionFilter, StratusStorage};

use super::run::print_execution;
use super::Context;
use crate::OutputFormat;

pub(crate) async fn cmd_log(
    ctx: &Context,
    id: Option<&str>,
    limit: usize,
    errors: bool,
    template: Option<String>,
) -> i32 {
    if let Some(id) = id {
        return match ctx.storage.load_execution(id).await {
            Ok(exec) => {
                print_execution(ctx, &exec);
                0
            }
            Err(e) => {
                ctx.report(&e.to_string());
                1
            }
        };
    }

    let filter = ExecutionFilter {
        template_id: template,
        only_errors: errors,
        limit,
        ..Default::default()
    };
    let execs = match ctx.storage.load_executions(&filter).await {
        Ok(execs) => execs,
        Err(e) => {
            ctx.report(&e.to_string());
            return 1;
        }
    };
    match ctx.output {
        OutputFormat::Json => match serde_json::to_string_pretty(&execs) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                ctx.report(&format!("serialization error: {}", e));
                return 1;
            }
        },
        OutputFormat::Text => {
            if execs.is_empty() && !ctx.quiet {
                eprintln!("no executions recorded");
            }
            for exec in &execs {
                println!("{}\n", exec.render_log());
            }
        }
    }
    0
}

pub(crate) async fn cmd_show(ctx: &Context, id: &str) -> i32 {
    match ctx.storage.load_execution(id).await {
        Ok(exec) => {
            match ctx.output {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "id": exec.id,
                        "template_id": exec.template_id,
                        "source": exec.source,
                    })
                ),
                OutputFormat::Text => print!("{}", exec.source),
            }
            0
        }
        Err(e) => {
            ctx.report(&e.to_string());
            1
        }
    }
}
