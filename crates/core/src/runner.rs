//! Sequential template runner, live or dry.
//!
//! Entries run strictly in source order. Each successful result is bound to
//! the entry's declared name so later `$name` references resolve to it.
//! Cancellation is observed before every entry; a command that polls also
//! observes it through its [`RunContext`].

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::ast::ParamValue;
use crate::command::{CancellationToken, RunContext};
use crate::compile::{CompiledTemplate, Entry};
use crate::error::CommandError;
use crate::execution::{CommandRecord, Execution, ExecutionMeta, ExecutionStatus};
use crate::value::{ParamMap, Value};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub meta: ExecutionMeta,
    pub cancel: CancellationToken,
}

/// Run every entry of `compiled` and return the execution record.
///
/// Command failures are recorded, never returned: the caller inspects
/// [`Execution::status`] and the per-command errors.
pub async fn run(compiled: CompiledTemplate, opts: RunOptions) -> Execution {
    let CompiledTemplate {
        id,
        source,
        entries,
        fillers,
        ..
    } = compiled;
    let mut exec = Execution::start(&id, &source, opts.meta, opts.dry_run);
    exec.fillers = fillers;

    let ctx = RunContext::new(opts.cancel);
    let mut refs: BTreeMap<String, String> = BTreeMap::new();
    let mut status = ExecutionStatus::Success;

    for mut entry in entries {
        if ctx.is_cancelled() {
            warn!(line = entry.line, "execution cancelled");
            status = ExecutionStatus::Cancelled;
            break;
        }

        let text = entry.node.to_string();
        let (inputs, outcome) = match resolve_params(&entry, &refs) {
            Ok(inputs) => {
                let outcome = run_entry(&mut entry, &inputs, &ctx, opts.dry_run).await;
                (inputs, outcome)
            }
            Err(e) => (entry.node.literal_params(), Err(e)),
        };

        let mut record = CommandRecord {
            line: entry.line,
            action: entry.node.action.clone(),
            entity: entry.node.entity.clone(),
            binding: entry.binding.clone(),
            text,
            inputs,
            result: None,
            error: None,
        };

        match outcome {
            Ok(result) => {
                info!(line = record.line, command = %record.text, result = %result, "ok");
                if let Some(name) = &entry.binding {
                    refs.insert(name.clone(), result.clone());
                }
                record.result = Some(result);
                exec.commands.push(record);
            }
            Err(err) => {
                warn!(line = record.line, command = %record.text, error = %err, "ko");
                let stop = match &err {
                    CommandError::Cancelled => Some(ExecutionStatus::Cancelled),
                    e if entry.command.is_fatal(e) => Some(ExecutionStatus::Failed),
                    _ => None,
                };
                record.error = Some(err.to_string());
                exec.commands.push(record);
                match stop {
                    Some(s) => {
                        status = s;
                        break;
                    }
                    None => status = ExecutionStatus::Failed,
                }
            }
        }
    }

    exec.finish(status);
    exec
}

async fn run_entry(
    entry: &mut Entry,
    inputs: &ParamMap,
    ctx: &RunContext,
    dry_run: bool,
) -> Result<String, CommandError> {
    let command = &mut entry.command;
    command.inject(inputs)?;
    if dry_run {
        let (action, entity) = (command.action(), command.entity());
        command
            .dry_run()
            .await
            .map_err(|e| CommandError::Other(format!("dry run: {} {}: {}", action, entity, e)))
    } else {
        command.run(ctx).await
    }
}

fn resolve_params(entry: &Entry, refs: &BTreeMap<String, String>) -> Result<ParamMap, CommandError> {
    entry
        .node
        .params
        .iter()
        .map(|(k, v)| Ok((k.clone(), resolve(v, refs)?)))
        .collect()
}

fn resolve(v: &ParamValue, refs: &BTreeMap<String, String>) -> Result<Value, CommandError> {
    match v {
        ParamValue::Literal(v) => Ok(v.clone()),
        ParamValue::Ref(name) => refs
            .get(name)
            .map(|r| Value::Str(r.clone()))
            .ok_or_else(|| CommandError::ReferenceNotFound(name.clone())),
        ParamValue::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match resolve(item, refs)? {
                    Value::List(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            Ok(Value::List(out))
        }
        ParamValue::Hole(h) => Err(CommandError::Other(format!("unresolved hole {{{}}}", h))),
        ParamValue::Alias(a) => Err(CommandError::Other(format!("unresolved alias @{}", a))),
    }
}
