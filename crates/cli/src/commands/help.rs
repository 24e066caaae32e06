use std::fmt::Write;

use serde_json::json;
use stratus_core::{current_factory, Command, Docs};

use super::Context;
use crate::OutputFormat;

pub(crate) fn cmd_help(ctx: &Context, action: Option<&str>, entity: Option<&str>) -> i32 {
    if let Err(e) = ctx.install_factory(false) {
        ctx.report(&e);
        return 1;
    }
    let Some(factory) = current_factory() else {
        ctx.report("no command factory installed");
        return 1;
    };
    let docs = stratus_aws::docs();
    let commands: Vec<Box<dyn Command>> = factory
        .keys()
        .iter()
        .filter_map(|key| factory.build(key))
        .filter(|c| action.map_or(true, |a| c.action() == a))
        .filter(|c| entity.map_or(true, |e| c.entity() == e))
        .collect();

    match (action, entity, commands.as_slice()) {
        (Some(_), Some(_), [cmd]) => {
            match ctx.output {
                OutputFormat::Text => print!("{}", describe(docs, cmd.as_ref())),
                OutputFormat::Json => println!("{}", detail_json(docs, cmd.as_ref())),
            }
            0
        }
        (_, _, []) => {
            let what = [action, entity].into_iter().flatten().collect::<Vec<_>>().join(" ");
            ctx.report(&format!("unknown command '{}'", what));
            1
        }
        _ => {
            match ctx.output {
                OutputFormat::Text => {
                    let width = commands
                        .iter()
                        .map(|c| c.action().len() + c.entity().len() + 1)
                        .max()
                        .unwrap_or(0);
                    for cmd in &commands {
                        let name = format!("{} {}", cmd.action(), cmd.entity());
                        let description = docs.description_for(cmd.action(), cmd.entity()).unwrap_or("");
                        println!("  {:width$}  {}", name, description, width = width);
                    }
                }
                OutputFormat::Json => {
                    let list: Vec<_> = commands
                        .iter()
                        .map(|c| {
                            json!({
                                "action": c.action(),
                                "entity": c.entity(),
                                "description": docs.description_for(c.action(), c.entity()),
                            })
                        })
                        .collect();
                    println!("{}", json!(list));
                }
            }
            0
        }
    }
}

fn describe(docs: &Docs, cmd: &dyn Command) -> String {
    let (action, entity) = (cmd.action(), cmd.entity());
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", action, entity);
    if let Some(description) = docs.description_for(action, entity) {
        let _ = writeln!(out, "\t{}", description);
    }
    let (required, optional, suggested) = cmd.params_rule().list();
    for (title, params) in [
        ("Required params", required),
        ("Suggested params", suggested),
        ("Optional params", optional),
    ] {
        if params.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}:", title);
        for param in params {
            match docs.help_for(action, entity, &param) {
                Some(help) => {
                    let _ = writeln!(out, "  {:<16} {}", param, help);
                }
                None => {
                    let _ = writeln!(out, "  {}", param);
                }
            }
        }
    }
    let examples = docs.examples_for(action, entity);
    if !examples.is_empty() {
        let _ = writeln!(out, "\nExamples:");
        for example in examples {
            let _ = writeln!(out, "  {}", example);
        }
    }
    out
}

fn detail_json(docs: &Docs, cmd: &dyn Command) -> serde_json::Value {
    let (action, entity) = (cmd.action(), cmd.entity());
    let (required, optional, suggested) = cmd.params_rule().list();
    json!({
        "action": action,
        "entity": entity,
        "description": docs.description_for(action, entity),
        "required": required,
        "suggested": suggested,
        "optional": optional,
        "examples": docs.examples_for(action, entity),
    })
}
