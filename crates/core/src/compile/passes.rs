use std::collections::BTreeMap;

use crate::ast::{Expr, Node, ParamValue, Template};
use crate::error::Error;
use crate::value::Value;

use super::env::Env;
use super::expand::{expand_variables, read_file_param};
use super::State;

type Pass = fn(&mut Template, &mut Env, &mut State) -> Result<(), Error>;

pub(super) const PASSES: [(&str, Pass); 14] = [
    ("verify commands defined", verify_commands_defined),
    ("check declarations", check_declarations),
    ("fail on unexpected params", fail_on_unexpected_params),
    ("normalize missing params as holes", normalize_missing_as_holes),
    ("check references", check_references),
    ("resolve holes from fillers", resolve_holes_from_fillers),
    ("resolve missing holes", resolve_missing_holes),
    ("resolve aliases", resolve_aliases),
    ("inline value declarations", inline_value_declarations),
    ("fail on unresolved holes", fail_on_unresolved),
    ("load file params", load_file_params),
    ("expand template variables", expand_template_variables),
    ("apply defaults", apply_defaults),
    ("validate commands", validate_commands),
];

/// Visit every parameter value: `(entity, key, value)` for commands and
/// `("", ident, value)` for value declarations.
fn for_each_value<F>(template: &mut Template, mut f: F)
where
    F: FnMut(&str, &str, &mut ParamValue),
{
    for stmt in &mut template.statements {
        match &mut stmt.node {
            Node::Declaration(d) => match &mut d.expr {
                Expr::Value(v) => f("", &d.ident, v),
                Expr::Command(c) => {
                    for (k, v) in c.params.iter_mut() {
                        f(&c.entity, k, v);
                    }
                }
            },
            Node::Command(c) => {
                for (k, v) in c.params.iter_mut() {
                    f(&c.entity, k, v);
                }
            }
        }
    }
}

fn path(entity: &str, key: &str) -> String {
    if entity.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", entity, key)
    }
}

fn verify_commands_defined(
    template: &mut Template,
    _env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    let mut errors = Vec::new();
    for node in template.commands() {
        match state.factory.build(&node.key()) {
            Some(cmd) => state.commands.push(cmd),
            None => errors.push(Error::UnknownCommand(node.key())),
        }
    }
    Error::collect(errors)
}

fn check_declarations(template: &mut Template, _env: &mut Env, state: &mut State) -> Result<(), Error> {
    let mut idx = 0;
    for stmt in &template.statements {
        if stmt.node.command().is_none() {
            continue;
        }
        if let Node::Declaration(d) = &stmt.node {
            if !state.commands[idx].returns_result() {
                return Err(Error::Compile(format!(
                    "line {}: '{}': command does not return a result, cannot assign to a variable",
                    stmt.line, d.ident
                )));
            }
        }
        idx += 1;
    }
    Ok(())
}

fn fail_on_unexpected_params(
    template: &mut Template,
    _env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    let mut errors = Vec::new();
    for (node, cmd) in template.commands().zip(&state.commands) {
        if let Err(source) = cmd.params_rule().check_unexpected(&node.keys()) {
            errors.push(Error::Rule {
                command: format!("{} {}", node.action, node.entity),
                source,
            });
        }
    }
    Error::collect(errors)
}

fn normalize_missing_as_holes(
    template: &mut Template,
    _env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    for (node, cmd) in template.commands_mut().zip(&state.commands) {
        for key in cmd.params_rule().missing(&node.keys()) {
            let hole = format!("{}.{}", node.entity, key);
            node.params.insert(key, ParamValue::Hole(hole));
        }
    }
    Ok(())
}

fn check_references(template: &mut Template, _env: &mut Env, _state: &mut State) -> Result<(), Error> {
    let mut declared: Vec<&str> = Vec::new();
    let mut errors = Vec::new();
    for stmt in &template.statements {
        let refs = match &stmt.node {
            Node::Declaration(d) => match &d.expr {
                Expr::Command(c) => c.refs(),
                Expr::Value(v) => {
                    let mut out = Vec::new();
                    v.collect_refs(&mut out);
                    out
                }
            },
            Node::Command(c) => c.refs(),
        };
        for r in refs {
            if !declared.contains(&r.as_str()) {
                errors.push(Error::Compile(format!(
                    "using reference '${}' but '{}' is undefined in template",
                    r, r
                )));
            }
        }
        if let Some(name) = stmt.node.binding() {
            declared.push(name);
        }
    }
    Error::collect(errors)
}

fn fill_holes(template: &mut Template, fillers: &BTreeMap<String, Value>, used: &mut BTreeMap<String, Value>) {
    for_each_value(template, |_, _, v| {
        v.rewrite(&mut |leaf| match leaf {
            ParamValue::Hole(name) => fillers.get(name).map(|value| {
                used.insert(name.clone(), value.clone());
                ParamValue::Literal(value.clone())
            }),
            _ => None,
        });
        let taken = std::mem::replace(v, ParamValue::List(Vec::new()));
        *v = taken.flatten();
    });
}

fn resolve_holes_from_fillers(
    template: &mut Template,
    env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    fill_holes(template, &env.fillers, &mut state.fillers);
    Ok(())
}

fn resolve_missing_holes(
    template: &mut Template,
    env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    let mut holes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for_each_value(template, |entity, key, v| {
        let mut names = Vec::new();
        v.collect_holes(&mut names);
        for n in names {
            let paths = holes.entry(n).or_default();
            let p = path(entity, key);
            if !paths.contains(&p) {
                paths.push(p);
            }
        }
    });
    if holes.is_empty() {
        return Ok(());
    }

    let mut answers = BTreeMap::new();
    for (hole, paths) in &holes {
        if let Some(value) = env.ask_missing(hole, paths) {
            answers.insert(hole.clone(), value);
        }
    }
    fill_holes(template, &answers, &mut state.fillers);
    Ok(())
}

fn resolve_aliases(template: &mut Template, env: &mut Env, _state: &mut State) -> Result<(), Error> {
    let mut unresolved = Vec::new();
    for_each_value(template, |entity, key, v| {
        v.rewrite(&mut |leaf| match leaf {
            ParamValue::Alias(alias) => match env.resolve_alias(entity, key, alias) {
                Some(id) => Some(ParamValue::Literal(Value::Str(id))),
                None => {
                    unresolved.push(format!("@{}", alias));
                    None
                }
            },
            _ => None,
        });
    });
    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(Error::Compile(format!(
            "cannot resolve aliases: {}",
            unresolved.join(", ")
        )))
    }
}

fn inline_value_declarations(
    template: &mut Template,
    _env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    let mut values: BTreeMap<String, ParamValue> = BTreeMap::new();
    for stmt in &mut template.statements {
        match &mut stmt.node {
            Node::Declaration(d) => match &mut d.expr {
                Expr::Value(v) => {
                    substitute(v, &values);
                    if let Some(resolved) = v.as_value() {
                        state
                            .resolved_variables
                            .insert(d.ident.clone(), resolved);
                    }
                    values.insert(d.ident.clone(), v.clone());
                }
                Expr::Command(c) => {
                    for v in c.params.values_mut() {
                        substitute(v, &values);
                    }
                    values.remove(&d.ident);
                }
            },
            Node::Command(c) => {
                for v in c.params.values_mut() {
                    substitute(v, &values);
                }
            }
        }
    }
    Ok(())
}

fn substitute(v: &mut ParamValue, values: &BTreeMap<String, ParamValue>) {
    v.rewrite(&mut |leaf| match leaf {
        ParamValue::Ref(name) => values.get(name).cloned(),
        _ => None,
    });
    let taken = std::mem::replace(v, ParamValue::List(Vec::new()));
    *v = taken.flatten();
}

fn fail_on_unresolved(template: &mut Template, _env: &mut Env, _state: &mut State) -> Result<(), Error> {
    let mut holes = Vec::new();
    let mut aliases = Vec::new();
    for_each_value(template, |_, _, v| {
        v.collect_holes(&mut holes);
        v.collect_aliases(&mut aliases);
    });
    holes.sort();
    holes.dedup();
    if !holes.is_empty() {
        let names: Vec<String> = holes.iter().map(|h| format!("{{{}}}", h)).collect();
        return Err(Error::Compile(format!(
            "template contains unresolved holes: {}",
            names.join(", ")
        )));
    }
    if !aliases.is_empty() {
        let names: Vec<String> = aliases.iter().map(|a| format!("@{}", a)).collect();
        return Err(Error::Compile(format!(
            "cannot resolve aliases: {}",
            names.join(", ")
        )));
    }
    Ok(())
}

fn load_file_params(template: &mut Template, _env: &mut Env, state: &mut State) -> Result<(), Error> {
    for (node, cmd) in template.commands_mut().zip(&state.commands) {
        for key in cmd.file_params() {
            if let Some(ParamValue::Literal(Value::Str(s))) = node.params.get(*key) {
                let content = read_file_param(s)?;
                node.params
                    .insert(key.to_string(), ParamValue::Literal(Value::Str(content)));
            }
        }
    }
    Ok(())
}

fn expand_template_variables(
    template: &mut Template,
    env: &mut Env,
    state: &mut State,
) -> Result<(), Error> {
    let mut vars = env.variables.clone();
    for (k, v) in &state.resolved_variables {
        vars.entry(k.clone()).or_insert_with(|| v.to_string());
    }
    let mut failure = None;
    for node in template.commands_mut() {
        for v in node.params.values_mut() {
            v.rewrite(&mut |leaf| match leaf {
                ParamValue::Literal(Value::Str(s)) if s.contains("{{") => {
                    match expand_variables(s, &vars) {
                        Ok(expanded) => Some(ParamValue::Literal(Value::Str(expanded))),
                        Err(e) => {
                            if failure.is_none() {
                                failure = Some(e);
                            }
                            None
                        }
                    }
                }
                _ => None,
            });
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn apply_defaults(template: &mut Template, _env: &mut Env, state: &mut State) -> Result<(), Error> {
    for (node, cmd) in template.commands_mut().zip(&state.commands) {
        for (k, v) in cmd.defaults() {
            node.params.entry(k).or_insert(ParamValue::Literal(v));
        }
    }
    Ok(())
}

fn validate_commands(template: &mut Template, _env: &mut Env, state: &mut State) -> Result<(), Error> {
    let mut errors = Vec::new();
    for (node, cmd) in template.commands().zip(&state.commands) {
        if let Err(e) = cmd.validate(&node.keys(), &node.literal_params()) {
            errors.push(e);
        }
    }
    Error::collect(errors)
}
