//! Template AST produced by the parser and rewritten by the compiler.
//!
//! Every statement carries the source line of its first token. The compiler
//! only ever replaces parameter values in place; it never reorders
//! statements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub node: Node,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A bare command line.
    Command(CommandNode),
    /// `ident = <value or command>`
    Declaration(DeclarationNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    pub ident: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Command(CommandNode),
    Value(ParamValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub action: String,
    pub entity: String,
    pub params: BTreeMap<String, ParamValue>,
}

/// A parameter value before (and during) compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Literal(Value),
    /// `$name`, bound to a prior declaration.
    Ref(String),
    /// `{name}`, filled by the environment.
    Hole(String),
    /// `@name`, resolved through the alias callback.
    Alias(String),
    List(Vec<ParamValue>),
}

impl CommandNode {
    pub fn new(action: &str, entity: &str) -> Self {
        CommandNode {
            action: action.to_string(),
            entity: entity.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Factory key: `lower(action) || lower(entity)`.
    pub fn key(&self) -> String {
        command_key(&self.action, &self.entity)
    }

    pub fn keys(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    /// Parameters that are plain values, in key order.
    pub fn literal_params(&self) -> BTreeMap<String, Value> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_value().map(|val| (k.clone(), val)))
            .collect()
    }

    /// Names of every `$ref` used by this command, including inside lists.
    pub fn refs(&self) -> Vec<String> {
        let mut out = Vec::new();
        for v in self.params.values() {
            v.collect_refs(&mut out);
        }
        out
    }
}

pub fn command_key(action: &str, entity: &str) -> String {
    format!("{}{}", action.to_lowercase(), entity.to_lowercase())
}

impl ParamValue {
    /// The concrete value, or `None` while any part is still unresolved.
    pub fn as_value(&self) -> Option<Value> {
        match self {
            ParamValue::Literal(v) => Some(v.clone()),
            ParamValue::List(items) => items
                .iter()
                .map(|i| i.as_value())
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.as_value().is_some()
    }

    pub(crate) fn collect_refs(&self, out: &mut Vec<String>) {
        match self {
            ParamValue::Ref(name) => out.push(name.clone()),
            ParamValue::List(items) => items.iter().for_each(|i| i.collect_refs(out)),
            _ => {}
        }
    }

    pub(crate) fn collect_holes(&self, out: &mut Vec<String>) {
        match self {
            ParamValue::Hole(name) => out.push(name.clone()),
            ParamValue::List(items) => items.iter().for_each(|i| i.collect_holes(out)),
            _ => {}
        }
    }

    pub(crate) fn collect_aliases(&self, out: &mut Vec<String>) {
        match self {
            ParamValue::Alias(name) => out.push(name.clone()),
            ParamValue::List(items) => items.iter().for_each(|i| i.collect_aliases(out)),
            _ => {}
        }
    }

    /// Rewrite leaves in place; `f` returns `Some(replacement)` to substitute.
    pub(crate) fn rewrite<F>(&mut self, f: &mut F)
    where
        F: FnMut(&ParamValue) -> Option<ParamValue>,
    {
        if let ParamValue::List(items) = self {
            for i in items.iter_mut() {
                i.rewrite(f);
            }
            return;
        }
        if let Some(replacement) = f(self) {
            *self = replacement;
        }
    }

    /// Splice nested lists produced by substitution into their parent.
    pub(crate) fn flatten(self) -> ParamValue {
        match self {
            ParamValue::List(items) => {
                let mut flat = Vec::new();
                for i in items {
                    match i.flatten() {
                        ParamValue::List(inner) => flat.extend(inner),
                        ParamValue::Literal(Value::List(inner)) => {
                            flat.extend(inner.into_iter().map(ParamValue::Literal))
                        }
                        other => flat.push(other),
                    }
                }
                ParamValue::List(flat)
            }
            other => other,
        }
    }
}

impl Template {
    pub fn commands(&self) -> impl Iterator<Item = &CommandNode> {
        self.statements.iter().filter_map(|s| s.node.command())
    }

    pub fn commands_mut(&mut self) -> impl Iterator<Item = &mut CommandNode> {
        self.statements.iter_mut().filter_map(|s| s.node.command_mut())
    }
}

impl Node {
    pub fn command(&self) -> Option<&CommandNode> {
        match self {
            Node::Command(c) => Some(c),
            Node::Declaration(DeclarationNode {
                expr: Expr::Command(c),
                ..
            }) => Some(c),
            _ => None,
        }
    }

    pub fn command_mut(&mut self) -> Option<&mut CommandNode> {
        match self {
            Node::Command(c) => Some(c),
            Node::Declaration(DeclarationNode {
                expr: Expr::Command(c),
                ..
            }) => Some(c),
            _ => None,
        }
    }

    /// The name this statement binds, if any.
    pub fn binding(&self) -> Option<&str> {
        match self {
            Node::Declaration(d) => Some(&d.ident),
            Node::Command(_) => None,
        }
    }
}
