//! Template compiler: parsed template + [`Env`] → [`CompiledTemplate`].
//!
//! Compilation is a fixed sequence of passes over the AST. Each pass either
//! rewrites parameter values in place or checks them; the first pass that
//! fails stops compilation, reporting every problem it found at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::ast::{CommandNode, Template};
use crate::command::Command;
use crate::error::Error;
use crate::factory::CommandFactory;
use crate::parser::parse;
use crate::value::Value;

mod env;
mod expand;
mod passes;

pub use env::{AliasFn, Env, MissingHolesFn};
pub use expand::{expand_variables, read_file_param};

/// A template ready to run: one entry per command, in source order.
pub struct CompiledTemplate {
    /// Stable SHA-256 of the source text.
    pub id: String,
    pub source: String,
    /// The AST after compilation, with holes, aliases and values inlined.
    pub template: Template,
    pub entries: Vec<Entry>,
    /// Values bound by `name = value` declarations.
    pub resolved_variables: BTreeMap<String, Value>,
    /// Hole fillers that were actually used.
    pub fillers: BTreeMap<String, Value>,
}

pub struct Entry {
    pub line: u32,
    pub binding: Option<String>,
    pub node: CommandNode,
    pub command: Box<dyn Command>,
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("id", &self.id)
            .field("entries", &self.entries)
            .field("resolved_variables", &self.resolved_variables)
            .finish()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("line", &self.line)
            .field("binding", &self.binding)
            .field("node", &self.node.to_string())
            .finish()
    }
}

/// Per-compilation scratch state shared by the passes.
pub(crate) struct State {
    pub factory: Arc<dyn CommandFactory>,
    /// One instance per command statement, in statement order.
    pub commands: Vec<Box<dyn Command>>,
    pub fillers: BTreeMap<String, Value>,
    pub resolved_variables: BTreeMap<String, Value>,
}

pub fn template_id(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Parse and compile `source`.
pub fn compile(source: &str, env: &mut Env) -> Result<CompiledTemplate, Error> {
    let template = parse(source)?;
    compile_template(template, source, env)
}

pub fn compile_template(
    mut template: Template,
    source: &str,
    env: &mut Env,
) -> Result<CompiledTemplate, Error> {
    let factory = env
        .factory()
        .ok_or_else(|| Error::Compile("no command factory installed".into()))?;
    let mut state = State {
        factory,
        commands: Vec::new(),
        fillers: BTreeMap::new(),
        resolved_variables: BTreeMap::new(),
    };

    for (name, pass) in passes::PASSES {
        debug!(pass = name, "compile");
        pass(&mut template, env, &mut state)?;
    }

    let mut entries = Vec::with_capacity(state.commands.len());
    let mut commands = state.commands.into_iter();
    for stmt in &template.statements {
        if let Some(node) = stmt.node.command() {
            let command = commands
                .next()
                .ok_or_else(|| Error::Compile("command instances out of sync".into()))?;
            entries.push(Entry {
                line: stmt.line,
                binding: stmt.node.binding().map(str::to_string),
                node: node.clone(),
                command,
            });
        }
    }

    Ok(CompiledTemplate {
        id: template_id(source),
        source: source.to_string(),
        template,
        entries,
        resolved_variables: state.resolved_variables,
        fillers: state.fillers,
    })
}
