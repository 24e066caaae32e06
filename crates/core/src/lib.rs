#![allow(clippy::result_large_err)]
//! stratus-core: the Stratus template language.
//!
//! A template is a sequence of `action entity key=value` commands against a
//! cloud provider. This crate parses templates, compiles them against a
//! [`CommandFactory`], runs them (live or dry) and records the outcome as an
//! [`Execution`] that can later be reverted.
//!
//! # Public API
//!
//! - [`parse()`] -- template text to [`Template`]
//! - [`compile()`] -- template text plus [`Env`] to a [`CompiledTemplate`]
//! - [`run()`] -- execute a compiled template, returning an [`Execution`]
//! - [`revert()`] -- the inverse template of an execution
//! - [`Rule`] and [`Validators`] -- the parameter contract of a [`Command`]
//! - [`Docs`] -- per-command documentation lookups

pub mod ast;
pub mod command;
pub mod compile;
pub mod docs;
pub mod error;
pub mod execution;
pub mod factory;
pub mod lexer;
pub mod params;
pub mod parser;
pub mod poll;
pub mod printer;
pub mod revert;
pub mod runner;
pub mod value;

#[cfg(test)]
mod testing;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{CommandNode, ParamValue, Template};
pub use command::{fake_dry_run_id, CancellationToken, Command, RunContext};
pub use compile::{CompiledTemplate, Env};
pub use docs::Docs;
pub use error::{CommandError, Error, ParseError, ProviderError};
pub use execution::{CommandRecord, Execution, ExecutionMeta, ExecutionStats, ExecutionStatus};
pub use factory::{current_factory, set_factory, swap_factory, CommandFactory, FactoryGuard};
pub use params::{Rule, RuleError, SuggestMode, ValidationError, Validators};
pub use value::{Injector, ParamMap, Value};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::compile;
pub use parser::parse;
pub use revert::{revert, revert_source};
pub use runner::{run, RunOptions};
