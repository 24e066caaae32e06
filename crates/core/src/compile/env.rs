use std::collections::BTreeMap;
use std::sync::Arc;

use crate::factory::{current_factory, CommandFactory};
use crate::value::Value;

/// Answers a hole the fillers could not: `(hole, param paths) → value`.
pub type MissingHolesFn = Box<dyn FnMut(&str, &[String]) -> Option<Value> + Send>;

/// Resolves `@alias` for a parameter: `(entity, param, alias) → identifier`.
pub type AliasFn = Box<dyn Fn(&str, &str, &str) -> Option<String> + Send + Sync>;

/// Everything the compiler needs from outside the template text.
pub struct Env {
    factory: Option<Arc<dyn CommandFactory>>,
    /// Hole fillers keyed by hole name (e.g. `instance.type`).
    pub fillers: BTreeMap<String, Value>,
    /// Free variables for `{{ .AWLESS.name }}` expansion.
    pub variables: BTreeMap<String, String>,
    missing_holes: Option<MissingHolesFn>,
    alias: Option<AliasFn>,
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Env {
            factory: None,
            fillers: BTreeMap::new(),
            variables: BTreeMap::new(),
            missing_holes: None,
            alias: None,
        }
    }

    /// Use `factory` instead of the process-wide one.
    pub fn with_factory(mut self, factory: Arc<dyn CommandFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_fillers<I, K>(mut self, fillers: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.fillers
            .extend(fillers.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn with_variables<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_missing_holes(mut self, f: MissingHolesFn) -> Self {
        self.missing_holes = Some(f);
        self
    }

    pub fn with_alias_resolver(mut self, f: AliasFn) -> Self {
        self.alias = Some(f);
        self
    }

    pub(crate) fn factory(&self) -> Option<Arc<dyn CommandFactory>> {
        self.factory.clone().or_else(current_factory)
    }

    pub(crate) fn ask_missing(&mut self, hole: &str, paths: &[String]) -> Option<Value> {
        self.missing_holes.as_mut().and_then(|f| f(hole, paths))
    }

    pub(crate) fn resolve_alias(&self, entity: &str, param: &str, alias: &str) -> Option<String> {
        self.alias.as_ref().and_then(|f| f(entity, param, alias))
    }
}
