//! The command descriptor contract every provider verb implements.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;

use crate::ast::command_key;
use crate::error::{CommandError, Error};
use crate::params::{Rule, Validators};
use crate::value::ParamMap;

/// Shared flag flipped by the caller to stop a template between commands.
pub type CancellationToken = Arc<AtomicBool>;

/// Per-run context handed to [`Command::run`].
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub cancel: CancellationToken,
}

impl RunContext {
    pub fn new(cancel: CancellationToken) -> Self {
        RunContext { cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// A provider verb over one resource kind.
///
/// Instances are built fresh per template statement by the factory, which
/// also binds the provider handle. The runner then calls [`inject`] with the
/// fully resolved parameters followed by either [`dry_run`] or [`run`].
///
/// [`inject`]: Command::inject
/// [`dry_run`]: Command::dry_run
/// [`run`]: Command::run
#[async_trait]
pub trait Command: Send + Sync {
    fn action(&self) -> &'static str;

    fn entity(&self) -> &'static str;

    fn key(&self) -> String {
        command_key(self.action(), self.entity())
    }

    fn params_rule(&self) -> Rule;

    fn validators(&self) -> Validators {
        Validators::new()
    }

    /// Names the provider handle the factory must bind (e.g. `ec2`).
    fn handle_kind(&self) -> &'static str;

    /// Whether a successful run yields a value that can be bound to a name.
    fn returns_result(&self) -> bool {
        true
    }

    /// Values applied at compile time for absent optional parameters.
    fn defaults(&self) -> ParamMap {
        ParamMap::new()
    }

    /// Parameters whose value is a file path, URL or inline content to read
    /// at compile time.
    fn file_params(&self) -> &'static [&'static str] {
        &[]
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError>;

    /// Check `keys` against the rule, then run the validators over `values`.
    ///
    /// `values` may be a subset of `keys`: parameters still waiting on a
    /// reference are shape-checked but not validated.
    fn validate(&self, keys: &[String], values: &ParamMap) -> Result<(), Error> {
        let command = format!("{} {}", self.action(), self.entity());
        self.params_rule()
            .run(keys)
            .map_err(|source| Error::Rule {
                command: command.clone(),
                source,
            })?;
        self.validators()
            .validate(values)
            .map_err(|source| Error::Validation { command, source })
    }

    /// Return the identifier a run would produce without calling the
    /// provider.
    async fn dry_run(&mut self) -> Result<String, CommandError> {
        Ok(fake_dry_run_id(self.entity()))
    }

    async fn run(&mut self, ctx: &RunContext) -> Result<String, CommandError>;

    /// Whether a run failure stops the template.
    fn is_fatal(&self, _err: &CommandError) -> bool {
        true
    }
}

/// A plausible identifier for `entity`, used by dry runs.
pub fn fake_dry_run_id(entity: &str) -> String {
    let prefix = match entity {
        "instance" => "i-",
        "subnet" => "subnet-",
        "vpc" => "vpc-",
        "volume" => "vol-",
        "securitygroup" => "sg-",
        "internetgateway" => "igw-",
        "routetable" => "rtb-",
        _ => "dryrunid-",
    };
    format!("{}{}", prefix, rand::thread_rng().gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_ids_are_prefixed() {
        assert!(fake_dry_run_id("instance").starts_with("i-"));
        assert!(fake_dry_run_id("routetable").starts_with("rtb-"));
        assert!(fake_dry_run_id("internetgateway").starts_with("igw-"));
        let id = fake_dry_run_id("bucket");
        let n: u32 = id.trim_start_matches("dryrunid-").parse().unwrap();
        assert!(n < 1_000_000);
    }

    #[test]
    fn cancel_is_shared() {
        let ctx = RunContext::default();
        let other = ctx.clone();
        assert!(!other.is_cancelled());
        ctx.cancel();
        assert!(other.is_cancelled());
    }
}
