//! Subcommand implementations. Each `cmd_*` returns the process exit code.

pub(crate) mod config;
pub(crate) mod help;
pub(crate) mod log;
pub(crate) mod run;

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use stratus_aws::{Apis, AwsFactory, HttpTransport};
use stratus_core::{set_factory, Env, ExecutionMeta, Value};
use stratus_storage::FileStorage;
use tracing::debug;

use crate::config::Config;
use crate::OutputFormat;

/// State shared by every subcommand.
pub(crate) struct Context {
    pub config: Config,
    pub storage: FileStorage,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub async fn new(mut config: Config, output: OutputFormat, quiet: bool) -> Result<Self, String> {
        let storage = FileStorage::new(config.history_dir());
        config.apply_overrides(&storage).await?;
        stratus_aws::keygen::set_keys_dir(config.keys_dir());
        Ok(Context {
            config,
            storage,
            output,
            quiet,
        })
    }

    /// Install the AWS factory. A live run needs a gateway endpoint; dry
    /// runs and documentation never reach the transport.
    pub fn install_factory(&self, live: bool) -> Result<(), String> {
        let endpoint = match (&self.config.aws.endpoint, live) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, false) => String::new(),
            (None, true) => {
                return Err(
                    "no provider endpoint configured: set [aws] endpoint or run \
                     `stratus config set aws.endpoint URL`"
                        .to_string(),
                )
            }
        };
        let mut transport = HttpTransport::new(endpoint, self.config.region());
        if let Some(profile) = &self.config.aws.profile {
            transport = transport.with_profile(profile.clone());
        }
        debug!(region = %transport.region(), live, "installing aws factory");
        set_factory(Arc::new(AwsFactory::new(Apis::from_transport(Arc::new(
            transport,
        )))));
        Ok(())
    }

    /// Compilation environment: configured fillers and aliases, plus an
    /// interactive prompt for unfilled holes when stdin is a terminal.
    pub fn env(&self) -> Env {
        let aliases = self.config.clone();
        let mut env = Env::new()
            .with_fillers(self.config.fillers())
            .with_alias_resolver(Box::new(move |entity: &str, _param: &str, alias: &str| {
                aliases.alias(entity, alias)
            }));
        if std::io::stdin().is_terminal() {
            env = env.with_missing_holes(Box::new(prompt_hole));
        }
        env
    }

    pub fn meta(&self, message: String) -> ExecutionMeta {
        ExecutionMeta {
            author: std::env::var("USER").unwrap_or_default(),
            profile: self.config.profile(),
            region: self.config.region(),
            locale: std::env::var("LANG").unwrap_or_default(),
            message,
        }
    }

    pub fn report(&self, msg: &str) {
        crate::report_error(msg, self.output, self.quiet);
    }
}

fn prompt_hole(hole: &str, paths: &[String]) -> Option<Value> {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "{} ({}): ", hole, paths.join(", "));
    let _ = stderr.flush();
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    let answer = line.trim();
    if answer.is_empty() {
        return None;
    }
    if answer.contains(',') {
        Some(Value::list(answer.split(',').map(str::trim)))
    } else {
        Some(Value::str(answer))
    }
}
