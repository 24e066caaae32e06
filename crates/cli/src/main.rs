mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::commands::Context;
use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Stratus cloud templates.
#[derive(Parser)]
#[command(
    name = "stratus",
    version,
    about = "Run, dry-run, revert and inspect cloud templates",
    disable_help_subcommand = true
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Configuration file (default: $STRATUS_HOME/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a template against the provider and record the execution
    Run {
        /// Template file, or `-` for stdin
        template: PathBuf,
        /// Free variable for `{{ .AWLESS.name }}` expansion
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        /// Message stored with the execution
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Compile and dry-run a template without calling the provider
    DryRun {
        /// Template file, or `-` for stdin
        template: PathBuf,
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Revert a recorded execution
    Revert {
        /// Execution id, as shown by `stratus log`
        id: String,
        /// Print and dry-run the reverse template only
        #[arg(long)]
        dry_run: bool,
    },

    /// List recorded executions, most recent first
    Log {
        /// Show a single execution
        id: Option<String>,
        /// Maximum number of executions (0 = all)
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only executions with a failed command
        #[arg(long)]
        errors: bool,
        /// Only executions of this template id
        #[arg(long)]
        template: Option<String>,
    },

    /// Print the source of a recorded execution
    Show {
        id: String,
    },

    /// Command documentation: `help`, `help create`, `help create instance`
    Help {
        action: Option<String>,
        entity: Option<String>,
    },

    /// Read or write stored configuration values
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective value of `scope.key`
    Get { key: String },
    /// Store `value` under `scope.key`
    Set { key: String, value: String },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e, cli.output, cli.quiet),
    };
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(&format!("failed to create tokio runtime: {}", e), cli.output, cli.quiet),
    };
    let ctx = match rt.block_on(Context::new(config, cli.output, cli.quiet)) {
        Ok(ctx) => ctx,
        Err(e) => fail(&e, cli.output, cli.quiet),
    };

    let code = rt.block_on(async {
        match cli.command {
            Commands::Run {
                template,
                vars,
                message,
            } => commands::run::cmd_run(&ctx, &template, &vars, message, false).await,
            Commands::DryRun { template, vars } => {
                commands::run::cmd_run(&ctx, &template, &vars, None, true).await
            }
            Commands::Revert { id, dry_run } => commands::run::cmd_revert(&ctx, &id, dry_run).await,
            Commands::Log {
                id,
                limit,
                errors,
                template,
            } => commands::log::cmd_log(&ctx, id.as_deref(), limit, errors, template).await,
            Commands::Show { id } => commands::log::cmd_show(&ctx, &id).await,
            Commands::Help { action, entity } => {
                commands::help::cmd_help(&ctx, action.as_deref(), entity.as_deref())
            }
            Commands::Config { command } => match command {
                ConfigCommands::Get { key } => commands::config::cmd_config_get(&ctx, &key).await,
                ConfigCommands::Set { key, value } => {
                    commands::config::cmd_config_set(&ctx, &key, &value).await
                }
            },
        }
    });
    process::exit(code);
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
