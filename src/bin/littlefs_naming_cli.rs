//! LittleFS Naming CLI - Bridge interface for the UI build scripts
//!
//! Commands: normalize, check, plugins
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 under --strict when diagnostics carry warnings

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use littlefs_naming::{
    logging::{init_logging, Verbosity},
    validation::has_warnings,
    BuildConfig, BuildPipeline, Command, ConfigEnv,
};

#[derive(Parser)]
#[command(name = "littlefs-naming-cli")]
#[command(about = "Rewrite bundler output names for LittleFS images", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CommandArg {
    Serve,
    Build,
}

impl CommandArg {
    fn env(self) -> ConfigEnv {
        match self {
            CommandArg::Serve => ConfigEnv::serve(),
            CommandArg::Build => ConfigEnv::build(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the config phase and print the rewritten config
    Normalize {
        /// Build config JSON file
        #[arg(short, long)]
        config: PathBuf,

        /// Host command the config phase runs for
        #[arg(long, value_enum, default_value = "build")]
        command: CommandArg,

        /// Print {"config", "report"} instead of the bare config
        #[arg(long)]
        report: bool,

        /// Exit 2 when diagnostics carry warnings
        #[arg(long)]
        strict: bool,
    },

    /// Print naming diagnostics for a production build of the config
    Check {
        /// Build config JSON file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List plugins in run order
    Plugins {
        #[arg(long, value_enum, default_value = "build")]
        command: CommandArg,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.verbose));

    match cli.command {
        Commands::Normalize { config, command, report, strict } => {
            let mut build_config = match BuildConfig::load_from_path(&config) {
                Ok(c) => c,
                Err(e) => return print_error(&e.to_string()),
            };

            let pipeline = BuildPipeline::littlefs(command.env());
            let build_report = match pipeline.run_config(&mut build_config) {
                Ok(r) => r,
                Err(e) => return print_error(&e.to_string()),
            };

            let output = if report {
                serde_json::json!({ "config": build_config, "report": build_report })
            } else {
                match serde_json::to_value(&build_config) {
                    Ok(v) => v,
                    Err(e) => return print_error(&e.to_string()),
                }
            };
            print_json(&output);

            if strict && has_warnings(&build_report.diagnostics) {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }

        Commands::Check { config } => {
            let mut build_config = match BuildConfig::load_from_path(&config) {
                Ok(c) => c,
                Err(e) => return print_error(&e.to_string()),
            };

            match BuildPipeline::littlefs(ConfigEnv::build()).run_config(&mut build_config) {
                Ok(report) => {
                    print_json(&serde_json::json!({
                        "command": Command::Build,
                        "naming_changed": report.naming_changed(),
                        "diagnostics": report.diagnostics,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => print_error(&e.to_string()),
            }
        }

        Commands::Plugins { command } => {
            let pipeline = BuildPipeline::littlefs(command.env());
            print_json(&serde_json::json!({
                "command": pipeline.env().command,
                "plugins": pipeline.plugin_names(),
            }));
            ExitCode::SUCCESS
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to encode output: {}", e),
    }
}

fn print_error(message: &str) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": message,
    });
    println!("{}", output);
    ExitCode::FAILURE
}
