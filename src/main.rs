//! Binary entry point for postforge.
//!
//! This binary provides the CLI interface for seed management and prompt
//! resolution.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use postforge::cli::{
    ConfigCommand, DiagnosticsCommand, PromptCommand, ResolveArgs, SeedCommand, open_repository,
};
use postforge::config::PostforgeConfig;
use postforge::observability::{self, InitOptions};
use postforge::{PromptResolver, PromptType};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Postforge - prompt resolution for a post-writing assistant.
#[derive(Parser)]
#[command(name = "postforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "POSTFORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Manage prompt seed files.
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },

    /// Inspect and resolve prompts.
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },

    /// Print engine diagnostics as JSON.
    Diagnostics {
        /// User id.
        #[arg(short, long)]
        user: String,
    },

    /// Print the effective configuration.
    Config,
}

/// Seed subcommands.
#[derive(Subcommand)]
enum SeedAction {
    /// Parse a seed directory and report what loads.
    Check {
        /// Seed directory (default: configured `seed_dir`).
        dir: Option<PathBuf>,
    },

    /// Synchronise a seed directory into a user's prompts.
    Sync {
        /// Seed directory (default: configured `seed_dir`).
        dir: Option<PathBuf>,

        /// Owner of the synchronised prompts.
        #[arg(short, long)]
        user: String,
    },
}

/// Prompt subcommands.
#[derive(Subcommand)]
enum PromptAction {
    /// List a user's prompts.
    List {
        /// User id.
        #[arg(short, long)]
        user: String,
    },

    /// Resolve a prompt and print the final text.
    Resolve {
        /// User id.
        #[arg(short, long)]
        user: String,

        /// Prompt name.
        #[arg(short, long)]
        name: String,

        /// Prompt type: ideas or drafts.
        #[arg(short = 't', long = "type", value_parser = parse_prompt_type)]
        prompt_type: PromptType,

        /// Topic name (ideas).
        #[arg(long)]
        topic: Option<String>,

        /// Number of ideas to request (ideas).
        #[arg(long, default_value = "5")]
        ideas: u32,

        /// Related topics, comma-separated (ideas).
        #[arg(long, value_delimiter = ',')]
        related: Vec<String>,

        /// Idea content (drafts).
        #[arg(long)]
        idea: Option<String>,

        /// User email.
        #[arg(long, default_value = "")]
        email: String,

        /// User industry.
        #[arg(long)]
        industry: Option<String>,

        /// User role.
        #[arg(long)]
        role: Option<String>,

        /// User expertise.
        #[arg(long)]
        expertise: Option<String>,

        /// Preferred tone.
        #[arg(long)]
        tone: Option<String>,
    },
}

fn parse_prompt_type(s: &str) -> Result<PromptType, String> {
    PromptType::parse(s).ok_or_else(|| format!("unknown prompt type '{s}' (expected ideas or drafts)"))
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = PostforgeConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let _observability = observability::init_from_config(
        &config,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: true,
        },
    )
    .context("initializing observability")?;

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Seed { action } => match action {
            SeedAction::Check { dir } => {
                let dir = seed_dir(dir, &config)?;
                let rejected = SeedCommand::check(&dir, &mut out)?;
                if rejected > 0 {
                    return Ok(ExitCode::from(2));
                }
            },
            SeedAction::Sync { dir, user } => {
                let dir = seed_dir(dir, &config)?;
                let repository = open_repository(&config)?;
                SeedCommand::sync(repository.as_ref(), &dir, &user, &mut out)?;
            },
        },
        Commands::Prompt { action } => match action {
            PromptAction::List { user } => {
                let repository = open_repository(&config)?;
                PromptCommand::list(repository.as_ref(), &user, &mut out)?;
            },
            PromptAction::Resolve {
                user,
                name,
                prompt_type,
                topic,
                ideas,
                related,
                idea,
                email,
                industry,
                role,
                expertise,
                tone,
            } => {
                let resolver = PromptResolver::from_config(open_repository(&config)?, &config.engine);
                let args = ResolveArgs {
                    user_id: user,
                    name,
                    prompt_type,
                    topic,
                    ideas,
                    related,
                    idea,
                    email,
                    industry,
                    role,
                    expertise,
                    tone,
                };
                PromptCommand::resolve(&resolver, &args, &mut out)?;
            },
        },
        Commands::Diagnostics { user } => {
            let resolver = PromptResolver::from_config(open_repository(&config)?, &config.engine);
            DiagnosticsCommand::run(&resolver, &user, &mut out)?;
        },
        Commands::Config => ConfigCommand::show(&config, &mut out)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn seed_dir(dir: Option<PathBuf>, config: &PostforgeConfig) -> anyhow::Result<PathBuf> {
    dir.or_else(|| config.seed_dir.clone())
        .context("no seed directory given and no seed_dir configured")
}
