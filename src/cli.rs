use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::PortalConfig;
use crate::error::ConfigError;

#[derive(Parser)]
#[command(name = "edu-portal")]
#[command(version)]
#[command(about = "Take quizzes and chat with the AI tutor from the terminal")]
pub struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Portal server base URL (overrides config and EDU_PORTAL_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Answer one quiz question
    Quiz {
        /// Server id of the question
        #[arg(long)]
        question_id: String,

        /// 1-based position of the question in the quiz
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        question_num: u32,

        /// Number of questions in the quiz
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        total: u32,

        /// Hints already used on this question
        #[arg(long, default_value = "0")]
        hints_used: u32,
    },
    /// Chat with the AI tutor
    Chat {
        /// Server id of the open chat session
        #[arg(long)]
        session_id: String,
    },
    /// Show score history, trend and chart config
    Progress {
        #[arg(long)]
        student_id: String,

        /// Canvas id the chart config is addressed to
        #[arg(long, default_value = "progressChart")]
        canvas: String,

        /// Follow a recommendation (take_quiz, study_material, get_help)
        #[arg(long)]
        follow: Option<String>,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Args {
    /// Cross-argument checks clap cannot express per flag.
    pub fn check(&self) -> Result<(), clap::Error> {
        if let Command::Quiz {
            question_num, total, ..
        } = &self.command
        {
            if question_num > total {
                return Err(Args::command().error(
                    ErrorKind::ValueValidation,
                    format!("--question-num {question_num} is past --total {total}"),
                ));
            }
        }
        Ok(())
    }
}

/// Load the config file (if any) and apply the `--base-url` override.
pub fn resolve_config(args: &Args) -> Result<PortalConfig, ConfigError> {
    let mut cfg = PortalConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.base_url {
        cfg.base_url = url.clone();
        cfg.validate()?;
    }
    Ok(cfg)
}
