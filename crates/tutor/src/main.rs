//! Tutor CLI - answers physics, chemistry and mathematics questions.
//!
//! Questions can be typed or read from a photo (OCR). Answers come from a
//! hosted inference service; rate limits are retried with backoff.
//!
//! # Usage
//!
//! ```bash
//! # Ask a typed question
//! tutor ask --subject physics "What is Newton's second law?"
//!
//! # Ask from a photo of the question
//! tutor ask --subject chemistry --image ~/Pictures/question.jpg
//!
//! # Talk to the virtual consultant
//! tutor chat
//!
//! # View configuration
//! tutor config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Tutor - answers subject questions, typed or photographed.
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question and print the answer
    Ask(cli::ask::AskArgs),

    /// Chat with the virtual consultant
    Chat(cli::chat::ChatArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match tutor_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tutor config path`."
            );
            tutor_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tutor v{}", tutor_core::VERSION);

    match cli.command {
        Commands::Ask(args) => cli::ask::execute(args, &config).await,
        Commands::Chat(args) => cli::chat::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["tutor", "ask", "-s", "physics", "q", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Ask(_)));
    }

    #[test]
    fn set_key_parses_service() {
        let cli = Cli::parse_from(["tutor", "config", "set-key", "inference", "abc"]);
        match cli.command {
            Commands::Config(args) => assert!(matches!(
                args.command,
                cli::config::ConfigCommand::SetKey {
                    service: cli::config::Service::Inference,
                    ..
                }
            )),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
