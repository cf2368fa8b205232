//! The `tutor config` command for configuration management.

use clap::{Args, Subcommand, ValueEnum};
use std::path::Path;
use tutor_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key in the config file
    SetKey {
        /// Service the key belongs to
        #[arg(value_enum)]
        service: Service,

        /// The key itself, or an ${ENV_VAR} reference
        key: String,
    },
}

/// Hosted services that take a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    Ocr,
    Inference,
    Chat,
}

impl Service {
    fn section(self) -> &'static str {
        match self {
            Service::Ocr => "ocr",
            Service::Inference => "inference",
            Service::Chat => "chat",
        }
    }
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let toml = config.to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = Config::default().to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { service, key } => {
            let path = Config::default_path();
            save_key(&path, service, &key)?;
            println!(
                "Saved {} API key to {}",
                service.section(),
                path.display()
            );
        }
    }

    Ok(())
}

/// Write `[<service>].api_key` into the config file, keeping everything else
/// (comments included) intact. Creates the file if needed.
fn save_key(path: &Path, service: Service, key: &str) -> anyhow::Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc: toml_edit::DocumentMut = content.parse()?;
    let section = service.section();
    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section]["api_key"] = toml_edit::value(key);

    // Refuse to write something the loader would reject.
    Config::from_toml(&doc.to_string())?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    Ok(())
}
