use std::path::{Path, PathBuf};

mod create;
mod delete;
mod init;
mod list;
mod status;
mod terminal;
mod update;

use clap::ArgAction;
use create::Create;
use delete::Delete;
use insure::{Config, EntityStore, HttpBackend};
use list::List;
use status::Status;
use update::Update;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "insure.toml", global = true)]
    config: PathBuf,

    /// Base URL of the records API (overrides the configuration file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = Config::load_or_default(&self.config);
        if let Some(url) = &self.api_url {
            config.set_api_url(url);
        }
        tracing::info!(api_url = config.api_url(), "using records API");

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&self.config, &config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show record counts and unresolved references (default)
    Status(Status),

    /// Write a default configuration file
    Init,

    /// List the records of a collection
    List(List),

    /// Create a record
    Create(Create),

    /// Edit a record, keeping any field that is not given
    Update(Update),

    /// Delete a record
    Delete(Delete),
}

impl Command {
    fn run(self, config_path: &Path, config: &Config) -> anyhow::Result<()> {
        let mut store = EntityStore::new(HttpBackend::from_config(config));
        match self {
            Self::Status(command) => command.run(&mut store)?,
            Self::Init => init::run(config_path, config)?,
            Self::List(command) => command.run(&mut store)?,
            Self::Create(command) => command.run(&mut store)?,
            Self::Update(command) => command.run(&mut store)?,
            Self::Delete(command) => command.run(&mut store, config)?,
        }
        Ok(())
    }
}
