use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use studypack_core::config::StudyConfig;

mod config;
mod error;
mod mcp;
mod pipeline;
mod prelude;
mod process;
mod session;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Split course PDFs into chapters and rank them by study priority"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Path to a TOML file with heading and scoring settings
    #[clap(long, env = "STUDYPACK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "STUDYPACK_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// The effective configuration: the `--config` file if given, else defaults.
    pub fn load_config(&self) -> Result<StudyConfig> {
        StudyConfig::load_or_default(self.config.as_deref()).wrap_err("Failed to load configuration")
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Rank the chapters of one or more PDFs by study priority
    Process(crate::process::App),

    /// Print the effective configuration as TOML
    Config(crate::config::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Process(sub_app) => crate::process::run(sub_app, app.global).await,
        SubCommands::Config(sub_app) => crate::config::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_command() {
        let app = App::try_parse_from(["studypack", "process", "a.pdf", "b.pdf", "--json"]).unwrap();
        assert!(matches!(app.command, SubCommands::Process(_)));
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let app =
            App::try_parse_from(["studypack", "config", "--config", "study.toml"]).unwrap();
        assert_eq!(app.global.config, Some(PathBuf::from("study.toml")));
    }

    #[test]
    fn test_process_requires_a_path() {
        assert!(App::try_parse_from(["studypack", "process"]).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let global = Global {
            config: Some(PathBuf::from("/nonexistent/study.toml")),
            verbose: false,
        };
        assert!(global.load_config().is_err());
    }

    #[test]
    fn test_no_config_file_uses_defaults() {
        let global = Global {
            config: None,
            verbose: false,
        };
        assert_eq!(global.load_config().unwrap(), StudyConfig::default());
    }
}
