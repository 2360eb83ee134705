use crate::prelude::{println, *};
use studypack_core::config::StudyConfig;

#[derive(Debug, clap::Parser)]
#[command(name = "config")]
#[command(about = "Print the effective configuration as TOML")]
pub struct App {
    /// Print the built-in defaults and ignore --config
    #[arg(long)]
    defaults: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = if app.defaults {
        StudyConfig::default()
    } else {
        global.load_config()?
    };

    if global.verbose {
        match &global.config {
            Some(path) if !app.defaults => println!("# loaded from {}", path.display()),
            _ => println!("# built-in defaults"),
        }
    }

    println!("{}", config.to_toml_string()?);
    Ok(())
}
