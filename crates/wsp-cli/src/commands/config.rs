//! Config command implementation.

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::style;

pub fn cmd_config(action: ConfigAction, no_color: bool) -> Result<()> {
    let path = Config::path();

    match action {
        ConfigAction::Show => {
            let config = Config::load();
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            if content.trim().is_empty() {
                println!("# {} (defaults)", path.display());
            } else {
                println!("# {}", path.display());
                print!("{}", content);
            }
        }
        ConfigAction::Get { key } => match Config::load().get(key) {
            Some(value) => println!("{}", value),
            None => bail!("{:?} is not set", key),
        },
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, &value)?;
            config.save()?;
            eprintln!(
                "{}",
                style::format_success(&format!("Set {:?} = {}", key, value), no_color)
            );
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            config.unset(key);
            config.save()?;
            eprintln!(
                "{}",
                style::format_success(&format!("Unset {:?}", key), no_color)
            );
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init => {
            if path.exists() {
                bail!("Config file already exists: {}", path.display());
            }
            Config::default().save()?;
            eprintln!(
                "{}",
                style::format_success(&format!("Created {}", path.display()), no_color)
            );
        }
    }

    Ok(())
}
