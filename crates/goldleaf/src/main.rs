mod cli;
mod paths;
mod run;

use std::path::Path;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => {
            handle_config_command(config_cmd.action, cli.run.config_path.as_deref())
        }
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    let paths = AppPaths::discover()?;

    match action {
        ConfigAction::Where => run_config_where(&paths, explicit),
        ConfigAction::Show { json } => run_config_show(&paths, explicit, json),
    }
}

fn run_config_where(paths: &AppPaths, explicit: Option<&Path>) -> Result<()> {
    let config_file = paths.resolve_config(explicit);
    println!("Configuration:");
    println!("  dir:     {}", paths.config_dir().display());
    println!(
        "  file:    {} ({})",
        config_file.display(),
        if config_file.exists() {
            "present"
        } else {
            "missing"
        }
    );
    Ok(())
}

fn run_config_show(paths: &AppPaths, explicit: Option<&Path>, json: bool) -> Result<()> {
    let config_file = paths.resolve_config(explicit);
    let config = run::load_config(&config_file)?;
    let rendered = if json {
        serde_json::to_string_pretty(&config).context("failed to serialize config to JSON")?
    } else {
        toml::to_string_pretty(&config).context("failed to serialize config to TOML")?
    };
    println!("{rendered}");
    Ok(())
}
