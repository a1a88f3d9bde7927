use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "goldleaf",
    author,
    version,
    about = "Scroll-synced backdrop with a liquid-gold shader overlay",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Show config to load instead of the discovered `goldleaf.toml`.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_path: Option<PathBuf>,

    /// Window size, or still-export size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0=uncapped); overrides `window.fps`.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Treat the viewport as constrained and skip the shader overlay.
    #[arg(long)]
    pub constrained: bool,

    /// Render the overlay on the CPU to the given image path and exit.
    #[arg(long, value_name = "PATH")]
    pub still_export: Option<PathBuf>,

    /// Animation time (seconds) evaluated by `--still-export`.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, requires = "still_export")]
    pub still_time: f32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the show configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config directory and the config file that would be loaded.
    Where,
    /// Print the resolved show configuration.
    Show {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "goldleaf",
            "--config",
            "show.toml",
            "--size",
            "800x600",
            "--fps",
            "30",
            "--constrained",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.config_path, Some(PathBuf::from("show.toml")));
        assert_eq!(cli.run.size.as_deref(), Some("800x600"));
        assert_eq!(cli.run.fps, Some(30.0));
        assert!(cli.run.constrained);
    }

    #[test]
    fn still_time_requires_export_path() {
        assert!(Cli::try_parse_from(["goldleaf", "--still-time", "2"]).is_err());
        let cli =
            Cli::try_parse_from(["goldleaf", "--still-export", "out.png", "--still-time", "2.5"])
                .unwrap();
        assert_eq!(cli.run.still_time, 2.5);
    }

    #[test]
    fn config_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["goldleaf", "config", "show", "--json", "--config", "a.toml"])
            .unwrap();
        assert_eq!(cli.run.config_path, Some(PathBuf::from("a.toml")));
        match cli.command {
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Show { json },
            })) => assert!(json),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
