//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::application::InvalidCountPolicy;
use crate::domain::Multiplier;

/// Rescale item and block counts in 7 Days To Die loot.xml files
#[derive(Parser, Debug)]
#[command(name = "lootscale")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Without a command, behaves like `scale` and prompts for the multiplier
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Multiply every lootcontainer item/block count
    Scale(ScaleArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScaleArgs {
    /// Factor applied to every count, e.g. 1.2 for +20% (prompted when omitted)
    #[arg(short, long, allow_negative_numbers = true)]
    pub multiplier: Option<Multiplier>,

    /// Loot file to rewrite in place (default: settings `loot_file`)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Handling of counts that are neither `n` nor `min,max`
    #[arg(long, value_enum)]
    pub on_invalid: Option<InvalidCountPolicy>,

    /// Report what would change without writing the file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config path
    Path,

    /// Create global config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_scale_flags_when_parsing_then_fills_args() {
        let cli = Cli::try_parse_from([
            "lootscale",
            "-vv",
            "scale",
            "-m",
            "1.5",
            "--file",
            "Config/loot.xml",
            "--on-invalid",
            "warn",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Commands::Scale(args)) = cli.command else {
            panic!("expected scale command");
        };
        assert_eq!(args.multiplier.map(Multiplier::value), Some(1.5));
        assert_eq!(args.file, Some(PathBuf::from("Config/loot.xml")));
        assert_eq!(args.on_invalid, Some(InvalidCountPolicy::Warn));
        assert!(args.dry_run);
    }

    #[test]
    fn given_negative_multiplier_when_parsing_then_accepted() {
        let cli = Cli::try_parse_from(["lootscale", "scale", "-m", "-0.5"]).unwrap();
        let Some(Commands::Scale(args)) = cli.command else {
            panic!("expected scale command");
        };
        assert_eq!(args.multiplier.map(Multiplier::value), Some(-0.5));
    }

    #[test]
    fn given_non_numeric_multiplier_when_parsing_then_rejected() {
        assert!(Cli::try_parse_from(["lootscale", "scale", "-m", "lots"]).is_err());
        assert!(Cli::try_parse_from(["lootscale", "scale", "-m", "inf"]).is_err());
    }

    #[test]
    fn given_no_command_when_parsing_then_command_is_none() {
        let cli = Cli::try_parse_from(["lootscale"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }
}
