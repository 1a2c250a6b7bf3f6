//! Command handlers

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{RescaleOutcome, RescaleReport, RescaleRequest};
use crate::application::InvalidCountPolicy;
use crate::cli::args::{Cli, Commands, ConfigCommands, ScaleArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::Multiplier;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, Prompter, RealFileSystem};
use crate::infrastructure::InfraError;

/// Question asked when no `--multiplier` is given.
pub const MULTIPLIER_PROMPT: &str =
    "Enter the multiplier to adjust item and block counts by (e.g., 1.2 to increase by 20%):";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None => scale(&load_container()?, &ScaleArgs::default()).map(|_| ()),
        Some(Commands::Scale(args)) => scale(&load_container()?, args).map(|_| ()),
        Some(Commands::Config { command }) => config(command, &RealFileSystem),
        Some(Commands::Completion { shell }) => {
            completion(*shell);
            Ok(())
        }
    }
}

fn load_container() -> CliResult<ServiceContainer> {
    let settings = Settings::load()?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

/// Rescale the configured loot file and print the outcome.
///
/// Flags win over settings; a missing multiplier is asked for interactively.
#[instrument(skip(container))]
pub fn scale(container: &ServiceContainer, args: &ScaleArgs) -> CliResult<RescaleOutcome> {
    let multiplier = match args.multiplier {
        Some(multiplier) => multiplier,
        None => prompt_multiplier(container.prompter.as_ref())?,
    };
    let request = RescaleRequest {
        path: args
            .file
            .clone()
            .unwrap_or_else(|| container.settings.loot_file.clone()),
        multiplier,
        policy: args.on_invalid.unwrap_or(container.settings.on_invalid),
        dry_run: args.dry_run,
    };

    let outcome = container.rescale.rescale(&request)?;
    match &outcome {
        RescaleOutcome::FileMissing { path } => output::warning(&missing_file_message(path)),
        RescaleOutcome::Rescaled(report) => print_report(report, request.policy),
    }
    Ok(outcome)
}

fn prompt_multiplier(prompter: &dyn Prompter) -> CliResult<Multiplier> {
    let answer = prompter
        .ask(MULTIPLIER_PROMPT)
        .map_err(|e| InfraError::Prompt {
            message: e.to_string(),
        })?;
    answer
        .parse()
        .map_err(|e: crate::domain::DomainError| CliError::InvalidArgs(e.to_string()))
}

/// Warning shown when the loot file is not where it should be.
pub fn missing_file_message(path: &Path) -> String {
    format!(
        "The '{}' file does not exist. Make sure you are running from the mod's \
         directory and that the file structure is intact.",
        path.display()
    )
}

/// Confirmation shown after the rescaled file was written.
pub fn success_message(report: &RescaleReport) -> String {
    format!(
        "Item and block counts have been successfully adjusted by a factor of {} in '{}'.",
        report.multiplier,
        report.path.display()
    )
}

fn print_report(report: &RescaleReport, policy: InvalidCountPolicy) {
    if policy == InvalidCountPolicy::Warn {
        for invalid in &report.stats.invalid {
            output::warning(&format!(
                "kept invalid {} count {:?} near byte {}: {}",
                invalid.kind, invalid.value, invalid.position, invalid.reason
            ));
        }
    }

    let stats = &report.stats;
    if report.written {
        output::success(&success_message(report));
    } else {
        output::action(
            "Dry run",
            &format!(
                "{} counts would be adjusted by a factor of {} in '{}'",
                stats.rescaled(),
                report.multiplier,
                report.path.display()
            ),
        );
    }
    output::detail(&format!(
        "{} items, {} blocks in {} lootcontainers ({} left unchanged)",
        stats.items,
        stats.blocks,
        stats.containers,
        stats.invalid.len()
    ));
}

#[instrument(skip(fs))]
fn config(command: &ConfigCommands, fs: &dyn FileSystem) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            output::info(&require_global_config_path()?.display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = require_global_config_path()?;
            init_config(&path, *force, fs)
        }
    }
}

fn require_global_config_path() -> CliResult<std::path::PathBuf> {
    global_config_path()
        .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))
}

/// Write the settings template to `path`.
pub fn init_config(path: &Path, force: bool, fs: &dyn FileSystem) -> CliResult<()> {
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
