//! Command dispatch: resolve arguments, wire services, print results

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{TransferOptions, TransferReport};
use crate::application::AnnotationError;
use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{is_expression, parse_expression};
use crate::infrastructure::ServiceContainer;

const UNRESOLVED_PATHS: &str =
    "unable to determine source and target SVG paths from the provided arguments";

/// Execute the action selected by `cli`.
#[instrument(skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }
    if cli.show_config {
        return show_config();
    }
    if let Some(path) = &cli.list_groups {
        return list_groups(path);
    }

    let (source, target) = resolve_paths(cli)?;
    let options = TransferOptions {
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
        dry_run: cli.dry_run,
    };
    transfer(&source, &target, &options)
}

/// Determine source and target from `--expr`, then `--source`/`--target`, then positionals.
pub fn resolve_paths(cli: &Cli) -> CliResult<(PathBuf, PathBuf)> {
    if let Some(expr) = &cli.expr {
        return parse_expression(expr).map_err(|e| AnnotationError::from(e).into());
    }
    if let (Some(source), Some(target)) = (&cli.source, &cli.target) {
        return Ok((source.clone(), target.clone()));
    }
    match cli.paths.as_slice() {
        [single] => match single.to_str().filter(|s| is_expression(s)) {
            Some(expr) => parse_expression(expr).map_err(|e| AnnotationError::from(e).into()),
            None => Err(CliError::Usage(UNRESOLVED_PATHS.into())),
        },
        [source, target] => Ok((source.clone(), target.clone())),
        _ => Err(CliError::Usage(UNRESOLVED_PATHS.into())),
    }
}

/// Directory whose `.annotransfer.toml` applies to `path`.
fn document_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn show_config() -> CliResult<()> {
    let settings = Settings::load(None)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

#[instrument]
fn list_groups(path: &Path) -> CliResult<()> {
    let settings = Settings::load(Some(document_dir(path)))?;
    let container = ServiceContainer::new(settings);
    let ids = container.transfer.list_overlay_groups(path)?;
    if ids.is_empty() {
        output::info("No candidate annotation groups found.");
    }
    for id in &ids {
        output::info(id);
    }
    Ok(())
}

#[instrument]
fn transfer(source: &Path, target: &Path, options: &TransferOptions) -> CliResult<()> {
    let settings = Settings::load(Some(document_dir(target)))?;
    let container = ServiceContainer::new(settings);
    let report = container
        .transfer
        .copy_annotations(source, target, options)?;
    debug!("transfer: {:?}", report);

    match summarize(&report, options.dry_run) {
        Summary::Copied(ids) => output::action("Copied groups", &ids),
        Summary::WouldCopy(ids) => output::dry_run(&format!("would copy groups: {ids}")),
        Summary::DefinitionsUpdated(ids) => output::action("Updated definitions", &ids),
        Summary::WouldUpdateDefinitions(ids) => {
            output::dry_run(&format!("would update definitions: {ids}"))
        }
        Summary::Unchanged => output::info(
            "No changes were necessary; target SVG already contains the requested annotations.",
        ),
    }
    Ok(())
}

/// What a transfer did to the target, as reported to the user.
#[derive(Debug, PartialEq, Eq)]
enum Summary {
    Copied(String),
    WouldCopy(String),
    DefinitionsUpdated(String),
    WouldUpdateDefinitions(String),
    Unchanged,
}

fn summarize(report: &TransferReport, dry_run: bool) -> Summary {
    let groups = report.copied.join(", ");
    let definitions = report.definitions.join(", ");
    match (report.copied.is_empty(), report.definitions.is_empty(), dry_run) {
        (false, _, false) => Summary::Copied(groups),
        (false, _, true) => Summary::WouldCopy(groups),
        (true, false, false) => Summary::DefinitionsUpdated(definitions),
        (true, false, true) => Summary::WouldUpdateDefinitions(definitions),
        (true, true, _) => Summary::Unchanged,
    }
}
