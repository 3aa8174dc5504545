//! Implementation of the `kiln new` command.
//!
//! Responsibility: translate CLI arguments and configuration into a
//! `ScaffoldRequest`, pick a collision resolver, call the core scaffold
//! service, and display results. No business logic lives here.

use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
};

use serde_json::json;
use tracing::{debug, info, instrument};

use kiln_adapters::{FsSkeletonLoader, LocalFilesystem};
use kiln_core::{
    application::{CollisionResolver, ScaffoldRequest, ScaffoldService},
    domain::{ProcessorRegistry, ProjectVariables, VariableMap},
};

use crate::{
    cli::{NewArgs, OutputFormat},
    commands::template_locator,
    config::AppConfig,
    error::{CliError, CliResult, partial_output_hint},
    output::OutputManager,
    prompt::{DiffViewer, FixedAnswer, InteractiveResolver},
};

/// Execute the `kiln new` command.
///
/// Dispatch sequence:
/// 1. Validate the package name and work out the target directory
/// 2. Early-exit with the resolved include list if `--dry-run`
/// 3. Collect description and summary (flags, else prompt, else empty)
/// 4. Merge configured and command-line variables into the request
/// 5. Scaffold with the collision policy chosen by `--yes`/`--no-clobber`
/// 6. Print the per-file report and next steps
#[instrument(skip_all, fields(package = %args.name))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    validate_package_name(&args.name)?;
    let target = target_dir(&args);
    let template = args
        .template
        .clone()
        .unwrap_or_else(|| config.default_template.clone());

    let service = ScaffoldService::new(
        Box::new(template_locator(&config)),
        Box::new(FsSkeletonLoader::new()),
        Box::new(LocalFilesystem::new()),
        ProcessorRegistry::with_builtins(),
    );

    if args.dry_run {
        return dry_run(&service, &template, &target, &output);
    }

    let can_prompt = !args.yes && !output.is_quiet() && io::stdin().is_terminal();
    let description = ask_or_default(args.description.clone(), "Package description", can_prompt)?;
    let summary = ask_or_default(args.summary.clone(), "Package summary", can_prompt)?;

    let project = ProjectVariables::new(&args.name)
        .description(description)
        .summary(summary);
    let request = ScaffoldRequest::new(&template, &target, project)
        .path_variables(&path_variables(&args, &config))
        .content_variables(&content_variables(&args, &config));

    output.header(&format!("Creating '{}' in {}", args.name, target.display()))?;
    output.info(&format!("Using the '{template}' template"))?;
    info!(template = %template, target = %target.display(), "Scaffold started");

    let mut resolver = collision_resolver(&args, &config);
    let report = match service.scaffold(&request, resolver.as_mut()) {
        Ok(report) => report,
        Err(e) => {
            let err = CliError::from(e);
            if let Some(hint) = partial_output_hint(&err, &target) {
                output.warning(&hint)?;
            }
            return Err(err);
        }
    };

    info!(written = report.written(), "Scaffold completed");
    output.report(&report)?;

    if report.is_noop() {
        output.info("Nothing changed")?;
    } else {
        output.success(&format!("Package '{}' created!", args.name))?;
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", target.display()))?;
    }

    Ok(())
}

// ── Request construction ──────────────────────────────────────────────────────

fn target_dir(args: &NewArgs) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&args.name)
}

fn validate_package_name(name: &str) -> CliResult<()> {
    let invalid = |reason: &str| {
        Err(CliError::InvalidPackageName {
            name: name.into(),
            reason: reason.into(),
        })
    };

    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.starts_with('.') {
        return invalid("name cannot start with '.'");
    }
    if name.contains('/') || name.contains('\\') {
        return invalid("name cannot contain path separators");
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return invalid("name cannot contain whitespace");
    }
    Ok(())
}

/// Configured path variables, overridden by `--path-var`.
fn path_variables(args: &NewArgs, config: &AppConfig) -> VariableMap {
    let mut vars = config.path_variables();
    vars.extend(args.path_vars.iter().cloned());
    vars
}

/// Configured content variables, overridden by `--var`.
fn content_variables(args: &NewArgs, config: &AppConfig) -> VariableMap {
    let mut vars = config.content_variables();
    vars.extend(args.vars.iter().cloned());
    // Bundled templates credit the author.
    if vars.get("author").is_none() {
        debug!("No author configured");
        vars.insert("author", "");
    }
    vars
}

fn collision_resolver(args: &NewArgs, config: &AppConfig) -> Box<dyn CollisionResolver> {
    if args.yes {
        Box::new(FixedAnswer(true))
    } else if args.no_clobber {
        Box::new(FixedAnswer(false))
    } else {
        // Prompts go to stderr so stdout stays clean for the report.
        Box::new(
            InteractiveResolver::new(
                io::stdin().lock(),
                io::stderr(),
                DiffViewer::new(config.diff_tool.clone()),
            )
            .auto_diff(config.auto_diff),
        )
    }
}

// ── Dry run ───────────────────────────────────────────────────────────────────

fn dry_run(
    service: &ScaffoldService,
    template: &str,
    target: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    let resolved = service.plan(template)?;

    if output.format() == OutputFormat::Json {
        output.json(&json!({
            "target": target.display().to_string(),
            "templates": resolved.names(),
        }))?;
        return Ok(());
    }

    output.info(&format!(
        "Dry run: would create {} from these templates, in order:",
        target.display()
    ))?;
    for skeleton in resolved.materialization_order() {
        output.print(&format!(
            "  {} ({} directories, {} files)",
            skeleton.name(),
            skeleton.directories().len(),
            skeleton.files().len()
        ))?;
    }
    Ok(())
}

// ── Prompts ───────────────────────────────────────────────────────────────────

fn ask_or_default(value: Option<String>, label: &str, can_prompt: bool) -> CliResult<String> {
    match value {
        Some(value) => Ok(value),
        None if can_prompt => prompt_text(label),
        None => Ok(String::new()),
    }
}

#[cfg(feature = "interactive")]
fn prompt_text(label: &str) -> CliResult<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::PromptFailed {
            message: e.to_string(),
        })
}

#[cfg(not(feature = "interactive"))]
fn prompt_text(_label: &str) -> CliResult<String> {
    Ok(String::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
