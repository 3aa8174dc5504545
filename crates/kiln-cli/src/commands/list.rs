//! Implementation of the `kiln list` command.

use std::io;

use kiln_adapters::FsSkeletonLoader;
use kiln_core::application::{TemplateInfo, TemplateService};

use crate::{
    cli::{ListArgs, ListFormat, OutputFormat},
    commands::template_locator,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let service = TemplateService::new(
        Box::new(template_locator(config)),
        Box::new(FsSkeletonLoader::new()),
    );
    let templates = service.list()?;

    // `--output-format json` wins over the per-command format.
    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.info("No templates found")?;
                return Ok(());
            }
            output.header("Available templates (use with --template):")?;
            let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
            for template in &templates {
                output.data(&table_row(template, width))?;
            }
        }

        ListFormat::List => {
            for template in &templates {
                output.data(&template.name)?;
            }
        }

        ListFormat::Json => {
            let value = serde_json::to_value(&templates).map_err(io::Error::other)?;
            output.json(&value)?;
        }

        ListFormat::Csv => {
            output.data("name,source,path,description")?;
            for t in &templates {
                output.data(&format!(
                    "{},{},{},{}",
                    csv_field(&t.name),
                    csv_field(&t.source),
                    csv_field(&t.path.display().to_string()),
                    csv_field(t.description.as_deref().unwrap_or_default()),
                ))?;
            }
        }
    }

    Ok(())
}

/// `  default   bundled   A plain package (includes: license-mit)`
fn table_row(template: &TemplateInfo, width: usize) -> String {
    let mut row = format!("  {:<width$}  {:<10}", template.name, template.source);

    match &template.error {
        Some(error) => row.push_str(&format!("  [unreadable: {error}]")),
        None => {
            if let Some(description) = &template.description {
                row.push_str("  ");
                row.push_str(description);
            }
            if !template.includes.is_empty() {
                row.push_str(&format!("  (includes: {})", template.includes.join(", ")));
            }
        }
    }

    row.trim_end().to_owned()
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}
