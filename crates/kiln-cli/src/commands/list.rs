//! Implementation of the `kiln list` command.

use kiln_core::application::{ModuleInfo, ModuleService};

use crate::{
    cli::{ListArgs, ListFormat},
    commands::load_registry,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let registry = load_registry(args.modules_dir, &config)?;
    let service = ModuleService::new(Box::new(registry));
    let modules = service.summaries(args.category.as_deref())?;

    // `--output-format json` overrides the list format.
    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if modules.is_empty() {
                output.info("No modules match")?;
                return Ok(());
            }
            output.header("Available Modules:")?;
            let width = modules.iter().map(|m| m.id.len()).max().unwrap_or(0);
            for module in &modules {
                output.print(&table_row(module, width))?;
            }
        }

        ListFormat::Json => output.json(&modules)?,

        ListFormat::List => {
            for module in &modules {
                output.print(&module.id)?;
            }
        }

        ListFormat::Csv => {
            output.print("id,name,category,version,dependencies")?;
            for module in &modules {
                output.print(&csv_row(module))?;
            }
        }
    }

    Ok(())
}

fn table_row(module: &ModuleInfo, width: usize) -> String {
    let mut row = format!("  {:<width$}  {}", module.id, module.name);
    if !module.category.is_empty() {
        row.push_str(&format!(" [{}]", module.category));
    }
    if !module.dependencies.is_empty() {
        row.push_str(&format!(" (needs {})", module.dependencies.join(", ")));
    }
    row
}

fn csv_row(module: &ModuleInfo) -> String {
    let dependencies = module.dependencies.join(";");
    [
        module.id.as_str(),
        module.name.as_str(),
        module.category.as_str(),
        module.version.as_str(),
        dependencies.as_str(),
    ]
    .iter()
    .map(|field| csv_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
