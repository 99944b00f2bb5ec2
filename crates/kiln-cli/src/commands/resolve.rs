//! `kiln resolve`: print the install order for a module set.

use tracing::instrument;

use kiln_core::application::{ApplicationError, DependencyResolver};

use crate::{
    cli::ResolveArgs,
    commands::{load_registry, parse_module_ids},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(modules = ?args.modules))]
pub fn execute(args: ResolveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let requested = parse_module_ids(&args.modules)?;
    let registry = load_registry(args.modules_dir, &config)?;

    let result = DependencyResolver::new(&registry).resolve(&requested);

    if output.is_json() {
        output.json(&result)?;
    } else if result.is_ok() {
        output.header("Install order")?;
        for (index, id) in result.order.iter().enumerate() {
            let marker = if requested.contains(id) { "" } else { "  (dependency)" };
            output.print(&format!("  {}. {id}{marker}", index + 1))?;
        }
    }

    if !result.is_ok() {
        return Err(CliError::Core(
            ApplicationError::ResolutionFailed { report: result }.into(),
        ));
    }
    Ok(())
}
