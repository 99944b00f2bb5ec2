//! Implementation of the `kiln add` command.
//!
//! Responsibility: turn CLI arguments into an [`InstallRequest`] and a
//! [`ProjectContext`], call the core install service, and display results.

use std::path::{Path, PathBuf};

use chrono::Datelike;
use tracing::{debug, info, instrument};

use kiln_adapters::{Layout, LayoutPathResolver, LocalFilesystem, SystemProcessRunner};
use kiln_core::{application::ApplicationError, prelude::*};

use crate::{
    cli::{AddArgs, global::GlobalArgs},
    commands::{load_registry, parse_module_ids},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Lockfile → package manager, first match wins.
const LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
    ("package-lock.json", "npm"),
];

/// Execute the `kiln add` command.
///
/// 1. Validate the root and parse module ids and `--param` assignments
/// 2. Load the registry and resolve the plan
/// 3. Show the plan and confirm unless `--yes`, `--quiet` or `--dry-run`
/// 4. Install with per-module progress
/// 5. Print the report; any module error makes the command fail
#[instrument(skip_all, fields(modules = ?args.modules, dry_run = args.dry_run))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let root = resolve_root(&args.root)?;
    let modules = parse_module_ids(&args.modules)?;
    let params = args
        .params
        .iter()
        .map(|raw| ParamAssignment::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let registry = load_registry(args.modules_dir.clone(), &config)?;

    let layout = resolve_layout(
        args.layout.as_deref().unwrap_or(&config.project.layout),
        &root,
    )?;
    let package_manager = args
        .package_manager
        .clone()
        .or_else(|| config.project.package_manager.clone())
        .unwrap_or_else(|| detect_package_manager(&root).to_string());
    let policy = if args.stop_on_failure || config.execution.stop_on_failure {
        FailurePolicy::Stop
    } else {
        FailurePolicy::Continue
    };

    debug!(
        root = %root.display(),
        %layout,
        package_manager = %package_manager,
        ?policy,
        "Install settings resolved"
    );

    let executor = BlueprintExecutor::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SystemProcessRunner::new()),
    )
    .with_path_resolver(Box::new(LayoutPathResolver::new(layout)));
    let service = InstallService::new(Box::new(registry), executor).with_policy(policy);

    let plan = service.plan(&modules);
    if !plan.is_ok() {
        return Err(CliError::Core(
            ApplicationError::ResolutionFailed { report: plan }.into(),
        ));
    }

    let mut ctx = build_context(&args, &config, &root, &package_manager);

    if !global.quiet && !args.yes && !args.dry_run && !output.is_json() {
        show_plan(&plan, &ctx, layout, &output)?;
        if !confirm("Install these modules?")? {
            return Err(CliError::Cancelled);
        }
    }

    let request = InstallRequest {
        modules,
        params,
        dry_run: args.dry_run,
    };

    info!(root = %root.display(), count = plan.order.len(), "Install started");
    let bar = output.progress(plan.order.len() as u64);
    let report = service.install_with(&request, &mut ctx, |event| match event {
        InstallEvent::Started { module, .. } => bar.set_message(module.metadata.name.clone()),
        InstallEvent::Finished(_) => bar.inc(1),
    });
    bar.finish_and_clear();
    let report = report?;

    print_report(&report, &root, &output)?;

    let failed = report.modules.iter().filter(|m| !m.result.success).count();
    if failed > 0 || !report.not_run.is_empty() {
        return Err(CliError::InstallIncomplete {
            failed,
            not_run: report.not_run.len(),
        });
    }

    info!("Install completed");
    Ok(())
}

// ── Project settings ──────────────────────────────────────────────────────────

fn resolve_root(root: &Path) -> CliResult<PathBuf> {
    if !root.is_dir() {
        return Err(CliError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    root.canonicalize().map_err(|e| CliError::IoError {
        message: format!("Failed to resolve project root '{}'", root.display()),
        source: e,
    })
}

fn resolve_layout(raw: &str, root: &Path) -> CliResult<Layout> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(Layout::detect(root));
    }
    raw.parse::<Layout>().map_err(|message| CliError::InvalidInput {
        message,
        source: None,
    })
}

fn detect_package_manager(root: &Path) -> &'static str {
    LOCKFILES
        .iter()
        .find(|(file, _)| root.join(file).exists())
        .map(|(_, pm)| *pm)
        .unwrap_or("npm")
}

fn build_context(
    args: &AddArgs,
    config: &AppConfig,
    root: &Path,
    package_manager: &str,
) -> ProjectContext {
    let name = args.name.clone().unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".into())
    });

    let mut metadata =
        ProjectMetadata::new(name, root).year(chrono::Local::now().year().to_string());
    if let Some(author) = &config.project.author {
        metadata = metadata.author(author);
    }
    if let Some(license) = &config.project.license {
        metadata = metadata.license(license);
    }

    ProjectContext::new(metadata).with_package_manager(package_manager)
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(
    plan: &ResolutionResult,
    ctx: &ProjectContext,
    layout: Layout,
    out: &OutputManager,
) -> CliResult<()> {
    out.header("Install plan")?;
    out.print(&format!("  Project:         {}", ctx.metadata().name))?;
    out.print(&format!("  Location:        {}", ctx.root().display()))?;
    out.print(&format!("  Layout:          {layout}"))?;
    out.print(&format!("  Package manager: {}", ctx.package_manager()))?;
    out.print("")?;
    for (index, id) in plan.order.iter().enumerate() {
        out.print(&format!("  {}. {id}", index + 1))?;
    }
    out.print("")?;
    Ok(())
}

fn print_report(report: &InstallReport, root: &Path, out: &OutputManager) -> CliResult<()> {
    if out.is_json() {
        out.json(report)?;
        return Ok(());
    }

    if report.dry_run {
        out.header("Dry run: nothing was written")?;
    }

    for module in &report.modules {
        let result = &module.result;
        let summary = format!(
            "{} ({}): {} file(s), {} command(s)",
            module.name,
            module.id,
            result.touched.len(),
            result.commands_run
        );
        if result.success {
            out.success(&summary)?;
        } else {
            out.error(&summary)?;
        }

        for path in &result.touched {
            out.detail(&display_path(path, root))?;
        }
        for command in &result.commands {
            out.detail(&format!("$ {command}"))?;
        }
        for error in &result.errors {
            out.error(&format!("  {error}"))?;
        }
    }

    for id in &report.not_run {
        out.warning(&format!("{id}: not run"))?;
    }

    if report.success() && !report.dry_run {
        out.print("")?;
        out.success(&format!("Installed {} module(s)", report.modules.len()))?;
    }
    Ok(())
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(feature = "interactive")]
fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Err(CliError::InvalidInput {
            message: "confirmation needs an interactive terminal; pass --yes to proceed".into(),
            source: None,
        });
    }

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(_prompt: &str) -> CliResult<bool> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
