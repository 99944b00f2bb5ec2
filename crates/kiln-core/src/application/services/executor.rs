//! Blueprint Execution Engine.
//!
//! Interprets a module's action list against the project tree:
//!
//! ```text
//! Action ─▶ condition? ─▶ repeat_over? ─▶ dispatch
//!                                          ├─ file kinds ─▶ render ─▶ merge ─▶ Filesystem
//!                                          └─ commands   ─▶ render ─▶ argv  ─▶ ProcessRunner
//! ```
//!
//! Failures are recorded per application and never stop the blueprint.
//! A dry run renders and merges into an in-memory overlay instead of the
//! filesystem and runs no commands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, PathResolver, ProcessRunner},
    },
    domain::{
        Action, ActionKind, ContentModifier, DomainError, DomainValidator as validator,
        ExecutionResult, MergeKind, OutputHint, ProjectContext, RelativePath, RenderError,
        capabilities::is_env_file,
        evaluate_condition,
        merge::append_block,
        template::{self, split_command},
    },
    error::{KilnError, KilnResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Apply,
    DryRun,
}

/// What one successful application produced.
enum Applied {
    File(PathBuf),
    Command(String),
}

/// Executes blueprints through the filesystem and process ports.
pub struct BlueprintExecutor {
    filesystem: Box<dyn Filesystem>,
    runner: Box<dyn ProcessRunner>,
    paths: Option<Box<dyn PathResolver>>,
}

impl BlueprintExecutor {
    pub fn new(filesystem: Box<dyn Filesystem>, runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            filesystem,
            runner,
            paths: None,
        }
    }

    /// Resolve `{{paths.KEY}}` through `paths`. Without one, path
    /// references stay literal.
    pub fn with_path_resolver(mut self, paths: Box<dyn PathResolver>) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Run every action in order, writing files and running commands.
    #[instrument(
        skip_all,
        fields(
            run_id = %ctx.run_id(),
            module = ctx.current_module().map(|m| m.as_str()).unwrap_or("-"),
            actions = actions.len()
        )
    )]
    pub fn execute(&self, actions: &[Action], ctx: &mut ProjectContext) -> ExecutionResult {
        self.run(actions, ctx, Mode::Apply)
    }

    /// Same as [`execute`](Self::execute) but writes nothing and runs no
    /// commands. `touched` and `commands` report what would happen.
    #[instrument(
        skip_all,
        fields(
            run_id = %ctx.run_id(),
            module = ctx.current_module().map(|m| m.as_str()).unwrap_or("-"),
            actions = actions.len()
        )
    )]
    pub fn execute_dry_run(&self, actions: &[Action], ctx: &mut ProjectContext) -> ExecutionResult {
        self.run(actions, ctx, Mode::DryRun)
    }

    fn run(&self, actions: &[Action], ctx: &mut ProjectContext, mode: Mode) -> ExecutionResult {
        let mut session = Session {
            executor: self,
            mode,
            overlay: HashMap::new(),
        };
        let mut result = ExecutionResult::default();

        for action in actions {
            let label = action.describe();

            if let Some(condition) = &action.condition {
                if !evaluate_condition(condition, ctx) {
                    debug!(action = %label, %condition, "Condition false, skipping");
                    result.skipped += 1;
                    continue;
                }
            }

            match &action.repeat_over {
                None => {
                    let outcome = session.apply(&action.kind, ctx);
                    record(&mut result, &label, outcome);
                }
                Some(collection) => match repeat_items(collection, ctx) {
                    Ok(items) => {
                        for item in items {
                            ctx.bind_item(Some(item));
                            let outcome = session.apply(&action.kind, ctx);
                            record(&mut result, &label, outcome);
                        }
                        ctx.bind_item(None);
                    }
                    Err(reason) => record(&mut result, &label, Err(reason)),
                },
            }
        }

        let result = result.finish();
        info!(
            touched = result.touched.len(),
            errors = result.errors.len(),
            skipped = result.skipped,
            commands = result.commands_run,
            dry_run = mode == Mode::DryRun,
            "Blueprint finished"
        );
        result
    }

    fn lookup_path(&self, key: &str) -> Option<PathBuf> {
        self.paths.as_ref().and_then(|p| p.resolve(key))
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn render(
        &self,
        source: &str,
        ctx: &ProjectContext,
        hint: OutputHint<'_>,
    ) -> KilnResult<String> {
        let lookup = |key: &str| self.lookup_path(key);
        template::render(source, ctx, hint, &lookup).map_err(|e| DomainError::from(e).into())
    }

    fn render_modifier(
        &self,
        modifier: &ContentModifier,
        ctx: &ProjectContext,
        rel: &Path,
    ) -> KilnResult<ContentModifier> {
        let hint = OutputHint::file(rel);
        let r = |s: &str| self.render(s, ctx, hint);
        Ok(match modifier {
            ContentModifier::InsertAfter { anchor, content } => ContentModifier::InsertAfter {
                anchor: r(anchor)?,
                content: r(content)?,
            },
            ContentModifier::InsertBefore { anchor, content } => ContentModifier::InsertBefore {
                anchor: r(anchor)?,
                content: r(content)?,
            },
            ContentModifier::ReplaceText { find, replace } => ContentModifier::ReplaceText {
                find: r(find)?,
                replace: r(replace)?,
            },
            ContentModifier::Prepend { content } => ContentModifier::Prepend {
                content: r(content)?,
            },
        })
    }
}

fn record(result: &mut ExecutionResult, label: &str, outcome: KilnResult<Applied>) {
    match outcome {
        Ok(Applied::File(path)) => {
            debug!(action = %label, path = %path.display(), "Applied");
            result.touched.push(path);
        }
        Ok(Applied::Command(line)) => {
            debug!(action = %label, command = %line, "Applied");
            result.commands_run += 1;
            result.commands.push(line);
        }
        Err(e) => {
            let message = format!("{label}: {}", describe(&e));
            warn!(action = %label, error = %message, "Action failed");
            result.errors.push(message);
        }
    }
}

/// Inner message without the layer prefix added by `KilnError`'s Display.
fn describe(error: &KilnError) -> String {
    match error {
        KilnError::Domain(e) => e.to_string(),
        KilnError::Application(e) => e.to_string(),
        other => other.to_string(),
    }
}

/// Elements of the list parameter named by `repeat_over`.
///
/// Accepts `params.NAME`, `module.NAME` references or a bare `NAME` for
/// the current module.
fn repeat_items(collection: &str, ctx: &ProjectContext) -> KilnResult<Vec<String>> {
    let reference = if collection.contains('.') {
        collection.to_string()
    } else {
        format!("params.{collection}")
    };

    match ctx.lookup(&reference) {
        Some(value) => match value.as_list() {
            Some(items) => Ok(items.to_vec()),
            None => Err(DomainError::InvalidParameter {
                name: collection.to_string(),
                reason: "repeat_over needs a list parameter".into(),
            }
            .into()),
        },
        None => Err(DomainError::InvalidParameter {
            name: collection.to_string(),
            reason: "repeat_over names a parameter with no value".into(),
        }
        .into()),
    }
}

/// One execution: the executor plus the dry-run overlay.
struct Session<'e> {
    executor: &'e BlueprintExecutor,
    mode: Mode,
    overlay: HashMap<PathBuf, String>,
}

impl Session<'_> {
    fn apply(&mut self, kind: &ActionKind, ctx: &ProjectContext) -> KilnResult<Applied> {
        let exec = self.executor;
        match kind {
            ActionKind::InstallPackages { packages, dev } => self.install(packages, *dev, ctx),
            ActionKind::RunCommand { command } => self.command(command, ctx),
            ActionKind::CreateFile {
                path,
                content,
                merge,
            } => self.write_with(path, ctx, |rel, existing| {
                let rendered = exec.render(content, ctx, OutputHint::file(rel))?;
                let strategy = merge.unwrap_or_else(|| MergeKind::for_path(rel));
                Ok(strategy
                    .apply(existing, &rendered)
                    .map_err(|e| e.at(rel))?)
            }),
            ActionKind::AppendContent { path, content } => {
                self.write_with(path, ctx, |rel, existing| {
                    let rendered = exec.render(content, ctx, OutputHint::file(rel))?;
                    if is_env_file(rel) {
                        Ok(MergeKind::LineAppendDedup
                            .apply(existing, &rendered)
                            .map_err(|e| e.at(rel))?)
                    } else {
                        Ok(append_block(existing.unwrap_or_default(), &rendered))
                    }
                })
            }
            ActionKind::MergeStructuredData { path, content } => {
                self.write_with(path, ctx, |rel, existing| {
                    let rendered = exec.render(content, ctx, OutputHint::file(rel))?;
                    Ok(MergeKind::Structured
                        .apply(existing, &rendered)
                        .map_err(|e| e.at(rel))?)
                })
            }
            ActionKind::ExtendSchema { path, content } => {
                self.write_with(path, ctx, |rel, existing| {
                    let rendered = exec.render(content, ctx, OutputHint::file(rel))?;
                    Ok(append_block(existing.unwrap_or_default(), &rendered))
                })
            }
            ActionKind::ModifyContent { path, modifier } => {
                self.write_with(path, ctx, |rel, existing| {
                    let Some(existing) = existing else {
                        return Err(ApplicationError::FilesystemError {
                            path: rel.to_path_buf(),
                            reason: "file does not exist, nothing to modify".into(),
                        }
                        .into());
                    };
                    let modifier = exec.render_modifier(modifier, ctx, rel)?;
                    Ok(modifier.apply(existing).map_err(|e| e.at(rel))?)
                })
            }
        }
    }

    // ── Files ────────────────────────────────────────────────────────────────

    /// Render the target path, read what is there, compute the new content
    /// with `produce`, and write it back when it changed.
    fn write_with<F>(
        &mut self,
        raw_path: &str,
        ctx: &ProjectContext,
        produce: F,
    ) -> KilnResult<Applied>
    where
        F: FnOnce(&Path, Option<&str>) -> KilnResult<String>,
    {
        let rel = self.target(raw_path, ctx)?;
        let full = ctx.root().join(rel.as_path());

        let existing = self.read(&full)?;
        let updated = produce(rel.as_path(), existing.as_deref())?;

        if existing.as_deref() == Some(updated.as_str()) {
            debug!(path = %rel, "Unchanged");
        } else {
            self.write(&full, updated)?;
            info!(path = %rel, "Wrote file");
        }

        Ok(Applied::File(full))
    }

    fn target(&self, raw_path: &str, ctx: &ProjectContext) -> KilnResult<RelativePath> {
        let rendered = self.executor.render(raw_path, ctx, OutputHint::default())?;
        Ok(validator::validate_target_path(&rendered)?)
    }

    fn read(&self, full: &Path) -> KilnResult<Option<String>> {
        if let Some(content) = self.overlay.get(full) {
            return Ok(Some(content.clone()));
        }
        let fs = &self.executor.filesystem;
        if fs.exists(full) {
            fs.read_to_string(full).map(Some)
        } else {
            Ok(None)
        }
    }

    fn write(&mut self, full: &Path, content: String) -> KilnResult<()> {
        match self.mode {
            Mode::DryRun => {
                self.overlay.insert(full.to_path_buf(), content);
                Ok(())
            }
            Mode::Apply => {
                let fs = &self.executor.filesystem;
                if let Some(parent) = full.parent() {
                    fs.create_dir_all(parent)?;
                }
                fs.write_file(full, &content)
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    fn command(&self, command: &str, ctx: &ProjectContext) -> KilnResult<Applied> {
        let rendered = self.executor.render(command, ctx, OutputHint::command())?;
        let argv = split_command(&rendered).map_err(DomainError::from)?;
        self.spawn(argv, ctx)
    }

    fn install(&self, packages: &[String], dev: bool, ctx: &ProjectContext) -> KilnResult<Applied> {
        let mut names = Vec::new();
        for package in packages {
            let rendered = self.executor.render(package, ctx, OutputHint::command())?;
            names.extend(rendered.split_whitespace().map(String::from));
        }
        if names.is_empty() {
            return Err(DomainError::from(RenderError::EmptyCommand).into());
        }

        let mut argv = install_command(ctx.package_manager(), dev);
        argv.extend(names);
        self.spawn(argv, ctx)
    }

    fn spawn(&self, argv: Vec<String>, ctx: &ProjectContext) -> KilnResult<Applied> {
        let line = argv.join(" ");
        if self.mode == Mode::DryRun {
            debug!(command = %line, "Dry run, not running");
            return Ok(Applied::Command(line));
        }

        info!(command = %line, "Running");
        let output = self.executor.runner.run(&argv, ctx.root())?;
        if !output.is_success() {
            return Err(ApplicationError::CommandFailed {
                command: line,
                status: output.status,
                stderr: output.stderr,
            }
            .into());
        }
        Ok(Applied::Command(line))
    }
}

/// `npm install --save-dev`, `pnpm add -D`, `yarn add -D`, `bun add --dev`.
fn install_command(package_manager: &str, dev: bool) -> Vec<String> {
    let (verb, dev_flag) = match package_manager {
        "npm" => ("install", "--save-dev"),
        "bun" => ("add", "--dev"),
        _ => ("add", "-D"),
    };
    let mut argv = vec![package_manager.to_string(), verb.to_string()];
    if dev {
        argv.push(dev_flag.to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CommandOutput, MockFilesystem, MockPathResolver, MockProcessRunner,
    };
    use crate::domain::{
        ModuleDescriptor, ModuleId, ModuleMetadata, ParamValue, ParameterSpec, ProjectMetadata,
    };
    use mockall::predicate::*;
    use std::sync::{Arc, Mutex};

    const ROOT: &str = "/work/app";

    /// Filesystem mock backed by a shared map, so tests can inspect writes.
    fn memory_fs(files: Arc<Mutex<HashMap<PathBuf, String>>>) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        let f = files.clone();
        fs.expect_exists()
            .returning(move |p| f.lock().unwrap().contains_key(p));
        let f = files.clone();
        fs.expect_read_to_string()
            .returning(move |p| Ok(f.lock().unwrap()[p].clone()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        let f = files;
        fs.expect_write_file().returning(move |p, c| {
            f.lock().unwrap().insert(p.to_path_buf(), c.to_string());
            Ok(())
        });
        fs
    }

    fn idle_runner() -> MockProcessRunner {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().never();
        runner
    }

    fn context() -> ProjectContext {
        let module = ModuleDescriptor::builder(ModuleId::parse("prisma").unwrap())
            .metadata(ModuleMetadata::new("Prisma"))
            .parameter(ParameterSpec::optional("provider", "postgresql"))
            .parameter(ParameterSpec::optional("migrate", false))
            .parameter(ParameterSpec::optional(
                "models",
                vec!["user".to_string(), "post".to_string(), "comment".to_string()],
            ))
            .build()
            .unwrap();
        let mut ctx = ProjectContext::new(ProjectMetadata::new("my-app", ROOT));
        ctx.enter_module(&module);
        ctx
    }

    fn path(rel: &str) -> PathBuf {
        Path::new(ROOT).join(rel)
    }

    #[test]
    fn creates_file_with_rendered_content() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();

        let result = executor.execute(
            &[Action::create_file("prisma/schema.prisma", "provider = \"{{params.provider}}\"")],
            &mut ctx,
        );

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.touched, vec![path("prisma/schema.prisma")]);
        assert_eq!(
            files.lock().unwrap()[&path("prisma/schema.prisma")],
            "provider = \"postgresql\""
        );
    }

    #[test]
    fn false_condition_skips_without_error() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();

        let result = executor.execute(
            &[
                Action::command("npx prisma migrate dev").when("params.migrate"),
                Action::create_file("a.txt", "x").when("nonsense condition"),
            ],
            &mut ctx,
        );

        assert!(result.success);
        assert_eq!(result.skipped, 2);
        assert!(files.lock().unwrap().is_empty());
    }

    #[test]
    fn structured_files_are_merged_not_replaced() {
        let files = Arc::new(Mutex::new(HashMap::from([(
            path("package.json"),
            r#"{"name": "my-app", "scripts": {"dev": "next dev"}}"#.to_string(),
        )])));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();
        let actions = [Action::create_file(
            "package.json",
            r#"{"scripts": {"db:studio": "prisma studio"}}"#,
        )];

        assert!(executor.execute(&actions, &mut ctx).success);
        let once = files.lock().unwrap()[&path("package.json")].clone();
        assert!(once.contains("\"dev\": \"next dev\""));
        assert!(once.contains("\"db:studio\": \"prisma studio\""));

        assert!(executor.execute(&actions, &mut ctx).success);
        assert_eq!(files.lock().unwrap()[&path("package.json")], once);
    }

    #[test]
    fn plain_json_is_written_verbatim_twice() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();
        let actions = [Action::create_file("config.json", r#"{"a":1}"#)];

        executor.execute(&actions, &mut ctx);
        executor.execute(&actions, &mut ctx);

        assert_eq!(files.lock().unwrap()[&path("config.json")], r#"{"a":1}"#);
    }

    #[test]
    fn env_append_dedups_keys() {
        let files = Arc::new(Mutex::new(HashMap::from([(
            path(".env"),
            "DATABASE_URL=old\n".to_string(),
        )])));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();
        let actions = [Action::append(".env", "DATABASE_URL=new\nPRISMA_LOG=info\n")];

        executor.execute(&actions, &mut ctx);
        executor.execute(&actions, &mut ctx);

        assert_eq!(
            files.lock().unwrap()[&path(".env")],
            "DATABASE_URL=old\nPRISMA_LOG=info\n"
        );
    }

    #[test]
    fn repeat_over_with_one_failure_records_every_iteration() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        let f = files.clone();
        fs.expect_write_file().returning(move |p, c| {
            if p.ends_with("post.ts") {
                return Err(ApplicationError::FilesystemError {
                    path: p.to_path_buf(),
                    reason: "disk full".into(),
                }
                .into());
            }
            f.lock().unwrap().insert(p.to_path_buf(), c.to_string());
            Ok(())
        });

        let executor = BlueprintExecutor::new(Box::new(fs), Box::new(idle_runner()));
        let mut ctx = context();
        let result = executor.execute(
            &[Action::create_file("src/models/{{item}}.ts", "export const {{item}} = {};")
                .for_each("params.models")],
            &mut ctx,
        );

        assert!(!result.success);
        assert_eq!(result.touched.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("disk full"));
        assert_eq!(
            files.lock().unwrap()[&path("src/models/comment.ts")],
            "export const comment = {};"
        );
        assert!(ctx.item().is_none());
    }

    #[test]
    fn repeat_over_non_list_is_an_error() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(Box::new(memory_fs(files)), Box::new(idle_runner()));
        let mut ctx = context();

        let result = executor.execute(
            &[Action::create_file("{{item}}.ts", "").for_each("provider")],
            &mut ctx,
        );

        assert!(!result.success);
        assert!(result.errors[0].contains("list parameter"));
    }

    #[test]
    fn escaping_rendered_path_is_rejected() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();
        ctx.set_param(
            &ModuleId::parse("prisma").unwrap(),
            "provider",
            ParamValue::from("../../etc"),
        );

        let result = executor.execute(
            &[Action::create_file("{{params.provider}}/x", "boom")],
            &mut ctx,
        );

        assert_eq!(result.errors.len(), 1);
        assert!(files.lock().unwrap().is_empty());
    }

    #[test]
    fn continues_after_failures() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        );
        let mut ctx = context();

        let result = executor.execute(
            &[
                Action::modify(
                    "missing.ts",
                    ContentModifier::Prepend {
                        content: "x".into(),
                    },
                ),
                Action::create_file("ok.txt", "fine"),
            ],
            &mut ctx,
        );

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("modify-content missing.ts"));
        assert_eq!(result.touched, vec![path("ok.txt")]);
    }

    #[test]
    fn commands_are_tokenized_and_run_in_root() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|argv, cwd| {
                argv == ["npx", "prisma", "init", "--datasource-provider", "postgresql"]
                    && cwd == Path::new(ROOT)
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success()));

        let executor = BlueprintExecutor::new(Box::new(memory_fs(files)), Box::new(runner));
        let mut ctx = context();
        let result = executor.execute(
            &[Action::command(
                "npx prisma init --datasource-provider {{params.provider}}",
            )],
            &mut ctx,
        );

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.commands_run, 1);
        assert!(result.touched.is_empty());
    }

    #[test]
    fn install_uses_package_manager_syntax() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|argv, _| argv == ["pnpm", "add", "-D", "prisma", "user", "post", "comment"])
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success()));

        let executor = BlueprintExecutor::new(Box::new(memory_fs(files)), Box::new(runner));
        let mut ctx = context().with_package_manager("pnpm");
        let result = executor.execute(
            &[Action::install_dev(&["prisma", "{{params.models}}"])],
            &mut ctx,
        );

        assert!(result.success, "{:?}", result.errors);
    }

    #[test]
    fn failing_command_is_recorded() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: "not found".into(),
            })
        });

        let executor = BlueprintExecutor::new(Box::new(memory_fs(files)), Box::new(runner));
        let mut ctx = context();
        let result = executor.execute(&[Action::install(&["zod"])], &mut ctx);

        assert!(!result.success);
        assert_eq!(result.commands_run, 0);
        assert!(result.errors[0].contains("exited with status 1"));
    }

    #[test]
    fn path_variables_come_from_resolver() {
        let files = Arc::new(Mutex::new(HashMap::new()));
        let mut paths = MockPathResolver::new();
        paths
            .expect_resolve()
            .with(eq("lib"))
            .returning(|_| Some(PathBuf::from("src/lib")));

        let executor = BlueprintExecutor::new(
            Box::new(memory_fs(files.clone())),
            Box::new(idle_runner()),
        )
        .with_path_resolver(Box::new(paths));
        let mut ctx = context();
        let result = executor.execute(&[Action::create_file("{{paths.lib}}/db.ts", "")], &mut ctx);

        assert_eq!(result.touched, vec![path("src/lib/db.ts")]);
    }

    #[test]
    fn dry_run_writes_nothing_and_runs_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();

        let executor = BlueprintExecutor::new(Box::new(fs), Box::new(idle_runner()));
        let mut ctx = context();
        let result = executor.execute_dry_run(
            &[
                Action::create_file(".env", "A=1\n"),
                Action::append(".env", "A=2\nB=3\n"),
                Action::command("npx prisma generate"),
            ],
            &mut ctx,
        );

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.touched, vec![path(".env"), path(".env")]);
        assert_eq!(result.commands, vec!["npx prisma generate"]);
    }

    #[test]
    fn install_command_shapes() {
        assert_eq!(install_command("npm", true), vec!["npm", "install", "--save-dev"]);
        assert_eq!(install_command("yarn", false), vec!["yarn", "add"]);
        assert_eq!(install_command("bun", true), vec!["bun", "add", "--dev"]);
    }
}
