//! Process runner adapters.

use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::{Arc, Mutex},
};

use tracing::{debug, instrument};

use kiln_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, ProcessRunner},
    },
    error::KilnResult,
};

/// Runs programs through `std::process::Command` and waits for them.
///
/// Arguments are passed as-is; no shell is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip_all, fields(program = argv.first().map(String::as_str).unwrap_or_default()))]
    fn run(&self, argv: &[String], cwd: &Path) -> KilnResult<CommandOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ApplicationError::CommandSpawn {
                command: String::new(),
                reason: "empty command line".into(),
            }
            .into());
        };

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| ApplicationError::CommandSpawn {
                command: argv.join(" "),
                reason: e.to_string(),
            })?;

        // Killed by a signal has no code.
        let status = output.status.code().unwrap_or(-1);
        debug!(status, "Process exited");

        Ok(CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One invocation seen by a [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
}

/// Records invocations instead of running them.
///
/// Every call succeeds unless its program name was scripted to fail with
/// [`RecordingRunner::fail_on`]. Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    failing: Arc<Mutex<Vec<(String, CommandOutput)>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with `status` and `stderr`.
    pub fn fail_on(
        self,
        program: impl Into<String>,
        status: i32,
        stderr: impl Into<String>,
    ) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push((
                program.into(),
                CommandOutput {
                    status,
                    stdout: String::new(),
                    stderr: stderr.into(),
                },
            ));
        }
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Invocations joined into command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|i| i.argv.join(" "))
            .collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, argv: &[String], cwd: &Path) -> KilnResult<CommandOutput> {
        self.calls
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(Invocation {
                argv: argv.to_vec(),
                cwd: cwd.to_path_buf(),
            });

        let program = argv.first().map(String::as_str).unwrap_or_default();
        let scripted = self
            .failing
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .iter()
            .find(|(p, _)| p == program)
            .map(|(_, out)| out.clone());

        Ok(scripted.unwrap_or_else(CommandOutput::success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn recording_runner_records_and_scripts_failures() {
        let runner = RecordingRunner::new().fail_on("prisma", 1, "schema error");
        let shared = runner.clone();

        let ok = runner.run(&argv(&["npm", "install", "zod"]), Path::new("/p")).unwrap();
        let failed = runner.run(&argv(&["prisma", "generate"]), Path::new("/p")).unwrap();

        assert!(ok.is_success());
        assert_eq!(failed.status, 1);
        assert_eq!(failed.stderr, "schema error");
        assert_eq!(
            shared.command_lines(),
            vec!["npm install zod", "prisma generate"]
        );
        assert_eq!(shared.invocations()[0].cwd, PathBuf::from("/p"));
    }

    #[test]
    fn system_runner_rejects_empty_argv() {
        assert!(SystemProcessRunner::new().run(&[], Path::new(".")).is_err());
    }

    #[test]
    fn system_runner_reports_spawn_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = SystemProcessRunner::new().run(
            &argv(&["kiln-definitely-not-a-program"]),
            temp.path(),
        );
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_output_and_status() {
        let temp = tempfile::TempDir::new().unwrap();
        let runner = SystemProcessRunner::new();

        let out = runner.run(&argv(&["sh", "-c", "echo hi"]), temp.path()).unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout.trim(), "hi");

        let out = runner.run(&argv(&["sh", "-c", "exit 3"]), temp.path()).unwrap();
        assert_eq!(out.status, 3);
    }
}
