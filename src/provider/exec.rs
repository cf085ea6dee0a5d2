//! External command execution
//!
//! Every call into a version manager goes through [`CommandRunner`], so
//! providers can be tested against scripted output instead of real binaries.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::error::ExecError;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables on top of the inherited environment
    pub envs: BTreeMap<String, String>,
}

impl Invocation {
    /// Create an invocation of `program` with `args`
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            envs: BTreeMap::new(),
        }
    }

    /// Add environment variables
    pub fn with_envs(mut self, envs: &BTreeMap<String, String>) -> Self {
        self.envs
            .extend(envs.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Program and arguments joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout and stderr combined, trimmed
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Trait for running external commands
#[cfg_attr(test, automock)]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;

    /// Find `program` on PATH
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Runner that executes real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        debug!(command = %invocation, "running command");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(&invocation.envs)
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run a command and turn spawn errors and non-zero exits into [`ExecError`]
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
) -> Result<CommandOutput, ExecError> {
    let output = runner.run(invocation).map_err(|source| ExecError::Spawn {
        command: invocation.command_line(),
        source,
    })?;

    if output.success {
        Ok(output)
    } else {
        Err(ExecError::Failed {
            command: invocation.command_line(),
            code: output.code,
            output: output.combined(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_invocation_command_line() {
        let invocation = Invocation::new("asdf", ["install", "nodejs", "20.5.0"]);
        assert_eq!(invocation.command_line(), "asdf install nodejs 20.5.0");
        assert_eq!(invocation.to_string(), "asdf install nodejs 20.5.0");
    }

    #[test]
    fn test_invocation_with_envs() {
        let envs = BTreeMap::from([("ASDF_DATA_DIR".to_string(), "/opt/asdf".to_string())]);
        let invocation = Invocation::new("asdf", ["list"]).with_envs(&envs);
        assert_eq!(invocation.envs["ASDF_DATA_DIR"], "/opt/asdf");
    }

    #[test]
    fn test_command_output_combined() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");
        assert_eq!(CommandOutput::ok("only\n").combined(), "only");
        assert_eq!(CommandOutput::failed(2, "bad").combined(), "bad");
    }

    #[test]
    fn test_run_checked_success() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .with(eq(Invocation::new("mise", ["--version"])))
            .times(1)
            .returning(|_| Ok(CommandOutput::ok("2024.5.0 linux-x64")));

        let output = run_checked(&runner, &Invocation::new("mise", ["--version"])).unwrap();
        assert_eq!(output.stdout, "2024.5.0 linux-x64");
    }

    #[test]
    fn test_run_checked_failure_carries_output() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(CommandOutput::failed(1, "plugin not found")));

        let err = run_checked(&runner, &Invocation::new("asdf", ["list", "foo"])).unwrap_err();
        match err {
            ExecError::Failed { command, code, output } => {
                assert_eq!(command, "asdf list foo");
                assert_eq!(code, Some(1));
                assert_eq!(output, "plugin not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_checked_spawn_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            ))
        });

        let err = run_checked(&runner, &Invocation::new("asdf", ["list"])).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn test_system_runner_captures_output() {
        let runner = SystemRunner::new();
        let output = runner
            .run(&Invocation::new("sh", ["-c", "echo hello; echo oops >&2; exit 3"]))
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[test]
    fn test_system_runner_passes_envs() {
        let envs = BTreeMap::from([("TOOLPROVIDER_TEST_VAR".to_string(), "42".to_string())]);
        let output = SystemRunner::new()
            .run(&Invocation::new("sh", ["-c", "echo $TOOLPROVIDER_TEST_VAR"]).with_envs(&envs))
            .unwrap();
        assert_eq!(output.stdout.trim(), "42");
    }
}
