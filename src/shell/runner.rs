use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Secret;
use crate::error::CommandError;

/// A program, its argv and extra environment for the child. Secrets belong in
/// `env`: the argument list is visible to every user on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, Secret)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: Secret) -> Self {
        self.env.push((key.into(), value));
        self
    }

    #[cfg(test)]
    pub fn env_value(&self, key: &str) -> Option<&Secret> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value.expose());
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &CommandSpec) -> Result<(), CommandError>;
}

/// Runs commands for real, attached to the terminal.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &CommandSpec) -> Result<(), CommandError> {
        debug!(command = %cmd, "running");
        let status = cmd
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| CommandError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(CommandError::Exit {
                command: cmd.to_string(),
                status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_argv_but_not_env() {
        let cmd = CommandSpec::new("docker")
            .args(["exec", "-e", "MYSQL_PWD"])
            .env("MYSQL_PWD", Secret::new("toor"));
        assert_eq!(cmd.to_string(), "docker exec -e MYSQL_PWD");
        assert_eq!(cmd.env_value("MYSQL_PWD"), Some(&Secret::new("toor")));
        assert!(cmd.env_value("HOME").is_none());
    }

    #[tokio::test]
    async fn system_runner_succeeds_on_zero_exit() {
        SystemRunner.run(&CommandSpec::new("true")).await.unwrap();
    }

    #[tokio::test]
    async fn system_runner_reports_non_zero_exit() {
        let err = SystemRunner
            .run(&CommandSpec::new("false"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Exit { .. }));
    }

    #[tokio::test]
    async fn system_runner_reports_missing_program() {
        let err = SystemRunner
            .run(&CommandSpec::new("/nonexistent/definitely-not-a-tool"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
