use std::path::Path;

use tracing::info;

use crate::config::AppConfig;
use crate::error::CommandError;
use crate::shell::runner::{CommandRunner, CommandSpec};

const CHECK_QUERY: &str = "SELECT * FROM users WHERE id > 3;";

pub fn list_current_dir() -> CommandSpec {
    CommandSpec::new("ls").arg("-a")
}

pub fn list_dir_sizes(dir: &Path) -> CommandSpec {
    CommandSpec::new("ls")
        .arg("-lh")
        .arg(dir.to_string_lossy().into_owned())
}

pub fn compose_up(config: &AppConfig) -> CommandSpec {
    CommandSpec::new(&config.tools.docker_bin).args(["compose", "up", "-d"])
}

/// `-e MYSQL_PWD` without a value makes docker forward the variable from its
/// own environment, so the root password stays out of the argv.
pub fn container_select(config: &AppConfig) -> CommandSpec {
    CommandSpec::new(&config.tools.docker_bin)
        .args(["exec", "-e", "MYSQL_PWD"])
        .arg(&config.tools.container)
        .args(["mysql", "-u", "root"])
        .arg(&config.mysql.database)
        .args(["-e", CHECK_QUERY])
        .env("MYSQL_PWD", config.root_password.clone())
}

/// Brings the compose stack up, gives MySQL time to start, then runs a test
/// query inside the container. Stops at the first failing step.
pub async fn docker_select_check(
    runner: &dyn CommandRunner,
    config: &AppConfig,
) -> Result<(), CommandError> {
    runner.run(&compose_up(config)).await?;

    info!(wait = ?config.tools.startup_wait, "waiting for mysql");
    tokio::time::sleep(config.tools.startup_wait).await;

    runner.run(&container_select(config)).await
}
