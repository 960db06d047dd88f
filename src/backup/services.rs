use std::path::{Path, PathBuf};
use std::process::Stdio;

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, MySqlParams};
use crate::error::BackupError;
use crate::shell::CommandSpec;

/// `{database}_{YYYY-MM-DD_HH-MM-SS}.sql`
pub fn backup_file_name(database: &str, at: OffsetDateTime) -> Result<String, BackupError> {
    let stamp = at.format(format_description!(
        "[year]-[month]-[day]_[hour]-[minute]-[second]"
    ))?;
    Ok(format!("{database}_{stamp}.sql"))
}

pub fn dump_args(params: &MySqlParams) -> Vec<String> {
    vec![
        "--no-tablespaces".into(),
        "-h".into(),
        params.host.clone(),
        "-P".into(),
        params.port.to_string(),
        "-u".into(),
        params.user.clone(),
        params.database.clone(),
    ]
}

/// The dump tool invocation. The password travels in `MYSQL_PWD`, never in argv.
pub fn dump_command(config: &AppConfig) -> CommandSpec {
    CommandSpec::new(&config.tools.mysqldump_bin)
        .args(dump_args(&config.mysql))
        .env("MYSQL_PWD", config.mysql.password.clone())
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Dump the configured database into a new file under `backup_dir`.
///
/// Output is streamed into `<name>.sql.partial` and only renamed to
/// `<name>.sql` once the tool exits with status 0. On any failure the partial
/// file is removed, so a `.sql` file in the backup directory is always a
/// complete dump.
#[instrument(skip(config, at), fields(database = %config.mysql.database))]
pub async fn create_backup(config: &AppConfig, at: OffsetDateTime) -> Result<PathBuf, BackupError> {
    let dir = &config.backup_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| BackupError::Io {
            path: dir.clone(),
            source,
        })?;

    let target = dir.join(backup_file_name(&config.mysql.database, at)?);
    let exists = tokio::fs::try_exists(&target)
        .await
        .map_err(|source| BackupError::Io {
            path: target.clone(),
            source,
        })?;
    if exists {
        return Err(BackupError::AlreadyExists { path: target });
    }

    let partial = partial_path(&target);
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&partial)
        .await
        .map_err(|source| BackupError::Io {
            path: partial.clone(),
            source,
        })?
        .into_std()
        .await;

    let cmd = dump_command(config);
    info!(path = %target.display(), command = %cmd, "creating backup");

    let status = cmd
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::from(file))
        .stderr(Stdio::inherit())
        .status()
        .await;

    let status = match status {
        Ok(status) => status,
        Err(source) => {
            discard(&partial).await;
            return Err(BackupError::Spawn {
                program: cmd.program,
                source,
            });
        }
    };
    if !status.success() {
        discard(&partial).await;
        return Err(BackupError::ToolExit {
            program: cmd.program,
            status,
        });
    }

    if let Err(source) = tokio::fs::rename(&partial, &target).await {
        discard(&partial).await;
        return Err(BackupError::Io {
            path: target,
            source,
        });
    }

    info!(path = %target.display(), "backup completed");
    Ok(target)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

async fn discard(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        warn!(error = %e, path = %partial.display(), "could not remove partial backup");
    }
}
