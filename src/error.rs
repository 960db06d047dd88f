use std::path::PathBuf;
use std::process::ExitStatus;

/// Failures talking to MySQL. Connecting and running the statement are kept
/// apart so callers can tell a bad server/credential from a bad query.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("cannot connect to mysql at {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },
    #[error("statement failed: {0}")]
    Statement(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_connect(&self) -> bool {
        matches!(self, DbError::Connect { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, DbError::Statement(_))
    }
}

/// Any reason a dump did not produce a usable file.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("backup failed: cannot prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("backup failed: cannot format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("backup failed: {path} already exists")]
    AlreadyExists { path: PathBuf },
    #[error("backup failed: cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("backup failed: {program} exited with {status}")]
    ToolExit { program: String, status: ExitStatus },
}

/// Short label for the failure category, used as a log field.
pub fn kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<DbError>() {
        Some(db) if db.is_connect() => "connect",
        Some(db) if db.is_statement() => "statement",
        _ if err.is::<BackupError>() => "backup",
        _ if err.is::<CommandError>() => "command",
        _ => "other",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Exit { command: String, status: ExitStatus },
}
