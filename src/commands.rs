use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use tracing::instrument;

use crate::backup;
use crate::cli::Commands;
use crate::shell::tasks;
use crate::state::AppState;
use crate::users;

/// Runs one subcommand against the real terminal.
pub async fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    dispatch(state, command, &mut input, &mut out).await
}

#[instrument(skip(state, input, out))]
pub async fn dispatch<R, W>(
    state: &AppState,
    command: Commands,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let config = state.config.as_ref();
    match command {
        Commands::Disk => {
            state.runner.run(&tasks::list_current_dir()).await?;
        }
        Commands::Memory { dir } => {
            let dir = match dir {
                Some(d) => d,
                None => PathBuf::from(prompt(input, out, "Directory")?),
            };
            state.runner.run(&tasks::list_dir_sizes(&dir)).await?;
        }
        Commands::Sql => {
            tasks::docker_select_check(state.runner.as_ref(), config)
                .await
                .context("docker mysql check")?;
        }
        Commands::Find { user_name, email } => {
            let user_name = or_prompt(user_name, input, out, "user_name")?;
            let email = or_prompt(email, input, out, "email")?;
            let rows = users::find_user(&config.mysql, &user_name, &email).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        }
        Commands::Update { id, new_name } => {
            let id = match id {
                Some(id) => id,
                None => {
                    let raw = prompt(input, out, "User id")?;
                    raw.parse::<i64>()
                        .with_context(|| format!("user id must be an integer, got {raw:?}"))?
                }
            };
            let new_name = or_prompt(new_name, input, out, "New user_name")?;
            let outcome = users::rename_user(&config.mysql, id, &new_name).await?;
            writeln!(out, "Rows updated: {}", outcome.rows_affected())?;
        }
        Commands::Backup => {
            let path = backup::create_backup(config, backup::now()).await?;
            writeln!(out, "Backup created: {}", path.display())?;
        }
    }
    Ok(())
}

fn or_prompt<R: BufRead, W: Write>(
    value: Option<String>,
    input: &mut R,
    out: &mut W,
    label: &str,
) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(input, out, label),
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> anyhow::Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;
    let mut line = String::new();
    let n = input.read_line(&mut line).context("read from stdin")?;
    anyhow::ensure!(n > 0, "stdin closed before {label} was entered");
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::state::test_support::{test_config, RecordingRunner};
    use std::io::Cursor;
    use std::sync::Arc;

    fn state_with(runner: Arc<RecordingRunner>) -> AppState {
        AppState::from_parts(Arc::new(test_config()), runner)
    }

    #[tokio::test]
    async fn disk_lists_current_directory() {
        let runner = Arc::new(RecordingRunner::default());
        let state = state_with(runner.clone());
        let mut out = Vec::new();
        dispatch(&state, Commands::Disk, &mut Cursor::new(""), &mut out)
            .await
            .unwrap();
        assert_eq!(runner.commands(), vec!["ls -a"]);
    }

    #[tokio::test]
    async fn memory_prompts_for_missing_directory() {
        let runner = Arc::new(RecordingRunner::default());
        let state = state_with(runner.clone());
        let mut out = Vec::new();
        dispatch(
            &state,
            Commands::Memory { dir: None },
            &mut Cursor::new("/srv/data\n"),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(runner.commands(), vec!["ls -lh /srv/data"]);
        assert_eq!(String::from_utf8(out).unwrap(), "Directory: ");
    }

    #[tokio::test]
    async fn sql_failure_is_reported() {
        let runner = Arc::new(RecordingRunner::failing_on("exec"));
        let state = state_with(runner.clone());
        let err = dispatch(&state, Commands::Sql, &mut Cursor::new(""), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("docker mysql check"));
        assert_eq!(runner.commands().len(), 2);
    }

    #[tokio::test]
    async fn update_rejects_non_numeric_id() {
        let state = state_with(Arc::new(RecordingRunner::default()));
        let err = dispatch(
            &state,
            Commands::Update { id: None, new_name: None },
            &mut Cursor::new("forty-two\n"),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("user id must be an integer"));
    }

    #[tokio::test]
    async fn closed_stdin_is_an_error() {
        let state = state_with(Arc::new(RecordingRunner::default()));
        let err = dispatch(
            &state,
            Commands::Find { user_name: None, email: None },
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("stdin closed"));
    }

    #[test]
    fn prompt_keeps_inner_and_surrounding_spaces() {
        let mut out = Vec::new();
        let name = prompt(&mut Cursor::new("  bob smith \r\n"), &mut out, "user_name").unwrap();
        assert_eq!(name, "  bob smith ");
        assert_eq!(String::from_utf8(out).unwrap(), "user_name: ");
    }

    #[tokio::test]
    async fn find_surfaces_connect_error() {
        let mut config = test_config();
        config.mysql.port = 1;
        let state = AppState::from_parts(Arc::new(config), Arc::new(RecordingRunner::default()));
        let err = dispatch(
            &state,
            Commands::Find { user_name: None, email: None },
            &mut Cursor::new("alice\na@example.com\n"),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();
        let db_err = err.downcast_ref::<DbError>().expect("db error");
        assert!(db_err.is_connect());
    }

    #[tokio::test]
    async fn backup_prints_created_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.backup_dir = tmp.path().to_path_buf();
        config.tools.mysqldump_bin = "echo".into();
        let state = AppState::from_parts(Arc::new(config), Arc::new(RecordingRunner::default()));
        let mut out = Vec::new();
        dispatch(&state, Commands::Backup, &mut Cursor::new(""), &mut out)
            .await
            .unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Backup created: "));
        assert!(printed.trim_end().ends_with(".sql"));
    }
}
