use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mysqlops", version)]
#[command(about = "DevOps MySQL utility: user lookups, renames and dumps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Omitted arguments are asked for on stdin.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the current directory listing (ls -a)
    Disk,
    /// Show a directory listing with sizes (ls -lh)
    Memory {
        /// Directory to list
        dir: Option<PathBuf>,
    },
    /// Start the docker compose stack and run a test SELECT in the container
    Sql,
    /// Find users by user_name and email
    Find {
        #[arg(long)]
        user_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change a user's user_name by id
    Update {
        #[arg(long)]
        id: Option<i64>,
        #[arg(long)]
        new_name: Option<String>,
    },
    /// Dump the database into the backup directory
    Backup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_find_with_flags() {
        let cli = Cli::try_parse_from([
            "mysqlops",
            "find",
            "--user-name",
            "alice",
            "--email",
            "a@example.com",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Find {
                user_name: Some("alice".into()),
                email: Some("a@example.com".into()),
            }
        );
    }

    #[test]
    fn update_arguments_are_optional() {
        let cli = Cli::try_parse_from(["mysqlops", "update"]).unwrap();
        assert_eq!(cli.command, Commands::Update { id: None, new_name: None });
    }

    #[test]
    fn update_id_must_be_numeric() {
        assert!(Cli::try_parse_from(["mysqlops", "update", "--id", "forty-two"]).is_err());
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["mysqlops"]).is_err());
    }
}
