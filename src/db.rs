use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::ConnectOptions;
use tracing::debug;

use crate::config::MySqlParams;
use crate::error::DbError;

pub fn connect_options(params: &MySqlParams) -> MySqlConnectOptions {
    let mut opts = MySqlConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .database(&params.database);
    if !params.password.is_empty() {
        opts = opts.password(params.password.expose());
    }
    opts
}

/// Opens a fresh, unpooled connection. The caller owns it for one statement.
///
/// Without a database every statement would fail with "No database selected",
/// so an empty database name is reported as a connect failure up front.
pub async fn connect(params: &MySqlParams) -> Result<MySqlConnection, DbError> {
    let connect_err = |source| DbError::Connect {
        host: params.host.clone(),
        port: params.port,
        source,
    };
    if params.database.is_empty() {
        return Err(connect_err(sqlx::Error::Configuration(
            "no database configured (MYSQL_DATABASE is empty)".into(),
        )));
    }
    let conn = connect_options(params)
        .connect()
        .await
        .map_err(connect_err)?;
    debug!(host = %params.host, port = params.port, database = %params.database, "mysql connected");
    Ok(conn)
}
