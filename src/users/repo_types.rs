use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, FromRow, Row, TypeInfo, ValueRef};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// One row of the `users` table. The table belongs to someone else, so every
/// column of `SELECT *` is kept, in column order, as a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserRecord {
    columns: Map<String, Value>,
}

impl UserRecord {
    pub fn id(&self) -> Option<i64> {
        self.columns.get("id").and_then(Value::as_i64)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.columns.get("user_name").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.columns.get("email").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for UserRecord {
    fn from(columns: Map<String, Value>) -> Self {
        Self { columns }
    }
}

impl<'r> FromRow<'r, MySqlRow> for UserRecord {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let mut columns = Map::with_capacity(row.columns().len());
        for column in row.columns() {
            let value = column_value(row, column.ordinal(), column.type_info().name())?;
            columns.insert(column.name().to_owned(), value);
        }
        Ok(Self { columns })
    }
}

fn column_value(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(idx)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => Value::from(row.try_get::<u64, _>(idx)?),
        "FLOAT" => Value::from(f64::from(row.try_get::<f32, _>(idx)?)),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(idx)?),
        "DATETIME" | "TIMESTAMP" => {
            let at = row.try_get::<PrimitiveDateTime, _>(idx)?;
            Value::from(
                at.format(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second]"
                ))
                .map_err(decode_err)?,
            )
        }
        "DATE" => {
            let day = row.try_get::<Date, _>(idx)?;
            Value::from(day.format(format_description!("[year]-[month]-[day]")).map_err(decode_err)?)
        }
        "TIME" => {
            let t = row.try_get::<Time, _>(idx)?;
            Value::from(t.format(format_description!("[hour]:[minute]:[second]")).map_err(decode_err)?)
        }
        "JSON" => row.try_get::<Value, _>(idx)?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        // Text, DECIMAL, ENUM and SET all arrive as strings on the wire.
        _ => Value::from(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}

fn decode_err(e: time::error::Format) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

/// Result of a rename. A missing id is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenameOutcome {
    Updated { rows: u64 },
    NotFound,
}

impl RenameOutcome {
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            RenameOutcome::NotFound
        } else {
            RenameOutcome::Updated { rows }
        }
    }

    pub fn rows_affected(&self) -> u64 {
        match self {
            RenameOutcome::Updated { rows } => *rows,
            RenameOutcome::NotFound => 0,
        }
    }
}
