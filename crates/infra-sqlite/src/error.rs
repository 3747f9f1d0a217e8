// sqlx error mapping
//
// Adapters report storage failures through the port error types only;
// sqlx errors never cross the crate boundary.

use activation_core::port::{ReadError, WriteError};

/// Describe a sqlx error with the SQLite result code when there is one
pub(crate) fn describe_sqlx_error(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            match db_err.code().as_deref() {
                Some("2067") | Some("1555") => {
                    format!("Unique constraint violation: {}", db_err.message())
                }
                Some("787") | Some("3850") => {
                    format!("Foreign key constraint violation: {}", db_err.message())
                }
                Some("5") => format!("Database locked (SQLITE_BUSY): {}", db_err.message()),
                Some("13") => format!("Database full: {}", db_err.message()),
                Some(code) => format!("Database error [{}]: {}", code, db_err.message()),
                None => format!("Database error: {}", db_err.message()),
            }
        }
        sqlx::Error::RowNotFound => "Row not found".to_string(),
        sqlx::Error::ColumnNotFound(col) => format!("Column not found: {}", col),
        sqlx::Error::PoolTimedOut => "Connection pool timed out".to_string(),
        sqlx::Error::PoolClosed => "Connection pool closed".to_string(),
        // Connection, protocol, decode errors
        other => other.to_string(),
    }
}

pub(crate) fn read_error(err: sqlx::Error) -> ReadError {
    ReadError::Access(describe_sqlx_error(&err))
}

pub(crate) fn write_error(err: sqlx::Error) -> WriteError {
    WriteError::Access(describe_sqlx_error(&err))
}
