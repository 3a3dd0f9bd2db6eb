use crate::Database;
use crate::models::DeviceRow;
use anyhow::Result;
use rusqlite::Connection;

/// What a bind did to the registry. Binding a token to the owner it already
/// has is reported, not treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Created,
    Updated,
    Unchanged,
}

impl Database {
    /// Bind a device token to a user. Inserts the row on first sight,
    /// rewrites ownership when the signed-in account changes, and reports
    /// `Unchanged` for a repeated login. Last write wins on races.
    pub fn bind(&self, token: &str, user_id: &str) -> Result<BindOutcome> {
        self.with_conn(|conn| {
            let existing = query_device(conn, token)?;

            match existing {
                None => {
                    conn.execute(
                        "INSERT INTO devices (token, user_id) VALUES (?1, ?2)",
                        (token, user_id),
                    )?;
                    Ok(BindOutcome::Created)
                }
                Some(row) if row.user_id.as_deref() != Some(user_id) => {
                    conn.execute(
                        "UPDATE devices SET user_id = ?1, updated_at = datetime('now') WHERE token = ?2",
                        (user_id, token),
                    )?;
                    Ok(BindOutcome::Updated)
                }
                Some(_) => Ok(BindOutcome::Unchanged),
            }
        })
    }

    /// Clear a device's owner on logout or account switch. Returns whether a
    /// binding was actually cleared; unknown or already-unbound tokens are a
    /// no-op, not an error. The row stays behind for the next login.
    pub fn unbind(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let cleared = conn.execute(
                "UPDATE devices SET user_id = NULL, updated_at = datetime('now')
                 WHERE token = ?1 AND user_id IS NOT NULL",
                [token],
            )?;
            Ok(cleared > 0)
        })
    }

    /// All tokens currently bound to a user. Empty for unknown users.
    pub fn devices_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT token FROM devices WHERE user_id = ?1")?;
            let tokens = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(tokens)
        })
    }

    pub fn get_device(&self, token: &str) -> Result<Option<DeviceRow>> {
        self.with_conn(|conn| query_device(conn, token))
    }
}

fn query_device(conn: &Connection, token: &str) -> Result<Option<DeviceRow>> {
    let mut stmt =
        conn.prepare("SELECT token, user_id, created_at, updated_at FROM devices WHERE token = ?1")?;

    let row = stmt
        .query_row([token], |row| {
            Ok(DeviceRow {
                token: row.get(0)?,
                user_id: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
