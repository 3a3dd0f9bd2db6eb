/// Database row types — these map directly to SQLite rows.
/// Distinct from taskbuddy-types API models to keep the DB layer independent.

pub struct DeviceRow {
    pub token: String,
    pub user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
