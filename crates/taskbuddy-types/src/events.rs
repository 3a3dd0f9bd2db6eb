use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw change notification posted to the webhook by the upstream data store.
/// `record` stays untyped until the type/table filter matches; producers
/// attach extra fields freely, so unknown fields are tolerated here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "type")]
    pub change_type: String,
    pub table: String,
    pub schema: String,
    #[serde(default)]
    pub record: Value,
}

impl ChangeNotification {
    /// Whether this notification is a task insertion we care about.
    pub fn is_task_insert(&self) -> bool {
        self.change_type == "INSERT" && self.schema == "public" && self.table == "tasks"
    }
}

/// A validated task-creation fact, parsed strictly out of the webhook
/// `record`. Anything that fails to conform is rejected at the boundary
/// rather than accessed defensively downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreatedEvent {
    #[serde(rename = "userId", deserialize_with = "string_or_number")]
    pub user_id: String,
    pub activity: String,
}

/// The upstream store emits `userId` as a JSON number (serial primary key),
/// but the registry treats user ids as opaque strings. Accept either.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

impl TaskCreatedEvent {
    pub fn from_record(record: &Value) -> Option<Self> {
        let event: Self = serde_json::from_value(record.clone()).ok()?;
        if event.user_id.is_empty() || event.activity.is_empty() {
            return None;
        }
        Some(event)
    }
}
