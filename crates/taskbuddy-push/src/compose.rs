use serde::Serialize;

/// A composed push notification, not yet addressed to any device.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub sound: String,
}

/// Build the notification for a newly created task. Pure formatting,
/// kept apart from delivery so either can change alone.
pub fn compose(activity: &str) -> Notification {
    Notification {
        title: "Novi Zadatak".to_string(),
        body: format!("Imate novi zadatak: {}", activity),
        sound: "default".to_string(),
    }
}
