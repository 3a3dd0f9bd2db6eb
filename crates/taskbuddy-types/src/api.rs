use serde::{Deserialize, Serialize};

// -- Device binding --

/// Body of `PUT /devices/{token}`. A null `userId` unbinds the device
/// (logout / account switch); a string binds it to that user.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindDeviceRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BindDeviceResponse {
    pub message: String,
}

// -- Webhook acknowledgment --

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
