use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{error, info};

use taskbuddy_db::BindOutcome;
use taskbuddy_types::api::{BindDeviceRequest, BindDeviceResponse, ErrorBody};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

fn message(status: StatusCode, text: &str) -> (StatusCode, Json<BindDeviceResponse>) {
    (
        status,
        Json(BindDeviceResponse {
            message: text.to_string(),
        }),
    )
}

/// PUT /devices/{token} — rebind a device to whoever just signed in on it,
/// or clear the binding on logout (`userId: null`). Called on every login,
/// so the unchanged case is ordinary, not an error.
pub async fn bind_device(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<BindDeviceRequest>,
) -> Result<(StatusCode, Json<BindDeviceResponse>), ApiError> {
    if matches!(req.user_id.as_deref(), Some("")) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "userId must not be empty".to_string(),
            }),
        ));
    }

    // Run the blocking registry write off the async runtime
    let db = state.db.clone();
    let write_token = token.clone();
    let user_id = req.user_id.clone();
    let result = tokio::task::spawn_blocking(move || match user_id.as_deref() {
        Some(user_id) => db.bind(&write_token, user_id).map(Some),
        None => db.unbind(&write_token).map(|cleared| {
            if cleared { None } else { Some(BindOutcome::Unchanged) }
        }),
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        internal_error()
    })?
    .map_err(|e| {
        error!(token, "registry write failed: {:#}", e);
        internal_error()
    })?;

    Ok(match result {
        Some(BindOutcome::Created) => {
            info!(token, "device registered");
            message(StatusCode::CREATED, "Device created successfully")
        }
        Some(BindOutcome::Updated) | None => {
            info!(token, "device binding updated");
            message(StatusCode::OK, "Device updated successfully")
        }
        Some(BindOutcome::Unchanged) => message(StatusCode::OK, "No changes made to the device"),
    })
}

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path as FsPath;
    use std::sync::Arc;
    use std::time::Duration;
    use taskbuddy_db::Database;
    use taskbuddy_push::{Dispatcher, ExpoRelay};

    fn test_state() -> AppState {
        let relay = ExpoRelay::new(
            "http://127.0.0.1:9/push/send".to_string(),
            Duration::from_millis(100),
        )
        .unwrap();
        AppState {
            db: Arc::new(Database::open(FsPath::new(":memory:")).unwrap()),
            dispatcher: Dispatcher::new(relay, 4, Duration::from_millis(200)),
        }
    }

    async fn put(state: &AppState, token: &str, user_id: Option<&str>) -> StatusCode {
        let req = BindDeviceRequest {
            user_id: user_id.map(|u| u.to_string()),
        };
        match bind_device(State(state.clone()), Path(token.to_string()), Json(req)).await {
            Ok(response) => response.0,
            Err((status, _)) => status,
        }
    }

    #[tokio::test]
    async fn first_login_creates_then_repeat_login_reports_no_change() {
        let state = test_state();

        assert_eq!(put(&state, "tok-1", Some("u1")).await, StatusCode::CREATED);
        assert_eq!(put(&state, "tok-1", Some("u1")).await, StatusCode::OK);
        assert_eq!(state.db.devices_for_user("u1").unwrap(), vec!["tok-1"]);
    }

    #[tokio::test]
    async fn account_switch_rebinds_the_device() {
        let state = test_state();

        put(&state, "tok-1", Some("u1")).await;
        assert_eq!(put(&state, "tok-1", Some("u2")).await, StatusCode::OK);

        assert!(state.db.devices_for_user("u1").unwrap().is_empty());
        assert_eq!(state.db.devices_for_user("u2").unwrap(), vec!["tok-1"]);
    }

    #[tokio::test]
    async fn null_user_unbinds_on_logout() {
        let state = test_state();

        put(&state, "tok-1", Some("u1")).await;
        assert_eq!(put(&state, "tok-1", None).await, StatusCode::OK);
        assert!(state.db.devices_for_user("u1").unwrap().is_empty());

        // Logout of an already-unbound device is acknowledged, not an error
        assert_eq!(put(&state, "tok-1", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let state = test_state();
        assert_eq!(put(&state, "tok-1", Some("")).await, StatusCode::BAD_REQUEST);
    }
}
