use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, error, warn};

use taskbuddy_types::api::{ErrorBody, WebhookAck};
use taskbuddy_types::events::{ChangeNotification, TaskCreatedEvent};

use crate::notify::{NotifyError, notify_user};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

fn server_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// POST /tasksInsert — change notification from the upstream data store.
///
/// Only insertions into `public.tasks` trigger a push; everything else is
/// acknowledged and dropped, since the producer fires the hook for every
/// table change. A matching event with a nonconforming record is the one
/// case the producer should hear about, so it gets a 400 instead of a
/// defensive best-effort parse.
pub async fn tasks_insert(
    State(state): State<AppState>,
    Json(payload): Json<ChangeNotification>,
) -> Result<(StatusCode, Json<WebhookAck>), ApiError> {
    if !payload.is_task_insert() {
        debug!(
            change_type = payload.change_type,
            table = payload.table,
            "ignoring non-task-insert change"
        );
        return Ok((
            StatusCode::OK,
            Json(WebhookAck {
                message: "Webhook received successfully.".to_string(),
            }),
        ));
    }

    let Some(event) = TaskCreatedEvent::from_record(&payload.record) else {
        warn!(record = %payload.record, "task insert record failed validation");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "malformed task record".to_string(),
            }),
        ));
    };

    // Acknowledge once dispatch is initiated; delivery outcomes are not
    // actionable by the event source and never block this response.
    match notify_user(state.db.clone(), state.dispatcher.clone(), event).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(WebhookAck {
                message: "Webhook received successfully.".to_string(),
            }),
        )),
        Err(NotifyError::StoreUnavailable(e)) => {
            error!("device lookup failed: {:#}", e);
            Err(server_error("Error handling webhook."))
        }
    }
}
