use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use futures_util::StreamExt;

use crate::domain::new_subscriber::{BodyRejection, NewSubscriber};
use crate::store::{StoreError, SubscribeOutcome, SubscriberStore};

/// Bodies past this size are drained and answered as an invalid email.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Missing or invalid email")]
    ValidationError(#[source] BodyRejection),
    #[error("Failed to store the subscriber")]
    StorageError(#[from] StoreError),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(serde::Serialize)]
struct SubscribedBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Clients only ever see a generic reason, details stay in the logs
    fn error_response(&self) -> HttpResponse {
        let error = match self {
            SubscribeError::ValidationError(_) => "Invalid email",
            SubscribeError::StorageError(_) => "Server error",
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(payload, store),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn handle_create_subscription(
    payload: web::Payload,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber = match read_body(payload)
        .await
        .and_then(|body| NewSubscriber::try_from(&body[..]))
    {
        Ok(subscriber) => subscriber,
        Err(err) => {
            tracing::warn!("Validation error: {}", err);
            return Err(SubscribeError::ValidationError(err));
        }
    };
    tracing::Span::current().record(
        "subscriber_email",
        tracing::field::display(&new_subscriber.email),
    );

    let outcome = match store.subscribe(&new_subscriber.email).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let err = SubscribeError::from(err);
            tracing::error!("Failed to store new subscriber: {:?}", err);
            return Err(err);
        }
    };

    let body = match outcome {
        SubscribeOutcome::Subscribed => {
            tracing::info!("New subscriber: {}", new_subscriber.email);
            SubscribedBody {
                success: true,
                message: None,
            }
        }
        SubscribeOutcome::AlreadySubscribed => SubscribedBody {
            success: true,
            message: Some("Already subscribed"),
        },
    };

    Ok(HttpResponse::Ok().json(body))
}

// The payload is read by hand so that every failure, oversized bodies included, gets the JSON error body
async fn read_body(mut payload: web::Payload) -> Result<web::BytesMut, BodyRejection> {
    let mut body = web::BytesMut::new();
    let mut too_large = false;

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| BodyRejection::Unreadable(err.to_string()))?;

        // Keep draining so the client still receives the response
        if too_large || body.len() + chunk.len() > MAX_BODY_BYTES {
            too_large = true;
            continue;
        }
        body.extend_from_slice(&chunk);
    }

    if too_large {
        return Err(BodyRejection::TooLarge(MAX_BODY_BYTES));
    }

    Ok(body)
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
