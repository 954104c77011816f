//! Payment collaborator webhook consumption.
//!
//! The engine only consumes these events, never initiates payment. Each
//! request is authenticated by an HMAC-SHA256 signature over the raw body.
//! At-most-one delivery per purchase event is the collaborator's guarantee;
//! this handler applies whatever it is sent.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use siteforge_core::error::CoreError;
use siteforge_core::tokens::Plan;
use siteforge_core::types::DbId;
use siteforge_db::models::invoice::CreateInvoice;
use siteforge_db::models::project::CreateProject;
use siteforge_db::repositories::{InvoiceRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the hex-encoded HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Envelope every payment event arrives in.
#[derive(Debug, Deserialize)]
struct PaymentEvent {
    /// Event type, e.g. `checkout.completed`.
    #[serde(rename = "type")]
    event_type: String,
    /// The collaborator's event id, recorded for reconciliation.
    id: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutCompleted {
    owner_id: DbId,
    owner_email: String,
    plan: String,
    amount_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenPurchaseCompleted {
    project_id: DbId,
    tokens: i64,
    amount_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEvent {
    project_id: DbId,
}

/// POST /api/v1/webhooks/payment
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing webhook signature".into()))
        })?;
    if !verify_signature(&state.config.payment_webhook_secret, &body, signature) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        )));
    }

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {e}")))?;

    match event.event_type.as_str() {
        "checkout.completed" => {
            let data: CheckoutCompleted = parse_data(event.data)?;
            let plan = Plan::parse(&data.plan).ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!("Unknown plan: {}", data.plan)))
            })?;

            let project = ProjectRepo::create(
                &state.pool,
                &CreateProject {
                    owner_id: data.owner_id,
                    owner_email: data.owner_email,
                    plan: plan.as_str().to_string(),
                    initial_tokens: plan.initial_token_grant(),
                },
            )
            .await?;
            InvoiceRepo::create(
                &state.pool,
                &CreateInvoice {
                    project_id: project.id,
                    event_type: event.event_type.clone(),
                    external_reference: event.id,
                    tokens_granted: plan.initial_token_grant(),
                    amount_cents: data.amount_cents,
                },
            )
            .await?;

            tracing::info!(
                project_id = project.id,
                owner_id = project.owner_id,
                plan = %project.plan,
                "Project created from checkout"
            );
            Ok((
                StatusCode::CREATED,
                Json(json!({ "project_id": project.id })),
            ))
        }

        "token_purchase.completed" => {
            let data: TokenPurchaseCompleted = parse_data(event.data)?;
            if data.tokens <= 0 {
                return Err(AppError::Core(CoreError::Validation(
                    "tokens must be positive".into(),
                )));
            }

            let balance =
                ProjectRepo::credit_tokens(&state.pool, data.project_id, data.tokens).await?;
            InvoiceRepo::create(
                &state.pool,
                &CreateInvoice {
                    project_id: data.project_id,
                    event_type: event.event_type.clone(),
                    external_reference: event.id,
                    tokens_granted: data.tokens,
                    amount_cents: data.amount_cents,
                },
            )
            .await?;

            tracing::info!(
                project_id = data.project_id,
                credited = data.tokens,
                balance,
                "Tokens credited"
            );
            Ok((StatusCode::OK, Json(json!({ "token_balance": balance }))))
        }

        "subscription.cancelled" => {
            let data: SubscriptionEvent = parse_data(event.data)?;
            let project = ProjectRepo::cancel(&state.pool, data.project_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(
                        "The project is already cancelled or cannot be cancelled".into(),
                    ))
                })?;
            tracing::info!(project_id = project.id, "Subscription cancelled");
            Ok((StatusCode::OK, Json(json!({ "status": "cancelled" }))))
        }

        "subscription.reactivated" => {
            let data: SubscriptionEvent = parse_data(event.data)?;
            let project = ProjectRepo::reactivate(&state.pool, data.project_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict("The project is not cancelled".into()))
                })?;
            tracing::info!(
                project_id = project.id,
                status = %project.status(),
                "Subscription reactivated"
            );
            Ok((StatusCode::OK, Json(json!({ "status": "reactivated" }))))
        }

        other => {
            // Unknown events are acknowledged so the collaborator does not
            // retry them forever.
            tracing::debug!(event_type = other, "Ignoring unhandled payment event");
            Ok((StatusCode::OK, Json(json!({ "status": "ignored" }))))
        }
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(data)
        .map_err(|e| AppError::BadRequest(format!("Malformed event data: {e}")))
}

/// Constant-time verification of the hex HMAC-SHA256 body signature.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Produce the signature a caller must send. Shared with the integration
/// tests; the payment collaborator implements the same scheme.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
