//! Handlers for installment payments and receipts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use plotledger_core::error::CoreError;
use plotledger_core::money::round_paise;
use plotledger_core::payment::{receipt_number, validate_payment};
use plotledger_core::plot::{paid_percentage, should_auto_sell, PlotStatus};
use plotledger_core::types::DbId;
use plotledger_db::models::payment::{CreatePayment, Payment, PaymentReceipt};
use plotledger_db::models::plot::{Plot, StatusChange};
use plotledger_db::repositories::{PaymentRepo, PlotRepo};
use serde::Serialize;
use validator::Validate;

use super::plot::apply_transition;
use super::{require_optional_profile, require_plot};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A recorded payment together with the plot totals it produced.
#[derive(Debug, Serialize)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub plot: Plot,
}

/// GET /api/v1/plots/{id}/payments
pub async fn list_for_plot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    require_plot(&state.pool, id).await?;
    let payments = PaymentRepo::list_for_plot(&state.pool, id).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/v1/plots/{id}/payments
///
/// Inserts the payment and the new plot totals in one transaction. A booked
/// plot that reaches the auto-sale threshold is then sold, which distributes
/// commission.
pub async fn record(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<DataResponse<RecordedPayment>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_payment(input.amount, &input.method, input.reference.as_deref())?;
    require_optional_profile(&state.pool, input.received_by).await?;

    let mut tx = state.pool.begin().await?;

    let plot = PlotRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or(AppError::not_found("Plot", id))?;
    let status = plot.status()?;
    if status == PlotStatus::Cancelled {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Plot {id} is cancelled and cannot take payments"
        ))));
    }

    let sequence = PaymentRepo::next_sequence(&mut *tx, id).await?;
    let receipt = receipt_number(id, sequence);
    let payment = PaymentRepo::create(&mut *tx, id, &input, &receipt).await?;

    let paid_amount = round_paise(plot.paid_amount + input.amount);
    let pct = paid_percentage(paid_amount, plot.total_amount);
    let mut plot = PlotRepo::set_paid(&mut *tx, id, paid_amount, pct).await?;

    tx.commit().await?;

    tracing::info!(
        plot_id = id,
        payment_id = payment.id,
        receipt_number = %payment.receipt_number,
        amount = payment.amount,
        paid_percentage = pct,
        "Payment recorded"
    );

    if should_auto_sell(status, pct) {
        tracing::info!(plot_id = id, paid_percentage = pct, "Paid threshold reached, selling plot");
        let change = StatusChange {
            status: PlotStatus::Sold,
            broker_id: None,
            buyer_name: None,
            buyer_phone: None,
            updated_by: input.received_by,
        };
        // The payment is already committed; a failed sale leaves the plot booked.
        match apply_transition(&state, &plot, change).await {
            Ok(sold) => plot = sold,
            Err(e) => {
                tracing::warn!(plot_id = id, error = %e, "Auto-sale failed, plot stays booked");
            }
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RecordedPayment { payment, plot },
        }),
    ))
}

/// GET /api/v1/payments/{id}/receipt
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentReceipt>>> {
    let receipt = PaymentRepo::receipt(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Payment", id))?;
    Ok(Json(DataResponse { data: receipt }))
}
