//! Repository for the `payments` table.

use plotledger_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::payment::{CreatePayment, Payment, PaymentReceipt};

const COLUMNS: &str = "id, plot_id, amount, method, reference, receipt_number, received_by, \
    paid_at, created_at, updated_at";

pub struct PaymentRepo;

impl PaymentRepo {
    /// Sequence number the next payment of a plot gets (1-based).
    ///
    /// Callers hold the plot row lock so concurrent payments cannot reuse it.
    pub async fn next_sequence(conn: &mut PgConnection, plot_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) + 1 FROM payments WHERE plot_id = $1")
            .bind(plot_id)
            .fetch_one(conn)
            .await?;
        Ok(row.0)
    }

    pub async fn create(
        conn: &mut PgConnection,
        plot_id: DbId,
        input: &CreatePayment,
        receipt_number: &str,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (plot_id, amount, method, reference, receipt_number, received_by, paid_at)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(plot_id)
            .bind(input.amount)
            .bind(&input.method)
            .bind(&input.reference)
            .bind(receipt_number)
            .bind(input.received_by)
            .bind(input.paid_at)
            .fetch_one(conn)
            .await
    }

    /// Payments of a plot in the order they were received.
    pub async fn list_for_plot(pool: &PgPool, plot_id: DbId) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE plot_id = $1 ORDER BY paid_at ASC, id ASC"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(plot_id)
            .fetch_all(pool)
            .await
    }

    /// Receipt data for one payment.
    pub async fn receipt(pool: &PgPool, id: DbId) -> Result<Option<PaymentReceipt>, sqlx::Error> {
        sqlx::query_as::<_, PaymentReceipt>(
            "SELECT
                pay.id AS payment_id,
                pay.receipt_number,
                pay.amount,
                pay.method,
                pay.reference,
                pay.paid_at,
                p.id AS plot_id,
                p.project_name,
                p.block,
                p.plot_number,
                p.area_gaj,
                p.buyer_name,
                p.buyer_phone,
                p.total_amount,
                p.paid_amount,
                p.paid_percentage,
                GREATEST(p.total_amount - p.paid_amount, 0) AS balance_due
             FROM payments pay
             JOIN plots p ON p.id = pay.plot_id
             WHERE pay.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
