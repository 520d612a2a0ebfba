//! Repository for the `commissions` table.

use plotledger_core::commission::NewCommission;
use plotledger_core::types::{Amount, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::commission::{Commission, CommissionFilter};

const COLUMNS: &str = "id, plot_id, seller_id, seller_name, receiver_id, receiver_name, \
    level, amount, sale_area, is_reversed, reversed_at, created_at, updated_at";

pub struct CommissionRepo;

impl CommissionRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        row: &NewCommission,
    ) -> Result<Commission, sqlx::Error> {
        let query = format!(
            "INSERT INTO commissions
                (plot_id, seller_id, seller_name, receiver_id, receiver_name,
                 level, amount, sale_area, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commission>(&query)
            .bind(row.plot_id)
            .bind(row.seller_id)
            .bind(&row.seller_name)
            .bind(row.receiver_id)
            .bind(&row.receiver_name)
            .bind(row.level)
            .bind(row.amount)
            .bind(row.sale_area)
            .bind(row.created_at)
            .fetch_one(conn)
            .await
    }

    /// Rewrite a row in place; `created_at` only when given. Returns the
    /// number of rows updated.
    pub async fn update_amount(
        conn: &mut PgConnection,
        id: DbId,
        amount: Amount,
        sale_area: f64,
        names: (&str, &str),
        created_at: Option<Timestamp>,
    ) -> Result<u64, sqlx::Error> {
        let (seller_name, receiver_name) = names;
        let result = sqlx::query(
            "UPDATE commissions SET
                amount = $2,
                sale_area = $3,
                seller_name = $4,
                receiver_name = $5,
                created_at = COALESCE($6, created_at)
             WHERE id = $1",
        )
        .bind(id)
        .bind(amount)
        .bind(sale_area)
        .bind(seller_name)
        .bind(receiver_name)
        .bind(created_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flag a row reversed. Returns the number of rows updated.
    pub async fn reverse(
        conn: &mut PgConnection,
        id: DbId,
        reversed_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE commissions SET is_reversed = true, reversed_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(reversed_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_active(
        pool: &PgPool,
        plot_id: DbId,
        receiver_id: DbId,
        level: i16,
    ) -> Result<Option<Commission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commissions
             WHERE plot_id = $1 AND receiver_id = $2 AND level = $3 AND NOT is_reversed"
        );
        sqlx::query_as::<_, Commission>(&query)
            .bind(plot_id)
            .bind(receiver_id)
            .bind(level)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_active_for_plot(
        pool: &PgPool,
        plot_id: DbId,
    ) -> Result<Vec<Commission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commissions
             WHERE plot_id = $1 AND NOT is_reversed
             ORDER BY level ASC, id ASC"
        );
        sqlx::query_as::<_, Commission>(&query)
            .bind(plot_id)
            .fetch_all(pool)
            .await
    }

    /// List commissions, newest first. Reversed rows only when requested.
    pub async fn list(
        pool: &PgPool,
        filter: &CommissionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Commission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commissions
             WHERE ($1::BIGINT IS NULL OR plot_id = $1)
               AND ($2::BIGINT IS NULL OR receiver_id = $2)
               AND ($3 OR NOT is_reversed)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Commission>(&query)
            .bind(filter.plot_id)
            .bind(filter.receiver_id)
            .bind(filter.include_reversed)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete every commission row. Returns the number of rows removed.
    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM commissions").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
