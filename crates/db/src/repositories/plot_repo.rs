//! Repository for the `plots` table.

use plotledger_core::plot::PlotStatus;
use plotledger_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::plot::{CreatePlot, Plot, PlotFilter, StatusChange, UpdatePlot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_name, block, plot_number, area_gaj, status, buyer_name, \
    buyer_phone, booking_amount, total_amount, paid_amount, paid_percentage, broker_id, \
    sale_price, updated_by, sold_at, deleted_at, created_at, updated_at";

/// Provides CRUD operations for plots.
pub struct PlotRepo;

impl PlotRepo {
    /// Insert a new `available` plot, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePlot) -> Result<Plot, sqlx::Error> {
        let query = format!(
            "INSERT INTO plots
                (project_name, block, plot_number, area_gaj, booking_amount, total_amount,
                 broker_id, sale_price, updated_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(input.project_name.trim())
            .bind(&input.block)
            .bind(input.plot_number.trim())
            .bind(input.area_gaj)
            .bind(input.booking_amount)
            .bind(input.total_amount)
            .bind(input.broker_id)
            .bind(input.sale_price)
            .bind(input.updated_by)
            .fetch_one(pool)
            .await
    }

    /// Find a plot by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plots WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find and row-lock a plot inside a transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plots WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List plots matching `filter`, newest first. Excludes soft-deleted rows.
    pub async fn list(
        pool: &PgPool,
        filter: &PlotFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Plot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plots
             WHERE deleted_at IS NULL
               AND ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR project_name = $2)
               AND ($3::BIGINT IS NULL OR broker_id = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(&filter.status)
            .bind(&filter.project_name)
            .bind(filter.broker_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All sold, non-deleted plots ordered by ID.
    pub async fn list_sold(pool: &PgPool) -> Result<Vec<Plot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plots
             WHERE status = $1 AND deleted_at IS NULL
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(PlotStatus::Sold.as_str())
            .fetch_all(pool)
            .await
    }

    /// Update descriptive and financial fields. Only non-`None` fields are
    /// applied; `paid_percentage` is the caller's recomputed value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlot,
        paid_percentage: f64,
    ) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!(
            "UPDATE plots SET
                project_name = COALESCE($2, project_name),
                block = COALESCE($3, block),
                plot_number = COALESCE($4, plot_number),
                area_gaj = COALESCE($5, area_gaj),
                buyer_name = COALESCE($6, buyer_name),
                buyer_phone = COALESCE($7, buyer_phone),
                booking_amount = COALESCE($8, booking_amount),
                total_amount = COALESCE($9, total_amount),
                broker_id = COALESCE($10, broker_id),
                sale_price = COALESCE($11, sale_price),
                updated_by = COALESCE($12, updated_by),
                paid_percentage = $13
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .bind(&input.project_name)
            .bind(&input.block)
            .bind(&input.plot_number)
            .bind(input.area_gaj)
            .bind(&input.buyer_name)
            .bind(&input.buyer_phone)
            .bind(input.booking_amount)
            .bind(input.total_amount)
            .bind(input.broker_id)
            .bind(input.sale_price)
            .bind(input.updated_by)
            .bind(paid_percentage)
            .fetch_optional(pool)
            .await
    }

    /// Persist a status change.
    ///
    /// Buyer details are kept (and optionally replaced) for booked and sold
    /// plots and cleared otherwise. `sold_at` is stamped on sale and cleared
    /// when the plot leaves `sold`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        change: &StatusChange,
    ) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!(
            "UPDATE plots SET
                status = $2,
                broker_id = COALESCE($3, broker_id),
                buyer_name = CASE WHEN $6 THEN COALESCE($4, buyer_name) ELSE NULL END,
                buyer_phone = CASE WHEN $6 THEN COALESCE($5, buyer_phone) ELSE NULL END,
                updated_by = COALESCE($7, updated_by),
                sold_at = CASE WHEN $2 = 'sold' THEN COALESCE(sold_at, NOW()) ELSE NULL END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .bind(change.status.as_str())
            .bind(change.broker_id)
            .bind(&change.buyer_name)
            .bind(&change.buyer_phone)
            .bind(change.status.keeps_buyer())
            .bind(change.updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Write new payment totals inside a transaction.
    pub async fn set_paid(
        conn: &mut PgConnection,
        id: DbId,
        paid_amount: f64,
        paid_percentage: f64,
    ) -> Result<Plot, sqlx::Error> {
        let query = format!(
            "UPDATE plots SET paid_amount = $2, paid_percentage = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .bind(paid_amount)
            .bind(paid_percentage)
            .fetch_one(conn)
            .await
    }

    /// Soft-delete a plot by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE plots SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
