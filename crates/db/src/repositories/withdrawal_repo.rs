//! Repository for the `withdrawal_requests` table.

use plotledger_core::types::DbId;
use plotledger_core::withdrawal::WITHDRAWAL_PENDING;
use sqlx::{PgConnection, PgPool};

use crate::models::withdrawal::{CreateWithdrawal, WithdrawalFilter, WithdrawalRequest};

const COLUMNS: &str =
    "id, profile_id, amount, status, note, decided_by, decided_at, created_at, updated_at";

pub struct WithdrawalRepo;

impl WithdrawalRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWithdrawal,
    ) -> Result<WithdrawalRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO withdrawal_requests (profile_id, amount, note)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WithdrawalRequest>(&query)
            .bind(input.profile_id)
            .bind(input.amount)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WithdrawalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM withdrawal_requests WHERE id = $1");
        sqlx::query_as::<_, WithdrawalRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find and row-lock a request inside a transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<WithdrawalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM withdrawal_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, WithdrawalRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List requests, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &WithdrawalFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WithdrawalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM withdrawal_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR profile_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, WithdrawalRequest>(&query)
            .bind(&filter.status)
            .bind(filter.profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record a decision on a pending request. Returns `None` if the request
    /// was no longer pending.
    pub async fn decide(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
        decided_by: Option<DbId>,
        note: Option<&str>,
    ) -> Result<Option<WithdrawalRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE withdrawal_requests SET
                status = $2,
                decided_by = $3,
                note = COALESCE($4, note),
                decided_at = NOW()
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WithdrawalRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(decided_by)
            .bind(note)
            .bind(WITHDRAWAL_PENDING)
            .fetch_optional(conn)
            .await
    }
}
