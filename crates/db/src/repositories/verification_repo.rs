//! Repository for the `verifications` table.

use plotledger_core::types::DbId;
use plotledger_core::verification::VERIFICATION_PENDING;
use sqlx::PgPool;

use crate::models::verification::{CreateVerification, Verification, VerificationFilter};

const COLUMNS: &str = "id, profile_id, document_type, document_number, document_url, status, \
    rejection_reason, reviewed_by, reviewed_at, created_at, updated_at";

pub struct VerificationRepo;

impl VerificationRepo {
    /// Insert a pending submission. A second pending submission for the same
    /// profile violates `uq_verifications_pending_profile`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateVerification,
        document_number: &str,
    ) -> Result<Verification, sqlx::Error> {
        let query = format!(
            "INSERT INTO verifications (profile_id, document_type, document_number, document_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(input.profile_id)
            .bind(&input.document_type)
            .bind(document_number)
            .bind(&input.document_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Verification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM verifications WHERE id = $1");
        sqlx::query_as::<_, Verification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_pending_for_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Option<Verification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verifications WHERE profile_id = $1 AND status = $2"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(profile_id)
            .bind(VERIFICATION_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// List submissions, oldest first so the review queue is FIFO.
    pub async fn list(
        pool: &PgPool,
        filter: &VerificationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Verification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verifications
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR profile_id = $2)
             ORDER BY created_at ASC, id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(&filter.status)
            .bind(filter.profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record a review on a pending submission. Returns `None` if it was no
    /// longer pending.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        status: &str,
        reviewed_by: Option<DbId>,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Verification>, sqlx::Error> {
        let query = format!(
            "UPDATE verifications SET
                status = $2,
                reviewed_by = $3,
                rejection_reason = $4,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(id)
            .bind(status)
            .bind(reviewed_by)
            .bind(rejection_reason)
            .bind(VERIFICATION_PENDING)
            .fetch_optional(pool)
            .await
    }
}
