//! Repository for the `profiles` table.

use plotledger_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, full_name, role, upline_id, phone, email, is_active, created_at, updated_at";

/// Upper bound on the chain walked by [`ProfileRepo::chain_contains`].
const MAX_CHAIN_DEPTH: i32 = 100;

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile with an already validated role.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProfile,
        role: &str,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (full_name, role, upline_id, phone, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.full_name.trim())
            .bind(role)
            .bind(input.upline_id)
            .bind(&input.phone)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List profiles, optionally filtered by role, ordered by name.
    pub async fn list(
        pool: &PgPool,
        role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE ($1::TEXT IS NULL OR role = $1)
             ORDER BY full_name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(role)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Direct referrals of a profile.
    pub async fn list_downline(pool: &PgPool, id: DbId) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles WHERE upline_id = $1 ORDER BY full_name ASC, id ASC"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Point a profile at a new upline (or none). Returns `None` if the
    /// profile does not exist.
    pub async fn update_upline(
        pool: &PgPool,
        id: DbId,
        upline_id: Option<DbId>,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET upline_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(upline_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `target_id` is `start_id` itself or one of its uplines.
    ///
    /// Giving `target_id` the upline `start_id` closes a cycle exactly when
    /// this returns `true`.
    pub async fn chain_contains(
        pool: &PgPool,
        start_id: DbId,
        target_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "WITH RECURSIVE chain (id, upline_id, depth) AS (
                SELECT id, upline_id, 1 FROM profiles WHERE id = $1
                UNION ALL
                SELECT p.id, p.upline_id, c.depth + 1
                FROM profiles p
                JOIN chain c ON p.id = c.upline_id
                WHERE c.depth < $3
             )
             SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)",
        )
        .bind(start_id)
        .bind(target_id)
        .bind(MAX_CHAIN_DEPTH)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
