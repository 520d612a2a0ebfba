//! Repository for the `transactions` (ledger) table.

use plotledger_core::commission::NewLedgerEntry;
use plotledger_core::ledger::TransactionStatus;
use plotledger_core::types::{Amount, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::transaction::Transaction;

const COLUMNS: &str = "id, wallet_id, wallet_type, kind, amount, description, status, \
    plot_id, project_name, level, created_at, updated_at";

pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a ledger entry inside a transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &NewLedgerEntry,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions
                (wallet_id, wallet_type, kind, amount, description, status,
                 plot_id, project_name, level, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(entry.wallet_id)
            .bind(entry.wallet_type.as_str())
            .bind(entry.kind.as_str())
            .bind(entry.amount)
            .bind(&entry.description)
            .bind(entry.status.as_str())
            .bind(entry.plot_id)
            .bind(&entry.project_name)
            .bind(entry.level)
            .bind(entry.created_at)
            .fetch_one(conn)
            .await
    }

    /// Rewrite an entry's amount and description; `created_at` only when
    /// given. Returns the number of rows updated.
    pub async fn update_amount(
        conn: &mut PgConnection,
        id: DbId,
        amount: Amount,
        description: &str,
        created_at: Option<Timestamp>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions
             SET amount = $2, description = $3, created_at = COALESCE($4, created_at)
             WHERE id = $1",
        )
        .bind(id)
        .bind(amount)
        .bind(description)
        .bind(created_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark one entry reversed. Returns the number of rows updated.
    pub async fn reverse(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE transactions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(TransactionStatus::Reversed.as_str())
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Mark every remaining active entry of a plot reversed.
    pub async fn reverse_for_plot(
        conn: &mut PgConnection,
        plot_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET status = $2 WHERE plot_id = $1 AND status <> $2",
        )
        .bind(plot_id)
        .bind(TransactionStatus::Reversed.as_str())
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// The active entry for a `(plot, wallet, level)` key, if any.
    pub async fn find_active(
        pool: &PgPool,
        plot_id: DbId,
        wallet_id: DbId,
        level: i16,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE plot_id = $1 AND wallet_id = $2 AND level = $3 AND status <> 'reversed'"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(plot_id)
            .bind(wallet_id)
            .bind(level)
            .fetch_optional(pool)
            .await
    }

    /// Active entries of a plot, oldest first.
    pub async fn list_active_for_plot(
        pool: &PgPool,
        plot_id: DbId,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE plot_id = $1 AND status <> 'reversed'
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(plot_id)
            .fetch_all(pool)
            .await
    }

    /// Ledger of one wallet owner, newest first. Reversed entries included.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE wallet_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete every ledger entry. Returns the number of rows removed.
    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
