//! Repository for the `wallets` table.
//!
//! Balance arithmetic is done in Rust on [`WalletBalance`] against a row
//! locked with `FOR UPDATE`, so rounding and the zero floor follow the same
//! rules everywhere.

use plotledger_core::ledger::{WalletBalance, WalletType};
use plotledger_core::types::{Amount, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::wallet::Wallet;

const COLUMNS: &str =
    "id, owner_id, direct_balance, downline_balance, total_balance, created_at, updated_at";

pub struct WalletRepo;

impl WalletRepo {
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wallets WHERE owner_id = $1");
        sqlx::query_as::<_, Wallet>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the wallet if missing, then lock it and return its balance.
    pub async fn lock_balance(
        conn: &mut PgConnection,
        owner_id: DbId,
    ) -> Result<WalletBalance, sqlx::Error> {
        sqlx::query("INSERT INTO wallets (owner_id) VALUES ($1) ON CONFLICT (owner_id) DO NOTHING")
            .bind(owner_id)
            .execute(&mut *conn)
            .await?;

        let (direct, downline, total): (f64, f64, f64) = sqlx::query_as(
            "SELECT direct_balance, downline_balance, total_balance
             FROM wallets WHERE owner_id = $1 FOR UPDATE",
        )
        .bind(owner_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(WalletBalance {
            direct,
            downline,
            total,
        })
    }

    async fn store_balance(
        conn: &mut PgConnection,
        owner_id: DbId,
        balance: &WalletBalance,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE wallets
             SET direct_balance = $2, downline_balance = $3, total_balance = $4
             WHERE owner_id = $1",
        )
        .bind(owner_id)
        .bind(balance.direct)
        .bind(balance.downline)
        .bind(balance.total)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Add `amount` to one component. Returns the new balance.
    pub async fn credit(
        conn: &mut PgConnection,
        owner_id: DbId,
        wallet_type: WalletType,
        amount: Amount,
    ) -> Result<WalletBalance, sqlx::Error> {
        let mut balance = Self::lock_balance(&mut *conn, owner_id).await?;
        balance.credit(wallet_type, amount);
        Self::store_balance(conn, owner_id, &balance).await?;
        Ok(balance)
    }

    /// Remove `amount` from one component, flooring it at zero. Returns the
    /// new balance.
    pub async fn debit(
        conn: &mut PgConnection,
        owner_id: DbId,
        wallet_type: WalletType,
        amount: Amount,
    ) -> Result<WalletBalance, sqlx::Error> {
        let mut balance = Self::lock_balance(&mut *conn, owner_id).await?;
        balance.debit(wallet_type, amount);
        Self::store_balance(conn, owner_id, &balance).await?;
        Ok(balance)
    }

    /// Zero every wallet. Returns the number of wallets touched.
    pub async fn reset_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wallets SET direct_balance = 0, downline_balance = 0, total_balance = 0",
        )
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
