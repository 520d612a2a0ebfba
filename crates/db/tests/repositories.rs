//! Integration tests for the repository layer.
//!
//! Exercises the repositories against a real database:
//! - Plot create, list and soft delete
//! - Unique constraint on (project_name, plot_number)
//! - Receipt numbering and the joined receipt view
//! - Upline chain lookups
//! - Wallet credit and floored debit

use plotledger_core::ledger::WalletType;
use plotledger_core::payment::receipt_number;
use plotledger_core::plot::PlotStatus;
use plotledger_core::roles::ROLE_BROKER;
use plotledger_db::models::payment::CreatePayment;
use plotledger_db::models::plot::{CreatePlot, PlotFilter, StatusChange};
use plotledger_db::models::profile::CreateProfile;
use plotledger_db::repositories::{PaymentRepo, PlotRepo, ProfileRepo, WalletRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_profile(name: &str, upline_id: Option<i64>) -> CreateProfile {
    CreateProfile {
        full_name: name.to_string(),
        role: None,
        upline_id,
        phone: None,
        email: None,
    }
}

fn new_plot(project: &str, number: &str) -> CreatePlot {
    CreatePlot {
        project_name: project.to_string(),
        block: Some("A".to_string()),
        plot_number: number.to_string(),
        area_gaj: 150.0,
        booking_amount: Some(50_000.0),
        total_amount: Some(1_000_000.0),
        broker_id: None,
        sale_price: None,
        updated_by: None,
    }
}

fn cash(amount: f64) -> CreatePayment {
    CreatePayment {
        amount,
        method: "cash".to_string(),
        reference: None,
        received_by: None,
        paid_at: None,
    }
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_list_plots(pool: PgPool) {
    let a = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();
    PlotRepo::create(&pool, &new_plot("Green Valley", "A-2"))
        .await
        .unwrap();
    PlotRepo::create(&pool, &new_plot("Sunrise Enclave", "B-1"))
        .await
        .unwrap();

    assert_eq!(a.status, "available");
    assert_eq!(a.paid_amount, 0.0);
    assert!(a.sold_at.is_none());

    let filter = PlotFilter {
        project_name: Some("Green Valley".to_string()),
        ..Default::default()
    };
    let plots = PlotRepo::list(&pool, &filter, 50, 0).await.unwrap();
    assert_eq!(plots.len(), 2);
    assert!(plots.iter().all(|p| p.project_name == "Green Valley"));

    let all = PlotRepo::list(&pool, &PlotFilter::default(), 50, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let page = PlotRepo::list(&pool, &PlotFilter::default(), 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_plot_number_rejected(pool: PgPool) {
    PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();
    let err = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_plots_project_number"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_plot_and_frees_number(pool: PgPool) {
    let plot = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();

    assert!(PlotRepo::soft_delete(&pool, plot.id).await.unwrap());
    assert!(!PlotRepo::soft_delete(&pool, plot.id).await.unwrap());
    assert!(PlotRepo::find_by_id(&pool, plot.id).await.unwrap().is_none());

    let again = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();
    assert_ne!(again.id, plot.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_status_stamps_and_clears_sale(pool: PgPool) {
    let plot = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();

    let sold = PlotRepo::set_status(
        &pool,
        plot.id,
        &StatusChange {
            status: PlotStatus::Sold,
            broker_id: None,
            buyer_name: Some("Meena".to_string()),
            buyer_phone: Some("9876543210".to_string()),
            updated_by: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(sold.status, "sold");
    assert_eq!(sold.buyer_name.as_deref(), Some("Meena"));
    assert!(sold.sold_at.is_some());

    let available = PlotRepo::set_status(
        &pool,
        plot.id,
        &StatusChange {
            status: PlotStatus::Available,
            broker_id: None,
            buyer_name: None,
            buyer_phone: None,
            updated_by: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(available.status, "available");
    assert!(available.buyer_name.is_none());
    assert!(available.sold_at.is_none());
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_receipt_numbers_follow_plot_sequence(pool: PgPool) {
    let plot = PlotRepo::create(&pool, &new_plot("Green Valley", "A-1"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    for amount in [100_000.0, 150_000.0] {
        let seq = PaymentRepo::next_sequence(&mut *tx, plot.id).await.unwrap();
        PaymentRepo::create(&mut *tx, plot.id, &cash(amount), &receipt_number(plot.id, seq))
            .await
            .unwrap();
    }
    PlotRepo::set_paid(&mut *tx, plot.id, 250_000.0, 25.0)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let payments = PaymentRepo::list_for_plot(&pool, plot.id).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].receipt_number, format!("RCPT-{}-0001", plot.id));
    assert_eq!(payments[1].receipt_number, format!("RCPT-{}-0002", plot.id));

    let receipt = PaymentRepo::receipt(&pool, payments[1].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.amount, 150_000.0);
    assert_eq!(receipt.paid_amount, 250_000.0);
    assert_eq!(receipt.paid_percentage, 25.0);
    assert_eq!(receipt.balance_due, 750_000.0);
    assert_eq!(receipt.project_name, "Green Valley");
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_chain_contains_walks_uplines(pool: PgPool) {
    let asha = ProfileRepo::create(&pool, &new_profile("Asha", None), ROLE_BROKER)
        .await
        .unwrap();
    let bhavesh = ProfileRepo::create(&pool, &new_profile("Bhavesh", Some(asha.id)), ROLE_BROKER)
        .await
        .unwrap();
    let chetan = ProfileRepo::create(&pool, &new_profile("Chetan", Some(bhavesh.id)), ROLE_BROKER)
        .await
        .unwrap();

    assert!(ProfileRepo::chain_contains(&pool, chetan.id, asha.id).await.unwrap());
    assert!(ProfileRepo::chain_contains(&pool, chetan.id, chetan.id).await.unwrap());
    assert!(!ProfileRepo::chain_contains(&pool, asha.id, chetan.id).await.unwrap());

    let downline = ProfileRepo::list_downline(&pool, asha.id).await.unwrap();
    assert_eq!(downline.len(), 1);
    assert_eq!(downline[0].id, bhavesh.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_cannot_be_own_upline(pool: PgPool) {
    let asha = ProfileRepo::create(&pool, &new_profile("Asha", None), ROLE_BROKER)
        .await
        .unwrap();
    let result = ProfileRepo::update_upline(&pool, asha.id, Some(asha.id)).await;
    assert!(result.is_err(), "Self-referencing upline should fail");
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wallet_credit_and_floored_debit(pool: PgPool) {
    let asha = ProfileRepo::create(&pool, &new_profile("Asha", None), ROLE_BROKER)
        .await
        .unwrap();
    assert!(WalletRepo::find_by_owner(&pool, asha.id).await.unwrap().is_none());

    let mut tx = pool.begin().await.unwrap();
    WalletRepo::credit(&mut *tx, asha.id, WalletType::Direct, 1_000.0)
        .await
        .unwrap();
    WalletRepo::credit(&mut *tx, asha.id, WalletType::Downline, 400.0)
        .await
        .unwrap();
    let balance = WalletRepo::debit(&mut *tx, asha.id, WalletType::Downline, 900.0)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(balance.direct, 1_000.0);
    assert_eq!(balance.downline, 0.0);
    assert_eq!(balance.total, 1_000.0);

    let wallet = WalletRepo::find_by_owner(&pool, asha.id).await.unwrap().unwrap();
    assert_eq!(wallet.total_balance, 1_000.0);
}
