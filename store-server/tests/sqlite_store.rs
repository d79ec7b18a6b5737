//! SQLite order store contract tests, run against a real database file in a
//! temp directory.

use store_server::db::{DbService, SqliteOrderStore};
use store_server::orders::model::{
    LineItem, Order, OrderFilter, OrderStatus, PaymentMethod, PaymentStatus,
};
use store_server::orders::store::{
    MarkPaidOutcome, OrderStore, RepoError, TransitionOutcome,
};
use store_server::utils::time::now_millis;

async fn temp_store() -> (SqliteOrderStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("orders.db");
    let db = DbService::new(path.to_str().unwrap())
        .await
        .expect("db init");
    (SqliteOrderStore::new(db.pool), dir)
}

fn order(order_id: &str, owner: &str, session: Option<&str>, created_at: i64) -> Order {
    Order {
        order_id: order_id.to_string(),
        owner: Some(owner.to_string()),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: "555".into(),
        address: "12 Analytical Way".into(),
        notes: Some("leave at the door".into()),
        items: vec![
            LineItem {
                product_id: "watch-chrono".into(),
                name: "Chronograph".into(),
                unit_price: 10_000,
                quantity: 2,
                description: None,
                image: Some("/img/chrono.webp".into()),
            },
            LineItem {
                product_id: "watch-field".into(),
                name: "Field Watch".into(),
                unit_price: 5_000,
                quantity: 1,
                description: Some("olive strap".into()),
                image: None,
            },
        ],
        subtotal: 25_000,
        tax_amount: 2_000,
        shipping_charge: 0,
        final_amount: 27_000,
        payment_method: PaymentMethod::OnlineGateway,
        payment_status: PaymentStatus::Unpaid,
        order_status: OrderStatus::Pending,
        gateway_session_ref: session.map(str::to_string),
        gateway_payment_ref: None,
        created_at,
    }
}

#[tokio::test]
async fn insert_and_read_back_round_trip() {
    let (store, _dir) = temp_store().await;
    let original = order("ORD-1", "user-1", Some("cs_1"), now_millis());

    store.insert(&original).await.unwrap();

    let by_id = store.find_by_id("ORD-1").await.unwrap().unwrap();
    assert_eq!(by_id, original);

    let by_session = store.find_by_session_ref("cs_1").await.unwrap().unwrap();
    assert_eq!(by_session, original);

    assert!(store.find_by_id("ORD-2").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_order_id_is_a_unique_violation() {
    let (store, _dir) = temp_store().await;
    let first = order("ORD-1", "user-1", None, now_millis());
    store.insert(&first).await.unwrap();

    let err = store.insert(&first).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn duplicate_session_ref_is_a_unique_violation() {
    let (store, _dir) = temp_store().await;
    store
        .insert(&order("ORD-1", "user-1", Some("cs_1"), now_millis()))
        .await
        .unwrap();

    let err = store
        .insert(&order("ORD-2", "user-1", Some("cs_1"), now_millis()))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn owner_listing_is_scoped_and_newest_first() {
    let (store, _dir) = temp_store().await;
    let base = now_millis();
    store
        .insert(&order("ORD-old", "user-1", None, base - 10_000))
        .await
        .unwrap();
    store
        .insert(&order("ORD-new", "user-1", None, base))
        .await
        .unwrap();
    store
        .insert(&order("ORD-other", "user-2", None, base))
        .await
        .unwrap();

    let mine = store.find_by_owner("user-1").await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].order_id, "ORD-new");
    assert_eq!(mine[1].order_id, "ORD-old");
}

#[tokio::test]
async fn filtered_listing_matches_status_and_substrings() {
    let (store, _dir) = temp_store().await;
    let base = now_millis();

    let pending = order("ORD-aaa", "user-1", None, base - 1_000);
    store.insert(&pending).await.unwrap();

    let mut confirmed = order("ORD-bbb", "user-2", None, base);
    confirmed.order_status = OrderStatus::Confirmed;
    confirmed.name = "Grace Hopper".into();
    confirmed.email = "grace@example.com".into();
    confirmed.items[0].name = "Deep Diver".into();
    store.insert(&confirmed).await.unwrap();

    // Exact status filter
    let only_pending = store
        .find_filtered(&OrderFilter {
            status: Some(OrderStatus::Pending),
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(only_pending.len(), 1);
    assert_eq!(only_pending[0].order_id, "ORD-aaa");

    // "ORD-" prefix matches both, case-insensitively, newest first
    let all = store
        .find_filtered(&OrderFilter {
            status: None,
            search: Some("ord-".into()),
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].order_id, "ORD-bbb");

    // Item-name substring reaches inside the JSON items column
    let by_item = store
        .find_filtered(&OrderFilter {
            status: None,
            search: Some("deep".into()),
        })
        .await
        .unwrap();
    assert_eq!(by_item.len(), 1);
    assert_eq!(by_item[0].order_id, "ORD-bbb");

    // Contact name and email substrings
    let by_name = store
        .find_filtered(&OrderFilter {
            status: None,
            search: Some("HOPPER".into()),
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let none = store
        .find_filtered(&OrderFilter {
            status: None,
            search: Some("no-such-thing".into()),
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn mark_paid_applies_once_and_respects_cancellation() {
    let (store, _dir) = temp_store().await;
    store
        .insert(&order("ORD-1", "user-1", Some("cs_1"), now_millis()))
        .await
        .unwrap();

    let MarkPaidOutcome::Updated(updated) =
        store.mark_paid("cs_1", Some("pi_1")).await.unwrap()
    else {
        panic!("expected Updated");
    };
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert_eq!(updated.order_status, OrderStatus::Confirmed);
    assert_eq!(updated.gateway_payment_ref.as_deref(), Some("pi_1"));

    // Second application is the idempotent no-op
    let MarkPaidOutcome::AlreadyPaid(same) =
        store.mark_paid("cs_1", Some("pi_1")).await.unwrap()
    else {
        panic!("expected AlreadyPaid");
    };
    assert_eq!(same, updated);

    // A cancelled order refuses late confirmation
    store
        .insert(&order("ORD-2", "user-1", Some("cs_2"), now_millis()))
        .await
        .unwrap();
    store
        .transition_status("ORD-2", OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap();
    let MarkPaidOutcome::StatusConflict(current) =
        store.mark_paid("cs_2", None).await.unwrap()
    else {
        panic!("expected StatusConflict");
    };
    assert_eq!(current.payment_status, PaymentStatus::Unpaid);

    // Unknown session
    assert!(matches!(
        store.mark_paid("cs_missing", None).await.unwrap(),
        MarkPaidOutcome::NotFound
    ));
}

#[tokio::test]
async fn transition_is_a_compare_and_set() {
    let (store, _dir) = temp_store().await;
    store
        .insert(&order("ORD-1", "user-1", None, now_millis()))
        .await
        .unwrap();

    let TransitionOutcome::Updated(updated) = store
        .transition_status("ORD-1", OrderStatus::Pending, OrderStatus::Confirmed)
        .await
        .unwrap()
    else {
        panic!("expected Updated");
    };
    assert_eq!(updated.order_status, OrderStatus::Confirmed);

    // Stale expectation loses cleanly and reports the winner
    let TransitionOutcome::Conflict(current) = store
        .transition_status("ORD-1", OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap()
    else {
        panic!("expected Conflict");
    };
    assert_eq!(current.order_status, OrderStatus::Confirmed);

    assert!(matches!(
        store
            .transition_status("ORD-nope", OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap(),
        TransitionOutcome::NotFound
    ));
}

#[tokio::test]
async fn delete_by_id_reports_whether_a_row_was_removed() {
    let (store, _dir) = temp_store().await;
    store
        .insert(&order("ORD-1", "user-1", None, now_millis()))
        .await
        .unwrap();

    assert!(store.delete_by_id("ORD-1").await.unwrap());
    assert!(!store.delete_by_id("ORD-1").await.unwrap());
    assert!(store.find_by_id("ORD-1").await.unwrap().is_none());
}
