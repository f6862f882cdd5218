//! 订单生命周期端到端测试
//!
//! 覆盖支付状态机的全部迁移，以及兑换协议的各个失败分支。

mod common;

use common::{engine, id_string, memory_db, sample_draft, seed_event};
use ticket_server::db::models::PaymentStatus;
use ticket_server::db::repository::{OrderRepository, record_id};
use ticket_server::orders::OrderError;
use ticket_server::utils::time::now_millis;

#[tokio::test]
async fn end_to_end_checkout_validate_redeem() {
    let db = memory_db().await;
    let (lifecycle, redemption) = engine(&db);
    let event = seed_event(&db, now_millis() + 86_400_000).await;

    // Create: pending, no token, instructions for the chosen channel
    let (order, instructions) = lifecycle
        .create(sample_draft(&id_string(&event)))
        .await
        .expect("create should succeed");
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_amount, 20000.0);
    assert!(order.token.is_none());
    assert!(!order.token_used);
    assert_eq!(instructions.ussd, "*150#");

    let order_id = order.id.as_ref().unwrap().to_string();

    // Validate: token attached atomically with status + timestamp
    let (validated, _email_sent) = lifecycle.validate(&order_id).await.expect("validate");
    assert_eq!(validated.payment_status, PaymentStatus::Validated);
    assert!(validated.validated_at.is_some());
    let token = validated.token.clone().expect("token must be present");

    // Re-validation is a conflict and must not mint a new token
    let err = lifecycle.validate(&order_id).await.unwrap_err();
    assert!(matches!(err, OrderError::AlreadyValidated));
    let reread = OrderRepository::new(db.clone())
        .find_by_id(&record_id("order", &order_id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.token.as_deref(), Some(token.as_str()));

    // Redeem once: succeeds and returns the event
    let (redeemed, redeemed_event) = redemption.redeem(&token).await.expect("first redemption");
    assert!(redeemed.token_used);
    assert!(redeemed.token_used_at.is_some());
    assert_eq!(
        redeemed_event.expect("event populated").title,
        "Acoustic Night"
    );

    // Redeem twice: AlreadyUsed
    let err = redemption.redeem(&token).await.unwrap_err();
    assert!(matches!(err, OrderError::TokenAlreadyUsed));

    // A fabricated token never resolves
    let err = redemption.redeem("TK-000000-DEADBEEF").await.unwrap_err();
    assert!(matches!(err, OrderError::TokenNotFound));
}

#[tokio::test]
async fn create_preconditions() {
    let db = memory_db().await;
    let (lifecycle, _) = engine(&db);
    let event = seed_event(&db, now_millis() + 86_400_000).await;
    let event_id = id_string(&event);

    // Unknown event
    let mut draft = sample_draft("event:doesnotexist");
    draft.customer_email = None;
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::EventNotFound(_)));

    // Unknown payment method
    let mut draft = sample_draft(&event_id);
    draft.payment_method = "cash".to_string();
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::Invalid(_)));

    // Empty ticket lines
    let mut draft = sample_draft(&event_id);
    draft.tickets.clear();
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::Invalid(_)));

    // Zero quantity
    let mut draft = sample_draft(&event_id);
    draft.tickets[0].quantity = 0;
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::Invalid(_)));

    // Missing customer name
    let mut draft = sample_draft(&event_id);
    draft.customer_name = "  ".to_string();
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::Invalid(_)));
}

#[tokio::test]
async fn cancel_is_an_unconditional_reset() {
    let db = memory_db().await;
    let (lifecycle, redemption) = engine(&db);
    let event = seed_event(&db, now_millis() + 86_400_000).await;

    let (order, _) = lifecycle
        .create(sample_draft(&id_string(&event)))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let (validated, _) = lifecycle.validate(&order_id).await.unwrap();
    let token = validated.token.clone().unwrap();

    // Cancel a validated order: everything cleared
    let cancelled = lifecycle.cancel(&order_id).await.unwrap();
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert!(cancelled.token.is_none());
    assert!(!cancelled.token_used);
    assert!(cancelled.token_used_at.is_none());
    assert!(cancelled.validated_at.is_none());

    // The revoked token no longer resolves
    let err = redemption.redeem(&token).await.unwrap_err();
    assert!(matches!(err, OrderError::TokenNotFound));

    // Cancelling again is still fine (unconditional)
    let cancelled = lifecycle.cancel(&order_id).await.unwrap();
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
}

// Cancellation is not terminal for the administrator: a cancelled
// order may be validated again and receives a fresh token.
#[tokio::test]
async fn cancelled_order_can_be_revalidated() {
    let db = memory_db().await;
    let (lifecycle, redemption) = engine(&db);
    let event = seed_event(&db, now_millis() + 86_400_000).await;

    let (order, _) = lifecycle
        .create(sample_draft(&id_string(&event)))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let (first, _) = lifecycle.validate(&order_id).await.unwrap();
    let first_token = first.token.clone().unwrap();

    lifecycle.cancel(&order_id).await.unwrap();

    let (second, _) = lifecycle.validate(&order_id).await.unwrap();
    let second_token = second.token.clone().unwrap();
    assert_eq!(second.payment_status, PaymentStatus::Validated);
    assert_ne!(first_token, second_token);

    // Only the fresh token is redeemable
    assert!(redemption.redeem(&first_token).await.is_err());
    assert!(redemption.redeem(&second_token).await.is_ok());
}

// Hardening switch: by default the client-supplied total is trusted;
// with the policy on, a mismatching total is rejected at creation.
#[tokio::test]
async fn total_consistency_policy_when_enabled() {
    use std::sync::Arc;
    use ticket_server::notify::NoopNotifier;
    use ticket_server::orders::{LifecyclePolicy, OrderLifecycle};

    let db = memory_db().await;
    let event = seed_event(&db, now_millis() + 86_400_000).await;

    let policy = LifecyclePolicy {
        enforce_total_consistency: true,
        ..Default::default()
    };
    let lifecycle = OrderLifecycle::new(db.clone(), Arc::new(NoopNotifier), policy);

    // Matching total: 1 × 20000
    let draft = common::sample_draft(&id_string(&event));
    assert!(lifecycle.create(draft).await.is_ok());

    // Mismatching total
    let mut draft = common::sample_draft(&id_string(&event));
    draft.total_amount = 5000.0;
    let err = lifecycle.create(draft).await.unwrap_err();
    assert!(matches!(err, OrderError::Invalid(_)));
}

#[tokio::test]
async fn validate_missing_order_is_not_found() {
    let db = memory_db().await;
    let (lifecycle, _) = engine(&db);

    let err = lifecycle.validate("order:doesnotexist").await.unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));

    let err = lifecycle.cancel("order:doesnotexist").await.unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}
