//! 并发兑换测试 - exactly-once
//!
//! 同一令牌的并发兑换恰好一个成功，其余必须观察到 AlreadyUsed。

mod common;

use std::sync::Arc;

use common::{engine, id_string, memory_db, sample_draft, seed_event};
use ticket_server::orders::{OrderError, RedemptionService};
use ticket_server::utils::time::now_millis;

const CONTENDERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_redemption_is_exactly_once() {
    let db = memory_db().await;
    let (lifecycle, redemption) = engine(&db);
    let event = seed_event(&db, now_millis() + 86_400_000).await;

    let (order, _) = lifecycle
        .create(sample_draft(&id_string(&event)))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();
    let (validated, _) = lifecycle.validate(&order_id).await.unwrap();
    let token = validated.token.unwrap();

    let redemption = Arc::new(redemption);
    let mut handles = Vec::with_capacity(CONTENDERS);
    for _ in 0..CONTENDERS {
        let redemption: Arc<RedemptionService> = redemption.clone();
        let token = token.clone();
        handles.push(tokio::spawn(
            async move { redemption.redeem(&token).await },
        ));
    }

    let mut successes = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.expect("task must not panic") {
            Ok((order, _)) => {
                assert!(order.token_used);
                successes += 1;
            }
            Err(OrderError::TokenAlreadyUsed) => already_used += 1,
            Err(other) => panic!("unexpected redemption outcome: {other:?}"),
        }
    }

    assert_eq!(successes, 1, "exactly one contender may redeem");
    assert_eq!(already_used, CONTENDERS - 1);

    // No interleaving may leave the token unredeemed
    let err = redemption.redeem(&token).await.unwrap_err();
    assert!(matches!(err, OrderError::TokenAlreadyUsed));
}
