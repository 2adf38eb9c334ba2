//! Position boards end to end: drop, batch PATCH, rollback, refetch.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;
use u1r_admin::services::{DropOutcome, Level, NoticeLog, ProductBoard, SubcategoryBoard};
use u1r_core::positions::{DropEvent, GroupKey, MoveRejected};
use u1r_core::{CategoryId, Mode, ProductId, SubcategoryId};
use u1r_integration_tests::{FakeCatalogStore, category, product, subcategory};

async fn grains() -> FakeCatalogStore {
    let server = FakeCatalogStore::start().await;
    server.set_categories(vec![category("c1", "Grains", true)]);
    server.set_subcategories(vec![
        subcategory("s1", "Rice", "c1", 1),
        subcategory("s2", "Dal", "c1", 2),
        subcategory("s3", "Millets", "c1", 3),
    ]);
    server.set_products(vec![
        product("A", "c1", Some("s1"), 1),
        product("B", "c1", Some("s1"), 2),
        product("C", "c1", Some("s1"), 3),
        product("D", "c1", Some("s2"), 1),
    ]);
    server
}

fn ids(board_products: &[u1r_core::Product]) -> Vec<&str> {
    board_products.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_product_drop_patches_affected_group_with_bearer() {
    let server = grains().await;
    let notices = Arc::new(NoticeLog::default());
    let board = ProductBoard::new(server.client(), Mode::Wholesale, notices.clone());
    board.load().await.expect("load");
    board
        .select_category(&CategoryId::new("c1"))
        .await
        .expect("select");

    let outcome = board
        .drop_item(&DropEvent::new(ProductId::new("C"), Some(ProductId::new("A"))))
        .await
        .expect("drop saved");

    assert!(matches!(outcome, DropOutcome::Saved { ref group, .. } if group == &GroupKey::new("Rice")));

    let patches = server.requests_to(&Method::PATCH, "/api/admin/product/positions");
    assert_eq!(patches.len(), 1);
    let patch = patches.first().expect("patch");
    assert_eq!(
        patch.json(),
        json!([
            { "id": "C", "position": 1 },
            { "id": "A", "position": 2 },
            { "id": "B", "position": 3 },
        ])
    );
    assert_eq!(
        patch.authorization.as_deref(),
        Some(format!("Bearer {}", server.token()).as_str())
    );

    // Refetched after the save.
    let gets = server.requests_to(&Method::GET, "/api/admin/product");
    assert_eq!(gets.len(), 2);

    let grouping = board.grouping().await;
    let rice = grouping.group(&GroupKey::new("Rice")).expect("rice group");
    assert_eq!(ids(&rice.items), vec!["C", "A", "B"]);
    assert!(notices.take().iter().all(|n| n.level != Level::Error));
}

#[tokio::test]
async fn test_failed_batch_restores_order_and_notifies() {
    let server = grains().await;
    server.fail(
        Method::PATCH,
        "/api/admin/product/positions",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false }),
    );
    let notices = Arc::new(NoticeLog::default());
    let board = ProductBoard::new(server.client(), Mode::Wholesale, notices.clone());
    board.load().await.expect("load");
    board
        .select_category(&CategoryId::new("c1"))
        .await
        .expect("select");
    let before = board.products().await;

    let err = board
        .drop_item(&DropEvent::new(ProductId::new("B"), Some(ProductId::new("A"))))
        .await
        .expect_err("batch fails");

    assert_eq!(err.user_message(), "Unable to update positions");
    assert_eq!(board.products().await, before);
    assert!(!board.is_saving());

    let notices = notices.take();
    assert_eq!(notices.len(), 1);
    let notice = notices.first().expect("notice");
    assert_eq!(notice.level, Level::Error);
    assert_eq!(notice.message, "Unable to update positions");
}

#[tokio::test]
async fn test_cross_group_drop_sends_nothing() {
    let server = grains().await;
    let board = ProductBoard::new(server.client(), Mode::Wholesale, Arc::new(NoticeLog::default()));
    board.load().await.expect("load");
    board
        .select_category(&CategoryId::new("c1"))
        .await
        .expect("select");

    let outcome = board
        .drop_item(&DropEvent::new(ProductId::new("D"), Some(ProductId::new("A"))))
        .await
        .expect("no error");

    assert!(matches!(
        outcome,
        DropOutcome::Rejected(MoveRejected::CrossGroup { .. })
    ));
    assert!(server.requests_to(&Method::PATCH, "/api/admin/product/positions").is_empty());
}

#[tokio::test]
async fn test_subcategory_drop_sends_category_and_positions() {
    let server = grains().await;
    let board =
        SubcategoryBoard::new(server.client(), Mode::Wholesale, Arc::new(NoticeLog::default()));
    board.load().await.expect("load");
    board
        .select_category(&CategoryId::new("c1"))
        .await
        .expect("select");

    let outcome = board
        .drop_item(&DropEvent::new(
            SubcategoryId::new("s3"),
            Some(SubcategoryId::new("s1")),
        ))
        .await
        .expect("saved");
    assert!(matches!(outcome, DropOutcome::Saved { .. }));

    let patches = server.requests_to(&Method::PATCH, "/api/admin/subcategory/positions");
    let patch = patches.first().expect("patch");
    assert_eq!(patch.query.as_deref(), Some("mode=wholesale"));
    assert_eq!(
        patch.json(),
        json!({
            "categoryId": "c1",
            "positions": [
                { "id": "s3", "position": 1 },
                { "id": "s1", "position": 2 },
                { "id": "s2", "position": 3 },
            ]
        })
    );

    let order: Vec<String> = board
        .grouping()
        .await
        .flatten()
        .into_iter()
        .map(|s| s.id.as_str().to_string())
        .collect();
    assert_eq!(order, vec!["s3", "s1", "s2"]);
}

#[tokio::test]
async fn test_failed_category_switch_keeps_previous_selection() {
    let server = grains().await;
    server.set_categories(vec![category("c1", "Grains", true), category("c2", "Oils", false)]);
    let board = ProductBoard::new(server.client(), Mode::Wholesale, Arc::new(NoticeLog::default()));
    board.load().await.expect("load");
    board
        .select_category(&CategoryId::new("c1"))
        .await
        .expect("select");
    server.fail(
        Method::GET,
        "/api/admin/product",
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "message": "unavailable" }),
    );

    board
        .select_category(&CategoryId::new("c2"))
        .await
        .expect_err("products unavailable");

    let selected = board.selected().await.expect("still selected");
    assert_eq!(selected.id.as_str(), "c1");
    let outcome = board
        .drop_item(&DropEvent::new(ProductId::new("A"), Some(ProductId::new("D"))))
        .await
        .expect("no error");
    assert!(matches!(
        outcome,
        DropOutcome::Rejected(MoveRejected::CrossGroup { .. })
    ));
    assert!(server.requests_to(&Method::PATCH, "/api/admin/product/positions").is_empty());
}
