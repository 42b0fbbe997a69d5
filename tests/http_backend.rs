use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use game_vault_core::backend::{HttpBackend, StoreBackend};
use game_vault_core::config::BackendConfig;
use game_vault_core::errors::AppError;
use game_vault_core::models::{DiscountType, OrderStatus, PaymentMethod, PlaceOrderRequest};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: server.base_url(),
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn validate_coupon_posts_code_and_username() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/validateCoupon")
                .json_body(json!({ "code": "SAVE10", "customerUsername": "alice" }));
            then.status(200).json_body(json!({
                "coupon": {
                    "code": "SAVE10",
                    "discountType": "percentage",
                    "discountValue": 10,
                    "usedCount": 0,
                    "maxUses": 1,
                    "isActive": true
                },
                "soloUse": true
            }));
        })
        .await;

    let result = backend_for(&server)
        .validate_coupon("SAVE10", "alice")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.coupon.discount_type, DiscountType::Percentage);
    assert!(result.solo_use);
}

#[tokio::test]
async fn place_order_sends_camel_case_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/placeOrder").json_body(json!({
                "customerUsername": "alice",
                "itemName": "Minecraft Account",
                "price": 900,
                "paymentMethod": "paypal",
                "paymentReference": "TX-1",
                "couponCode": "SAVE10",
                "deliveryEmail": "alice@example.com"
            }));
            then.status(200).json_body(json!(42));
        })
        .await;

    let id = backend_for(&server)
        .place_order(&PlaceOrderRequest {
            customer_username: "alice".into(),
            item_name: "Minecraft Account".into(),
            price: 900,
            payment_method: PaymentMethod::Paypal,
            payment_reference: "TX-1".into(),
            coupon_code: Some("SAVE10".into()),
            delivery_email: "alice@example.com".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(id, 42);
}

#[tokio::test]
async fn rejection_maps_to_backend_error_with_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/registerUser");
            then.status(409).body("Username already taken");
        })
        .await;

    let err = backend_for(&server)
        .register_user("alice", "alice@example.com")
        .await
        .unwrap_err();

    match err {
        AppError::Backend { status, message } => {
            assert_eq!(status, Some(409));
            assert_eq!(message, "Username already taken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/getCustomerOrders");
            then.status(200).body("not json");
        })
        .await;

    let err = backend_for(&server)
        .get_customer_orders("alice")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Decode(_)));
}

#[tokio::test]
async fn orders_and_empty_membership_decode() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/getCustomerOrders")
                .json_body(json!({ "customerUsername": "alice" }));
            then.status(200).json_body(json!([{
                "orderId": 3,
                "customerUsername": "alice",
                "itemName": "Lua Pack",
                "price": 500,
                "paymentMethod": "etsy",
                "paymentReference": "code",
                "status": "declined",
                "deliveryEmail": "alice@example.com",
                "timestamp": 1_741_176_000_000_000_000i64
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/getMembershipStatus");
            then.status(200).json_body(json!(null));
        })
        .await;

    let backend = backend_for(&server);
    let orders = backend.get_customer_orders("alice").await.unwrap();
    assert_eq!(orders[0].status, OrderStatus::Declined);
    assert_eq!(orders[0].payment_method, PaymentMethod::Etsy);

    assert!(backend.get_membership_status("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn file_download_returns_raw_bytes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/downloadProductFile")
                .json_body(json!({ "fileId": 7 }));
            then.status(200).body(vec![0x50u8, 0x4b, 0x03, 0x04]);
        })
        .await;

    let bytes = backend_for(&server).download_product_file(7).await.unwrap();
    assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let backend = HttpBackend::new(&BackendConfig {
        base_url: "http://127.0.0.1:9".into(),
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
    })
    .unwrap();

    let err = backend.list_available_products().await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
}
