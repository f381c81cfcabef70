use branchline_client::{ApiClient, ApiSettings, ClientError, Identity, InventoryQuery, Role, SalesQuery, Session};
use branchline_core::{
    BranchId, Money, NewSaleItem, NewSalePayload, ProductFilter, ProductId, SaleId, SalesPeriod,
};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

// Helper to build a client pointed at the mock server
fn client_for(server: &MockServer) -> ApiClient {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..Default::default()
    };
    let session = Session::Authenticated(Identity {
        username: "admin".to_string(),
        role: Role::Admin,
        branch_id: None,
        token: TOKEN.to_string(),
    });
    ApiClient::new(&settings, session).expect("client")
}

#[tokio::test]
async fn lists_branches_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/branches"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Centro", "address": "Av. Siempre Viva 742", "phone": null, "manager": "Ana"},
            {"id": 2, "name": "Norte"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let branches = client_for(&server).list_branches().await.unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].id, BranchId(1));
    assert_eq!(branches[0].manager.as_deref(), Some("Ana"));
    assert_eq!(branches[1].address, None);
}

#[tokio::test]
async fn product_filters_go_in_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("name", "mate"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Yerba Mate", "price": 12.5, "description": null, "category": "Grocery"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ProductFilter::new(Some(""), Some("mate")).unwrap();
    let products = client_for(&server).list_products(&filter).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Money::from_cents(1250));
}

#[tokio::test]
async fn inventory_is_queried_by_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .and(query_param("branch_id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"branch_id": 3, "product_id": 10, "product_name": "Yerba Mate", "category": "Grocery",
             "quantity": 7, "price": 12.5, "total_value": 87.5, "branch_name": "Sur",
             "last_updated": "2024-03-01 09:00:00"}
        ])))
        .mount(&server)
        .await;

    let rows = client_for(&server)
        .inventory(InventoryQuery::for_branch(BranchId(3)))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 7);
    assert_eq!(rows[0].total_value.cents(), 8750);
}

#[tokio::test]
async fn create_sale_posts_decimal_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sales"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "branch_id": 1,
            "sale_date": "2024-03-01",
            "total_amount": 37.5,
            "items": [{"product_id": 10, "quantity": 3, "price": 12.5}]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"sale_id": 55, "status": "completed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = NewSalePayload {
        branch_id: BranchId(1),
        sale_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        total_amount: Money::from_cents(3750),
        items: vec![NewSaleItem {
            product_id: ProductId(10),
            quantity: 3,
            price: Money::from_cents(1250),
        }],
    };
    let confirmation = client_for(&server).create_sale(&payload).await.unwrap();
    assert_eq!(confirmation.sale_id, SaleId(55));
    assert_eq!(confirmation.status.as_deref(), Some("completed"));
}

#[tokio::test]
async fn backend_detail_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sales"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Stock insuficiente para el producto Yerba Mate"})),
        )
        .mount(&server)
        .await;

    let payload = NewSalePayload {
        branch_id: BranchId(1),
        sale_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        total_amount: Money::from_cents(100),
        items: vec![NewSaleItem {
            product_id: ProductId(10),
            quantity: 1,
            price: Money::from_cents(100),
        }],
    };
    let err = client_for(&server).create_sale(&payload).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Stock insuficiente para el producto Yerba Mate");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_session_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;

    let err = client_for(&server).list_branches().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn no_request_without_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let settings = ApiSettings {
        base_url: server.uri(),
        ..Default::default()
    };
    let client = ApiClient::new(&settings, Session::Unauthenticated).unwrap();
    let err = client.list_branches().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn sale_detail_and_listing() {
    let server = MockServer::start().await;
    let sale = json!({
        "id": 55, "branch_id": 1, "branch_name": "Centro", "sale_date": "2024-03-01",
        "created_by_username": "admin", "created_at": "2024-03-01 10:15:00",
        "items": [{"id": 1, "product_id": 10, "product_name": "Yerba Mate", "category": "Grocery",
                   "price": 12.5, "quantity": 3}]
    });
    Mock::given(method("GET"))
        .and(path("/sales/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sales"))
        .and(query_param("branch_id", "1"))
        .and(query_param("date_from", "2024-03-01"))
        .and(query_param_is_missing("date_to"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sale])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let detail = client.get_sale(SaleId(55)).await.unwrap();
    assert_eq!(detail.items_total().cents(), 3750);

    let listed = client
        .list_sales(SalesQuery {
            branch_id: Some(BranchId(1)),
            date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            date_to: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, SaleId(55));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_branches().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn sales_metrics_sends_period_and_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics/sales"))
        .and(query_param("period", "weekly"))
        .and(query_param("branch_id", "2"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSales": 300.0, "totalTransactions": 4, "totalProducts": 9,
            "periodSales": [
                {"period": "2024-03-04", "period_date": "2024-03-04", "amount": 120.0, "transactions": 1, "products": 3},
                {"period": "2024-03-11", "period_date": "2024-03-11", "amount": 180.0, "transactions": 3, "products": 6}
            ],
            "topProducts": [
                {"id": 10, "name": "Yerba Mate", "category": "Grocery", "total_quantity": 6, "total_amount": 75.0}
            ],
            "period": "weekly", "dateFrom": "2023-12-20", "dateTo": "2024-03-13", "branch_id": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = client_for(&server)
        .sales_metrics(SalesPeriod::Weekly, Some(BranchId(2)))
        .await
        .unwrap();
    assert_eq!(metrics.total_sales.cents(), 30_000);
    assert_eq!(metrics.average_ticket().cents(), 7_500);
    assert_eq!(metrics.period_sales.len(), 2);
    assert_eq!(metrics.top_products[0].id, ProductId(10));
    assert_eq!(metrics.branch_id, Some(BranchId(2)));
    assert_eq!(metrics.date_to, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
}

#[tokio::test]
async fn sales_metrics_without_branch_covers_all_branches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics/sales"))
        .and(query_param("period", "monthly"))
        .and(query_param_is_missing("branch_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSales": 0, "totalTransactions": 0, "totalProducts": 0,
            "periodSales": [], "topProducts": [],
            "period": "monthly", "dateFrom": "2023-03-13", "dateTo": "2024-03-13", "branch_id": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = client_for(&server)
        .sales_metrics(SalesPeriod::default(), None)
        .await
        .unwrap();
    assert!(metrics.total_sales.is_zero());
    assert!(metrics.average_ticket().is_zero());
    assert_eq!(metrics.branch_id, None);
}

#[tokio::test]
async fn branch_performance_lists_every_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics/performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activeBranches": 1, "totalBranches": 2,
            "branchData": [
                {"id": 1, "name": "Centro", "manager": "Ana", "totalSales": 3, "totalAmount": 450.0,
                 "avgSale": 150.0, "salesPerDay": 0.1, "uniqueProducts": 2, "totalProducts": 8,
                 "performance": 450.0, "totalInventory": 60, "inventoryValue": 720.0},
                {"id": 2, "name": "Norte", "manager": null, "totalSales": 0, "totalAmount": 0.0,
                 "avgSale": 0.0, "salesPerDay": 0.0, "uniqueProducts": 0, "totalProducts": 0,
                 "performance": 0}
            ],
            "dateFrom": "2024-02-12", "dateTo": "2024-03-13"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server).branch_performance().await.unwrap();
    assert_eq!(report.total_branches, 2);
    assert_eq!(report.total_amount().cents(), 45_000);
    assert!(report.branch(BranchId(1)).unwrap().is_active());
    assert!(!report.branch(BranchId(2)).unwrap().is_active());
}

#[tokio::test]
async fn metrics_errors_surface_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics/performance"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Admins only"})))
        .mount(&server)
        .await;

    let err = client_for(&server).branch_performance().await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Admins only");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
