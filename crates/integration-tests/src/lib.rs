//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! Tests talk HTTP to a [`StubApi`]: an in-process `axum` router serving
//! `/products/{id}` and `/stock/{id}` from fixtures, bound to an ephemeral
//! port. Stock levels can be changed while a test runs and every request is
//! counted, so tests can observe exactly what the cart asked for.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_core::{ProductId, ProductRecord, StockRecord};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Fixtures {
    products: RwLock<HashMap<ProductId, ProductRecord>>,
    stock: RwLock<HashMap<ProductId, u32>>,
    product_requests: AtomicUsize,
    stock_requests: AtomicUsize,
    /// When set, `/stock/*` answers 500.
    stock_down: RwLock<bool>,
}

/// In-process catalog and stock API.
///
/// The server task is aborted when the stub is dropped.
pub struct StubApi {
    addr: SocketAddr,
    fixtures: Arc<Fixtures>,
    task: JoinHandle<()>,
}

impl StubApi {
    /// Start a server with the six storefront shoes, each with the given stock.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(stock: &[(i64, u32)]) -> Self {
        let fixtures = Arc::new(Fixtures::default());
        {
            let mut products = fixtures
                .products
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for product in catalog() {
                products.insert(product.id, product);
            }
        }

        let stub_fixtures = Arc::clone(&fixtures);
        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock_level))
            .with_state(stub_fixtures);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let stub = Self {
            addr,
            fixtures,
            task,
        };
        for &(id, amount) in stock {
            stub.set_stock(id, amount);
        }
        stub
    }

    /// Base URL to configure the cart's API client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_stock(&self, id: i64, amount: u32) {
        self.fixtures
            .stock
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ProductId::new(id), amount);
    }

    /// Make every stock lookup fail with a server error.
    pub fn take_stock_down(&self) {
        *self
            .fixtures
            .stock_down
            .write()
            .unwrap_or_else(PoisonError::into_inner) = true;
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.fixtures.product_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.fixtures.stock_requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The storefront catalog used by every stub.
#[must_use]
pub fn catalog() -> Vec<ProductRecord> {
    let cdn = "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux";
    [
        (1, "Tênis de Caminhada Leve Confortável", 17990),
        (2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (3, "Tênis Adidas Duramo Lite 2.0", 21990),
        (4, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (5, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (6, "Tênis Adidas Duramo Lite 2.0", 21990),
    ]
    .into_iter()
    .map(|(id, title, cents)| ProductRecord {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        image: format!("{cdn}/tenis{id}.jpg"),
    })
    .collect()
}

async fn product(State(fixtures): State<Arc<Fixtures>>, Path(id): Path<i64>) -> Response {
    fixtures.product_requests.fetch_add(1, Ordering::SeqCst);
    let found = fixtures
        .products
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&ProductId::new(id))
        .cloned();
    match found {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response(),
    }
}

async fn stock_level(State(fixtures): State<Arc<Fixtures>>, Path(id): Path<i64>) -> Response {
    fixtures.stock_requests.fetch_add(1, Ordering::SeqCst);
    if *fixtures
        .stock_down
        .read()
        .unwrap_or_else(PoisonError::into_inner)
    {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stock service down").into_response();
    }

    let id = ProductId::new(id);
    let amount = fixtures
        .stock
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    match amount {
        Some(amount) => Json(StockRecord { id, amount }).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response(),
    }
}
