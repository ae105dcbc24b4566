//! Cart persistence across sessions.
//!
//! A "session" here is one `CartStore` instance; a new instance over the same
//! storage file plays the role of a page reload or a new CLI invocation.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rocketshoes_cart::config::ApiConfig;
use rocketshoes_cart::{
    ApiClient, CartStore, FileStore, KeyValueStore, LogNotifier, SharedCartStore,
    UpdateProductAmount,
};
use rocketshoes_core::{Cart, CurrencyCode, ProductId};
use rocketshoes_integration_tests::StubApi;

const KEY: &str = "@RocketShoes:cart";

type FileCart = CartStore<ApiClient, ApiClient, FileStore, LogNotifier>;

fn session(stub: &StubApi, storage: &FileStore) -> FileCart {
    let api = ApiClient::new(&ApiConfig::uncached(&stub.base_url()).unwrap()).unwrap();
    CartStore::load(api.clone(), api, storage.clone(), LogNotifier, KEY)
}

#[tokio::test]
async fn test_cart_survives_reload() {
    let stub = StubApi::start(&[(1, 5), (2, 5)]).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path().join("storage.json"));

    {
        let mut cart = session(&stub, &storage);
        cart.add_product(ProductId::new(2)).await.unwrap();
        cart.add_product(ProductId::new(1)).await.unwrap();
        cart.update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 4,
        })
        .await
        .unwrap();
    }

    let reloaded = session(&stub, &storage);
    let ids: Vec<_> = reloaded
        .cart()
        .iter()
        .map(|e| (e.id.as_i64(), e.amount.get()))
        .collect();
    assert_eq!(ids, vec![(2, 1), (1, 4)]);

    let summary = reloaded.summary(CurrencyCode::BRL);
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total_quantity, 5);
    assert_eq!(summary.total.to_string(), "R$ 859,50");
}

#[tokio::test]
async fn test_loading_does_not_touch_storage() {
    let stub = StubApi::start(&[(1, 5)]).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let storage = FileStore::new(&path);

    {
        let mut cart = session(&stub, &storage);
        cart.add_product(ProductId::new(1)).await.unwrap();
    }
    let before = std::fs::metadata(&path).unwrap().modified().unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();

    let _reloaded = session(&stub, &storage);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[tokio::test]
async fn test_persisted_blob_is_json_array_of_entries() {
    let stub = StubApi::start(&[(3, 2)]).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path().join("storage.json"));

    let mut cart = session(&stub, &storage);
    cart.add_product(ProductId::new(3)).await.unwrap();

    let blob = storage.get(KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
    let entry = &value.as_array().unwrap()[0];
    assert_eq!(entry["id"], 3);
    assert_eq!(entry["amount"], 1);
    assert_eq!(entry["price"], 219.9);
    assert_eq!(Cart::from_json(&blob).unwrap(), *cart.cart());
}

#[tokio::test]
async fn test_other_keys_are_preserved() {
    let stub = StubApi::start(&[(1, 1)]).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path().join("storage.json"));
    storage.set("@RocketShoes:theme", "dark").unwrap();

    let mut cart = session(&stub, &storage);
    cart.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(
        storage.get("@RocketShoes:theme").unwrap().as_deref(),
        Some("dark")
    );
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let stub = StubApi::start(&[(1, 1)]).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path().join("storage.json"));
    storage.set(KEY, "{not a cart").unwrap();

    let mut cart = session(&stub, &storage);
    assert!(cart.cart().is_empty());
    assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("{not a cart"));

    cart.add_product(ProductId::new(1)).await.unwrap();
    assert!(Cart::from_json(&storage.get(KEY).unwrap().unwrap()).is_ok());
}

#[tokio::test]
async fn test_corrupt_storage_file_is_replaced_on_first_commit() {
    let stub = StubApi::start(&[(1, 5), (2, 5)]).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "garbage").unwrap();
    let storage = FileStore::new(&path);

    let mut cart = session(&stub, &storage);
    assert!(cart.cart().is_empty());
    cart.add_product(ProductId::new(1)).await.unwrap();
    cart.add_product(ProductId::new(2)).await.unwrap();

    let persisted = Cart::from_json(&storage.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(&persisted, cart.cart());

    let reloaded = session(&stub, &storage);
    assert_eq!(reloaded.cart().len(), 2);
}

#[tokio::test]
async fn test_shared_store_over_http() {
    let stub = StubApi::start(&[(1, 2), (2, 9)]).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path().join("storage.json"));
    let shared = SharedCartStore::new(session(&stub, &storage));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            tokio::spawn(async move { shared.add_product(ProductId::new(1)).await })
        })
        .collect();

    let mut failures = 0;
    for handle in handles {
        if handle.await.unwrap().is_err() {
            failures += 1;
        }
    }

    // Stock of two: exactly two adds succeed regardless of interleaving
    assert_eq!(failures, 2);
    let cart = shared.snapshot().await;
    assert_eq!(cart.get(ProductId::new(1)).unwrap().amount.get(), 2);

    let persisted = Cart::from_json(&storage.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, cart);
}
