#![allow(dead_code)]
use std::collections::HashMap;

use log::*;
use mos_common::Money;
use order_engine::{
    db_types::{DigitalFile, Order, ProductDelivery},
    order_objects::NewOrderRequest,
    events::EventProducers,
    traits::OrderStore,
    OrderFlowApi,
    SqliteOrderStore,
};
use sqlx::{migrate, migrate::MigrateDatabase, types::Json, Sqlite};

pub fn random_db_url() -> String {
    format!("sqlite://{}/mos_engine_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn prepare_test_store(url: &str) -> SqliteOrderStore {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    let store = SqliteOrderStore::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(store.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Test database ready at {url}");
    store
}

pub fn order_request(buyer: &str, seller: &str, product: &str) -> NewOrderRequest {
    NewOrderRequest {
        buyer_id: buyer.to_string(),
        seller_id: seller.to_string(),
        product_id: product.to_string(),
        package_id: None,
        quantity: 1,
        unit_price: Money::from(4_900),
        total_price: Money::from(4_900),
        service_fee: Money::from(490),
        expected_delivery: None,
        requirements: HashMap::new(),
        special_instructions: None,
    }
}

pub async fn seed_order(store: &SqliteOrderStore, buyer: &str, seller: &str, product: &str) -> Order {
    let api = OrderFlowApi::new(store.clone(), EventProducers::default());
    api.create_order(order_request(buyer, seller, product)).await.expect("Error creating test order")
}

pub fn digital_product(product_id: &str, seller_id: &str, files: Vec<DigitalFile>) -> ProductDelivery {
    ProductDelivery {
        product_id: product_id.to_string(),
        seller_id: seller_id.to_string(),
        title: "Watercolour Brush Pack".to_string(),
        digital_files: Json(files),
        course_links: Json(Vec::new()),
        course_passkeys: Json(Vec::new()),
        course_notes: None,
        auto_deliver: false,
    }
}

pub async fn seed_product(store: &SqliteOrderStore, product: ProductDelivery) {
    store.upsert_product_delivery(product).await.expect("Error seeding test product");
}
