use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AutoDeliveryApi,
    LifecycleApi,
    OrderFlowApi,
    SqliteOrderStore,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AutoDeliverRoute,
        AutoMessageRoute,
        CreateNotificationRoute,
        CreateOrderRoute,
        GetOrderRoute,
        LifecycleSweepRoute,
        OrderStatusRoute,
        PaymentStatusRoute,
        SearchOrdersRoute,
        UserNotificationsRoute,
        UserOrdersRoute,
    },
    sweep_worker::start_sweep_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteOrderStore::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let mut hooks = EventHooks::default();
    hooks.on_order_completed(|ev| {
        Box::pin(async move {
            let how = if ev.auto_approved { "auto-approved" } else { "approved by the buyer" };
            info!("✅️ Order {} completed ({how})", ev.order.order_number);
        })
    });
    let handlers = EventHandlers::new(32, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    if config.enable_sweep_worker {
        start_sweep_worker(db.clone(), producers.clone(), config.sweep_interval);
    }

    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteOrderStore,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let approval_window = config.approval_window;
    let srv = HttpServer::new(move || {
        let flow_api = OrderFlowApi::new(db.clone(), producers.clone()).with_approval_window(approval_window);
        let delivery_api = AutoDeliveryApi::new(db.clone());
        let lifecycle_api = LifecycleApi::new(db.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mos::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(delivery_api))
            .app_data(web::Data::new(lifecycle_api))
            .service(health)
            // the sweep route must precede the parameterized /orders/{order_id} routes
            .service(LifecycleSweepRoute::<SqliteOrderStore>::new())
            .service(CreateOrderRoute::<SqliteOrderStore>::new())
            .service(SearchOrdersRoute::<SqliteOrderStore>::new())
            .service(GetOrderRoute::<SqliteOrderStore>::new())
            .service(OrderStatusRoute::<SqliteOrderStore>::new())
            .service(PaymentStatusRoute::<SqliteOrderStore>::new())
            .service(AutoDeliverRoute::<SqliteOrderStore>::new())
            .service(AutoMessageRoute::<SqliteOrderStore>::new())
            .service(CreateNotificationRoute::<SqliteOrderStore>::new())
            .service(UserOrdersRoute::<SqliteOrderStore>::new())
            .service(UserNotificationsRoute::<SqliteOrderStore>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
