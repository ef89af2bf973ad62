//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current
//! thread will stop that worker from processing new requests. All storage work here goes through
//! async sqlx calls, so handlers stay non-blocking.
use std::str::FromStr;

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use serde_json::json;
use order_engine::{
    db_types::{NewNotification, OrderNumber, PaymentStatusType},
    order_objects::{NewOrderRequest, OrderQueryFilter},
    traits::{OrderStore, UserRole},
    AutoDeliveryApi,
    LifecycleApi,
    OrderFlowApi,
    OrderFlowError,
};

use crate::{
    data_objects::{
        AutoDeliverParams,
        AutoMessageParams,
        NotificationParams,
        OrderListQuery,
        PaymentStatusParams,
        StatusUpdateParams,
        SweepResponse,
        UserOrdersQuery,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderStore);
/// The checkout boundary: persists a new `pending` order. The engine validates the commercial
/// fields and generates the order number.
pub async fn create_order<TOrderStore>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let request = body.into_inner();
    debug!("💻️ POST /orders for buyer {}", request.buyer_id);
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(get_order => Get "/orders/{order_id}" impl OrderStore);
pub async fn get_order<TOrderStore>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let order = api.fetch_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(search_orders => Get "/orders" impl OrderStore);
pub async fn search_orders<TOrderStore>(
    query: web::Query<OrderListQuery>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let query = query.into_inner();
    let mut filter = OrderQueryFilter::default();
    if let Some(order_number) = query.order_number {
        filter = filter.with_order_number(OrderNumber(order_number));
    }
    if let Some(buyer_id) = query.buyer_id {
        filter = filter.with_buyer_id(buyer_id);
    }
    if let Some(seller_id) = query.seller_id {
        filter = filter.with_seller_id(seller_id);
    }
    if let Some(status) = query.status {
        filter = filter.with_status(status);
    }
    if let Some(since) = query.since {
        filter = filter.since(since);
    }
    if let Some(until) = query.until {
        filter = filter.until(until);
    }
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_status => Post "/orders/{order_id}/status" impl OrderStore);
/// A buyer or seller lifecycle action. On success the delivery trigger is invoked speculatively:
/// the transition is already committed, so a trigger failure is logged for a later retry rather
/// than failing the request.
pub async fn order_status<TOrderStore>(
    path: web::Path<i64>,
    body: web::Json<StatusUpdateParams>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
    delivery: web::Data<AutoDeliveryApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let id = path.into_inner();
    let new_status = body.into_inner().status;
    debug!("💻️ POST status change for order {id} to {new_status}");
    let order = api.transition(id, new_status).await?;
    try_auto_deliver(&delivery, order.id, &order.product_id).await;
    Ok(HttpResponse::Ok().json(order))
}

route!(payment_status => Post "/orders/{order_id}/payment-status" impl OrderStore);
/// The payment-webhook boundary. Settles the payment axis only; a completed payment also fires
/// the delivery trigger, since payment is the event that unlocks digital goods.
pub async fn payment_status<TOrderStore>(
    path: web::Path<i64>,
    body: web::Json<PaymentStatusParams>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
    delivery: web::Data<AutoDeliveryApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let id = path.into_inner();
    let payment_status = body.into_inner().payment_status;
    let order = api.mark_payment_status(id, payment_status).await?;
    if payment_status == PaymentStatusType::Completed {
        try_auto_deliver(&delivery, order.id, &order.product_id).await;
    }
    Ok(HttpResponse::Ok().json(order))
}

async fn try_auto_deliver<TOrderStore: OrderStore>(
    delivery: &AutoDeliveryApi<TOrderStore>,
    order_id: i64,
    product_id: &str,
) {
    match delivery.auto_deliver(order_id, product_id).await {
        Ok(outcome) if outcome.delivered => {
            debug!("💻️ Speculative auto-delivery on order {order_id}: {} categories attached", outcome.artifacts.len());
        },
        Ok(_) => {},
        // the product never registered delivery inputs; nothing to deliver
        Err(OrderFlowError::ProductNotFound(_)) => {},
        Err(e) => warn!("💻️ Speculative auto-delivery on order {order_id} failed (will retry on next event): {e}"),
    }
}

//----------------------------------------------   Automation  ----------------------------------------------------
route!(auto_deliver => Post "/orders/{order_id}/auto-deliver" impl OrderStore);
/// Explicitly triggers automatic fulfillment for an order. Idempotent: repeated calls converge on
/// one set of attachments, and an ineligible product is a normal `delivered: false` response.
pub async fn auto_deliver<TOrderStore>(
    path: web::Path<i64>,
    body: web::Json<AutoDeliverParams>,
    api: web::Data<AutoDeliveryApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let params = body.into_inner();
    let order_id =
        params.order_id.ok_or_else(|| ServerError::InvalidRequestBody("orderId is required".to_string()))?;
    let product_id = params
        .product_id
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequestBody("productId is required".to_string()))?;
    if order_id != path.into_inner() {
        return Err(ServerError::InvalidRequestBody("orderId does not match the request path".to_string()));
    }
    debug!("💻️ POST auto-deliver for order {order_id}");
    let outcome = api.auto_deliver(order_id, &product_id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

route!(lifecycle_sweep => Post "/orders/lifecycle-sweep" impl OrderStore);
/// Cron-invoked: promote all delivered orders past their approval deadline. Safe to run
/// concurrently with the in-process worker; the conditional status update arbitrates.
pub async fn lifecycle_sweep<TOrderStore>(
    api: web::Data<LifecycleApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    info!("💻️ Received lifecycle sweep request");
    let result = api.sweep_overdue_approvals().await?;
    let response =
        SweepResponse { success: true, processed_count: result.count(), processed: result.processed };
    Ok(HttpResponse::Ok().json(response))
}

route!(auto_message => Post "/orders/{order_id}/auto-message" impl OrderStore);
/// Posts a system message on behalf of seller automation. The supplied creator id must be the
/// order's seller; anything else is a 403.
pub async fn auto_message<TOrderStore>(
    path: web::Path<i64>,
    body: web::Json<AutoMessageParams>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let params = body.into_inner();
    let order_id =
        params.order_id.ok_or_else(|| ServerError::InvalidRequestBody("orderId is required".to_string()))?;
    let creator_id = params
        .creator_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequestBody("creatorId is required".to_string()))?;
    let message = params
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequestBody("message is required".to_string()))?;
    if order_id != path.into_inner() {
        return Err(ServerError::InvalidRequestBody("orderId does not match the request path".to_string()));
    }
    api.post_system_message(order_id, &creator_id, message).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(create_notification => Post "/notifications" impl OrderStore);
pub async fn create_notification<TOrderStore>(
    body: web::Json<NotificationParams>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let params = body.into_inner();
    let user_id =
        params.user_id.ok_or_else(|| ServerError::InvalidRequestBody("user_id is required".to_string()))?;
    let notification_type =
        params.notification_type.ok_or_else(|| ServerError::InvalidRequestBody("type is required".to_string()))?;
    let title = params.title.ok_or_else(|| ServerError::InvalidRequestBody("title is required".to_string()))?;
    let message =
        params.message.ok_or_else(|| ServerError::InvalidRequestBody("message is required".to_string()))?;
    let notification = NewNotification {
        user_id,
        notification_type,
        title,
        message,
        data: params.data.unwrap_or_else(|| json!({})),
    };
    api.push_notification(notification).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

//----------------------------------------------   Per-user reads  -------------------------------------------------
route!(user_orders => Get "/users/{user_id}/orders" impl OrderStore);
pub async fn user_orders<TOrderStore>(
    path: web::Path<String>,
    query: web::Query<UserOrdersQuery>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let user_id = path.into_inner();
    let role = UserRole::from_str(&query.role).map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    let orders = api.fetch_orders_for_user(&user_id, role).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(user_notifications => Get "/users/{user_id}/notifications" impl OrderStore);
pub async fn user_notifications<TOrderStore>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<TOrderStore>>,
) -> Result<HttpResponse, ServerError>
where
    TOrderStore: OrderStore,
{
    let notifications = api.fetch_notifications_for_user(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notifications))
}
