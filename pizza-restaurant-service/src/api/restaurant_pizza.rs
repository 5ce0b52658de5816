use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::error::ApiError;
use super::models::*;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body = CreateRestaurantPizzaRequest,
    responses(
        (status = 201, description = "Pizza added to the restaurant", body = RestaurantPizzaCreated),
        (status = 400, description = "Invalid input or price out of range", body = ApiErrorResponse),
        (status = 404, description = "Pizza or restaurant not found", body = ApiErrorResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RestaurantPizzaCreated>), ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidInput)?;
    let input = CreateRestaurantPizzaRequest::from_body(payload)?.parse()?;

    let created = state
        .run(move |store| {
            store.create_restaurant_pizza(input.price, input.pizza_id, input.restaurant_id)
        })
        .await?;
    info!(id = created.0.id, "restaurant pizza created");

    Ok((StatusCode::CREATED, Json(created.into())))
}
