use axum::{extract::State, response::Json, routing::get, Router};
use tracing::{debug, instrument};

use super::error::ApiError;
use super::models::*;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/pizzas", get(list_pizzas))
}

// Unlike /restaurants, an empty table is reported as 404.
#[utoipa::path(
    get,
    path = "/pizzas",
    responses(
        (status = 200, description = "List of pizzas", body = [Pizza]),
        (status = 404, description = "No pizzas found", body = ApiMessageResponse),
    ),
    tag = "pizzas"
)]
#[instrument(skip(state))]
pub async fn list_pizzas(State(state): State<AppState>) -> Result<Json<Vec<Pizza>>, ApiError> {
    let pizzas = state.run(|store| store.list_pizzas()).await?;
    debug!(count = pizzas.len(), "pizzas found");

    if pizzas.is_empty() {
        return Err(ApiError::NoPizzas);
    }

    Ok(Json(pizzas.into_iter().map(Pizza::from).collect()))
}
