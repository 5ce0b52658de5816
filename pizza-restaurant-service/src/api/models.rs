use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models;

use super::error::ApiError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    /// Unique identifier for the restaurant
    pub id: i32,
    /// Name of the restaurant
    pub name: String,
    /// Street address of the restaurant
    pub address: Option<String>,
}

impl From<models::Restaurant> for Restaurant {
    fn from(r: models::Restaurant) -> Self {
        Restaurant {
            id: r.id,
            name: r.name,
            address: r.address,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Pizza {
    /// Unique identifier for the pizza
    pub id: i32,
    /// Name of the pizza
    pub name: Option<String>,
    /// Free-text list of ingredients
    pub ingredients: Option<String>,
}

impl From<models::Pizza> for Pizza {
    fn from(p: models::Pizza) -> Self {
        Pizza {
            id: p.id,
            name: p.name,
            ingredients: p.ingredients,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantPizza {
    pub id: i32,
    /// Price the restaurant charges for the pizza
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantDetails {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    /// Pizzas served by the restaurant, with their prices
    pub restaurant_pizzas: Vec<RestaurantPizza>,
}

impl From<(models::Restaurant, Vec<(models::RestaurantPizza, models::Pizza)>)>
    for RestaurantDetails
{
    fn from(
        (restaurant, items): (models::Restaurant, Vec<(models::RestaurantPizza, models::Pizza)>),
    ) -> Self {
        RestaurantDetails {
            id: restaurant.id,
            name: restaurant.name,
            address: restaurant.address,
            restaurant_pizzas: items
                .into_iter()
                .map(|(rp, pizza)| RestaurantPizza {
                    id: rp.id,
                    price: rp.price,
                    pizza_id: rp.pizza_id,
                    restaurant_id: rp.restaurant_id,
                    pizza: pizza.into(),
                })
                .collect(),
        }
    }
}

/// Body of `POST /restaurant_pizzas`. Fields are kept loosely typed so that
/// absent, null and non-integer values can all be answered with the same
/// `Invalid input` error. Build it with [`from_body`](Self::from_body): the
/// derived `Deserialize` would also accept a JSON array.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantPizzaRequest {
    /// Price, an integer or a string holding one
    #[schema(value_type = i64)]
    pub price: Option<Value>,
    /// Existing pizza id
    #[schema(value_type = i64)]
    pub pizza_id: Option<Value>,
    /// Existing restaurant id
    #[schema(value_type = i64)]
    pub restaurant_id: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestaurantPizzaInput {
    pub price: i64,
    pub pizza_id: i64,
    pub restaurant_id: i64,
}

impl CreateRestaurantPizzaRequest {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Object(fields) => serde_json::from_value(Value::Object(fields))
                .map_err(|_| ApiError::InvalidInput),
            _ => Err(ApiError::InvalidInput),
        }
    }

    pub fn parse(&self) -> Result<RestaurantPizzaInput, ApiError> {
        Ok(RestaurantPizzaInput {
            price: integer_field(self.price.as_ref())?,
            pizza_id: integer_field(self.pizza_id.as_ref())?,
            restaurant_id: integer_field(self.restaurant_id.as_ref())?,
        })
    }
}

/// Integers beyond `i64` saturate, so that an oversized value fails the
/// price range or the reference lookup like any other out-of-range value.
fn integer_field(value: Option<&Value>) -> Result<i64, ApiError> {
    match value {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                Ok(v)
            } else if n.is_u64() {
                Ok(i64::MAX)
            } else {
                // serde_json stores integers beyond u64 as floats.
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MAX as f64 => Ok(i64::MAX),
                    Some(f) if f.fract() == 0.0 && f <= i64::MIN as f64 => Ok(i64::MIN),
                    _ => Err(ApiError::InvalidInput),
                }
            }
        }
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(v) => Ok(v),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(ApiError::InvalidInput),
            },
        },
        _ => Err(ApiError::InvalidInput),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantPizzaCreated {
    pub id: i32,
    pub pizza_id: i32,
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
    pub restaurant: Restaurant,
}

impl From<(models::RestaurantPizza, models::Pizza, models::Restaurant)> for RestaurantPizzaCreated {
    fn from(
        (rp, pizza, restaurant): (models::RestaurantPizza, models::Pizza, models::Restaurant),
    ) -> Self {
        RestaurantPizzaCreated {
            id: rp.id,
            pizza_id: rp.pizza_id,
            price: rp.price,
            restaurant_id: rp.restaurant_id,
            pizza: pizza.into(),
            restaurant: restaurant.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiMessageResponse {
    /// Informational message
    pub message: String,
}
