use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza,
    ValidationError,
};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("restaurant not found")]
    RestaurantNotFound,
    #[error("pizza or restaurant not found")]
    ReferenceNotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// A restaurant together with its priced pizzas, ordered by association id.
pub type RestaurantDetails = (Restaurant, Vec<(RestaurantPizza, Pizza)>);

pub struct RestaurantStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> RestaurantStore<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Runs `f` inside a transaction; any error rolls back everything `f` did.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RestaurantStore<'_>) -> Result<T, StoreError>,
    {
        self.conn
            .transaction::<_, StoreError, _>(|conn| f(&mut RestaurantStore::new(conn)))
    }

    /// Like [`transaction`](Self::transaction) but takes the write lock up
    /// front (`BEGIN IMMEDIATE`). Read-then-write paths must use this: a
    /// deferred transaction that has read cannot wait for the lock and fails
    /// with `database is locked` instead. Cannot be nested.
    pub fn write_transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RestaurantStore<'_>) -> Result<T, StoreError>,
    {
        self.conn
            .immediate_transaction::<_, StoreError, _>(|conn| f(&mut RestaurantStore::new(conn)))
    }

    pub fn list_restaurants(&mut self) -> Result<Vec<Restaurant>, StoreError> {
        Ok(restaurants::table
            .order(restaurants::id)
            .select(Restaurant::as_select())
            .load(self.conn)?)
    }

    pub fn find_restaurant(&mut self, id: i32) -> Result<Option<Restaurant>, StoreError> {
        Ok(restaurants::table
            .find(id)
            .select(Restaurant::as_select())
            .first(self.conn)
            .optional()?)
    }

    pub fn pizzas_of(
        &mut self,
        restaurant: &Restaurant,
    ) -> Result<Vec<(RestaurantPizza, Pizza)>, StoreError> {
        Ok(RestaurantPizza::belonging_to(restaurant)
            .inner_join(pizzas::table)
            .order(restaurant_pizzas::id)
            .select((RestaurantPizza::as_select(), Pizza::as_select()))
            .load(self.conn)?)
    }

    pub fn restaurant_details(&mut self, id: i32) -> Result<RestaurantDetails, StoreError> {
        self.transaction(|store| {
            let restaurant = store
                .find_restaurant(id)?
                .ok_or(StoreError::RestaurantNotFound)?;
            let restaurant_pizzas = store.pizzas_of(&restaurant)?;
            Ok((restaurant, restaurant_pizzas))
        })
    }

    /// Deletes the restaurant and every association pointing at it.
    pub fn delete_restaurant(&mut self, id: i32) -> Result<(), StoreError> {
        self.write_transaction(|store| {
            let restaurant = store
                .find_restaurant(id)?
                .ok_or(StoreError::RestaurantNotFound)?;

            diesel::delete(RestaurantPizza::belonging_to(&restaurant)).execute(store.conn)?;
            diesel::delete(&restaurant).execute(store.conn)?;
            Ok(())
        })
    }

    pub fn list_pizzas(&mut self) -> Result<Vec<Pizza>, StoreError> {
        Ok(pizzas::table
            .order(pizzas::id)
            .select(Pizza::as_select())
            .load(self.conn)?)
    }

    pub fn find_pizza(&mut self, id: i32) -> Result<Option<Pizza>, StoreError> {
        Ok(pizzas::table
            .find(id)
            .select(Pizza::as_select())
            .first(self.conn)
            .optional()?)
    }

    /// Looks up both references, then validates the price and inserts the
    /// association. Ids that do not fit the key type cannot exist.
    pub fn create_restaurant_pizza(
        &mut self,
        price: i64,
        pizza_id: i64,
        restaurant_id: i64,
    ) -> Result<(RestaurantPizza, Pizza, Restaurant), StoreError> {
        self.write_transaction(|store| {
            let pizza = match i32::try_from(pizza_id) {
                Ok(id) => store.find_pizza(id)?,
                Err(_) => None,
            };
            let restaurant = match i32::try_from(restaurant_id) {
                Ok(id) => store.find_restaurant(id)?,
                Err(_) => None,
            };
            let (Some(pizza), Some(restaurant)) = (pizza, restaurant) else {
                return Err(StoreError::ReferenceNotFound);
            };

            let new_row = NewRestaurantPizza::new(price, pizza.id, restaurant.id)?;
            let restaurant_pizza = store.insert_restaurant_pizza(&new_row)?;
            Ok((restaurant_pizza, pizza, restaurant))
        })
    }

    pub fn insert_restaurant_pizza(
        &mut self,
        new_row: &NewRestaurantPizza,
    ) -> Result<RestaurantPizza, StoreError> {
        Ok(diesel::insert_into(restaurant_pizzas::table)
            .values(new_row)
            .returning(RestaurantPizza::as_returning())
            .get_result(self.conn)?)
    }

    pub fn insert_restaurant(&mut self, new_row: &NewRestaurant) -> Result<Restaurant, StoreError> {
        Ok(diesel::insert_into(restaurants::table)
            .values(new_row)
            .returning(Restaurant::as_returning())
            .get_result(self.conn)?)
    }

    pub fn insert_pizza(&mut self, new_row: &NewPizza) -> Result<Pizza, StoreError> {
        Ok(diesel::insert_into(pizzas::table)
            .values(new_row)
            .returning(Pizza::as_returning())
            .get_result(self.conn)?)
    }

    /// Empties all three tables and restarts their id sequences.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.write_transaction(|store| store.delete_all())
    }

    /// [`clear`](Self::clear) without its own transaction, for callers
    /// already inside a write transaction.
    pub(crate) fn delete_all(&mut self) -> Result<(), StoreError> {
        diesel::delete(restaurant_pizzas::table).execute(self.conn)?;
        diesel::delete(pizzas::table).execute(self.conn)?;
        diesel::delete(restaurants::table).execute(self.conn)?;
        diesel::sql_query(
            "DELETE FROM sqlite_sequence \
             WHERE name IN ('restaurant_pizzas', 'pizzas', 'restaurants')",
        )
        .execute(self.conn)?;
        Ok(())
    }
}
