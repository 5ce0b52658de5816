use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza};
use crate::store::{RestaurantStore, StoreError};

const RESTAURANTS: &[(&str, &str)] = &[
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: &[(&str, &str)] = &[
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

/// (restaurant index, pizza index, price)
const MENU: &[(usize, usize, i64)] = &[(0, 0, 1), (1, 1, 4), (2, 2, 5)];

#[derive(Debug, Default, PartialEq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub restaurant_pizzas: usize,
}

/// Replaces the contents of the database with a small sample data set.
pub fn load(store: &mut RestaurantStore<'_>) -> Result<SeedSummary, StoreError> {
    store.write_transaction(|store| {
        store.delete_all()?;

        let restaurants = RESTAURANTS
            .iter()
            .map(|&(name, address)| {
                store.insert_restaurant(&NewRestaurant {
                    name,
                    address: Some(address),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pizzas = PIZZAS
            .iter()
            .map(|&(name, ingredients)| {
                store.insert_pizza(&NewPizza {
                    name: Some(name),
                    ingredients: Some(ingredients),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for &(restaurant, pizza, price) in MENU {
            let row = NewRestaurantPizza::new(price, pizzas[pizza].id, restaurants[restaurant].id)?;
            store.insert_restaurant_pizza(&row)?;
        }

        Ok(SeedSummary {
            restaurants: restaurants.len(),
            pizzas: pizzas.len(),
            restaurant_pizzas: MENU.len(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::setup_database;

    #[test]
    fn test_load_is_repeatable() {
        let (_dir, pool) = setup_database();
        let conn = &mut pool.get().unwrap();
        let mut store = RestaurantStore::new(conn);

        let first = load(&mut store).unwrap();
        let second = load(&mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            SeedSummary {
                restaurants: 3,
                pizzas: 3,
                restaurant_pizzas: 3,
            }
        );

        let (restaurant, items) = store.restaurant_details(1).unwrap();
        assert_eq!(restaurant.name, "Karen's Pizza Shack");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].1.name.as_deref(), Some("Emma"));
    }
}
