use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::busy_hours::DEFAULT_CAPACITY;
use crate::error::StoreError;
use crate::lookup::Venue;
use crate::models::{MenuItem, Restaurant, SOURCE_EXTERNAL};
use crate::schema::{menu_items, restaurants};

const PLACEHOLDER_MENU: &str = "Menu not available";

/// Dedup-then-insert for externally sourced venues. Matching is exact on
/// (name, latitude, longitude) within the external provenance, so
/// byte-identical input always resolves to the same row.
pub fn upsert_external_venue(
    conn: &mut PgConnection,
    venue: &Venue,
    city: &str,
) -> Result<Uuid, StoreError> {
    let existing = restaurants::table
        .filter(restaurants::name.eq(&venue.name))
        .filter(restaurants::latitude.eq(venue.lat))
        .filter(restaurants::longitude.eq(venue.lon))
        .filter(restaurants::source.eq(SOURCE_EXTERNAL))
        .select(restaurants::id)
        .first::<Uuid>(conn)
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        name: venue.name.clone(),
        location: city.to_string(),
        latitude: Some(venue.lat),
        longitude: Some(venue.lon),
        seating_capacity: DEFAULT_CAPACITY,
        current_occupancy: 0,
        category_id: None,
        source: SOURCE_EXTERNAL.to_string(),
        created_at: Utc::now(),
    };
    let placeholder = MenuItem {
        restaurant_id: restaurant.id,
        id: "placeholder".to_string(),
        name: PLACEHOLDER_MENU.to_string(),
        description: None,
        price: BigDecimal::from(0),
        is_available: false,
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(restaurants::table)
            .values(&restaurant)
            .execute(conn)?;
        diesel::insert_into(menu_items::table)
            .values(&placeholder)
            .execute(conn)?;
        Ok(())
    })?;

    Ok(restaurant.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{establish_connection, schema};

    fn setup_database(conn: &mut PgConnection) {
        diesel::delete(schema::busy_hours::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::reviews::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::menu_items::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::reservations::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::time_slots::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::restaurants::table)
            .execute(conn)
            .unwrap();
    }

    #[test]
    #[ignore = "requires a running postgres with DATABASE_URL set"]
    fn identical_input_is_idempotent() {
        let conn = &mut establish_connection();
        setup_database(conn);

        let venue = Venue {
            name: "Cafe One".to_string(),
            lat: 18.5204,
            lon: 73.8567,
        };
        let first = upsert_external_venue(conn, &venue, "Pune").unwrap();
        let second = upsert_external_venue(conn, &venue, "Pune").unwrap();
        assert_eq!(first, second);

        let count: i64 = restaurants::table.count().first(conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    #[ignore = "requires a running postgres with DATABASE_URL set"]
    fn new_venues_get_default_capacity_and_placeholder_menu() {
        let conn = &mut establish_connection();
        setup_database(conn);

        let venue = Venue {
            name: "Cafe Two".to_string(),
            lat: 18.53,
            lon: 73.86,
        };
        let id = upsert_external_venue(conn, &venue, "Pune").unwrap();

        let row: Restaurant = restaurants::table.find(id).first(conn).unwrap();
        assert_eq!(row.seating_capacity, DEFAULT_CAPACITY);
        assert_eq!(row.current_occupancy, 0);
        assert_eq!(row.source, SOURCE_EXTERNAL);
        assert_eq!(row.location, "Pune");

        let menu: Vec<MenuItem> = MenuItem::belonging_to(&row).load(conn).unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].name, PLACEHOLDER_MENU);
        assert!(!menu[0].is_available);
    }
}
