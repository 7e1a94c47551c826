use std::cmp::Ordering;
use std::collections::HashMap;

use bigdecimal::{BigDecimal, ToPrimitive};
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Restaurant;
use crate::schema::{restaurants, reviews};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRestaurant {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub seating_capacity: i32,
    pub current_occupancy: i32,
    pub occupancy_rate: f64,
    pub avg_rating: f64,
}

/// Least-loaded first, best-rated breaking ties. The city filter is a
/// case-sensitive substring match on the location field; the category filter
/// is exact. Read-only.
pub fn suggest_restaurants(
    conn: &mut PgConnection,
    city: Option<&str>,
    category_id: Option<Uuid>,
    max_results: usize,
) -> Result<Vec<RankedRestaurant>, StoreError> {
    let mut query = restaurants::table
        .select(Restaurant::as_select())
        .into_boxed();
    if let Some(city) = city {
        query = query.filter(restaurants::location.like(format!("%{city}%")));
    }
    if let Some(category_id) = category_id {
        query = query.filter(restaurants::category_id.eq(category_id));
    }
    let rows = query.load(conn)?;

    let ratings: HashMap<Uuid, f64> = reviews::table
        .filter(reviews::restaurant_id.eq_any(rows.iter().map(|r| r.id)))
        .group_by(reviews::restaurant_id)
        .select((reviews::restaurant_id, diesel::dsl::avg(reviews::rating)))
        .load::<(Uuid, Option<BigDecimal>)>(conn)?
        .into_iter()
        .map(|(id, avg)| (id, avg.and_then(|a| a.to_f64()).unwrap_or(0.0)))
        .collect();

    Ok(rank(rows, &ratings, max_results))
}

fn rank(
    rows: Vec<Restaurant>,
    ratings: &HashMap<Uuid, f64>,
    max_results: usize,
) -> Vec<RankedRestaurant> {
    let mut ranked: Vec<RankedRestaurant> = rows
        .into_iter()
        .map(|r| {
            let occupancy_rate = if r.seating_capacity > 0 {
                f64::from(r.current_occupancy) / f64::from(r.seating_capacity)
            } else {
                1.0
            };
            RankedRestaurant {
                occupancy_rate,
                avg_rating: ratings.get(&r.id).copied().unwrap_or(0.0),
                id: r.id,
                name: r.name,
                location: r.location,
                seating_capacity: r.seating_capacity,
                current_occupancy: r.current_occupancy,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.occupancy_rate
            .partial_cmp(&b.occupancy_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.avg_rating
                    .partial_cmp(&a.avg_rating)
                    .unwrap_or(Ordering::Equal)
            })
    });
    ranked.truncate(max_results);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::SOURCE_LOCAL;

    fn restaurant(name: &str, occupancy: i32, capacity: i32) -> Restaurant {
        Restaurant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: "Pune".to_string(),
            latitude: None,
            longitude: None,
            seating_capacity: capacity,
            current_occupancy: occupancy,
            category_id: None,
            source: SOURCE_LOCAL.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn orders_by_ascending_occupancy_rate() {
        let rows = vec![
            restaurant("busy", 45, 50),
            restaurant("quiet", 5, 50),
            restaurant("half", 25, 50),
        ];
        let ranked = rank(rows, &HashMap::new(), 10);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["quiet", "half", "busy"]);
        assert!(ranked.windows(2).all(|w| w[0].occupancy_rate <= w[1].occupancy_rate));
    }

    #[test]
    fn ties_break_on_descending_rating() {
        let first = restaurant("low-rated", 10, 50);
        let second = restaurant("high-rated", 10, 50);
        let ratings = HashMap::from([(first.id, 2.5), (second.id, 4.5)]);
        let ranked = rank(vec![first, second], &ratings, 10);
        assert_eq!(ranked[0].name, "high-rated");
        assert_eq!(ranked[1].name, "low-rated");
    }

    #[test]
    fn missing_reviews_default_to_zero_rating() {
        let reviewed = restaurant("reviewed", 10, 50);
        let unreviewed = restaurant("unreviewed", 10, 50);
        let ratings = HashMap::from([(reviewed.id, 3.0)]);
        let ranked = rank(vec![unreviewed, reviewed], &ratings, 10);
        assert_eq!(ranked[0].name, "reviewed");
        assert_eq!(ranked[1].avg_rating, 0.0);
    }

    #[test]
    fn truncates_to_requested_bound() {
        let rows = (0..8).map(|i| restaurant(&format!("r{i}"), i, 50)).collect();
        let ranked = rank(rows, &HashMap::new(), 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn zero_capacity_ranks_as_fully_loaded() {
        let rows = vec![restaurant("broken", 0, 0), restaurant("open", 0, 50)];
        let ranked = rank(rows, &HashMap::new(), 10);
        assert_eq!(ranked[0].name, "open");
        assert_eq!(ranked[1].occupancy_rate, 1.0);
    }
}
