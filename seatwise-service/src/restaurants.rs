use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::Utc;
use diesel::dsl::avg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{MenuItem, Restaurant, RestaurantCategory, Review};
use crate::schema::{menu_items, restaurant_categories, restaurants, reviews, users};

/// Stored restaurants for the discovery page, busiest first.
pub fn list_stored(conn: &mut PgConnection, limit: i64) -> Result<Vec<Restaurant>, StoreError> {
    let rows = restaurants::table
        .order(restaurants::current_occupancy.desc())
        .limit(limit)
        .select(Restaurant::as_select())
        .load(conn)?;
    Ok(rows)
}

#[derive(Debug, PartialEq)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: String,
}

#[derive(Debug, PartialEq)]
pub struct RestaurantDetails {
    pub restaurant: Restaurant,
    pub category: Option<RestaurantCategory>,
    pub avg_rating: f64,
    pub menu: Vec<MenuItem>,
    pub reviews: Vec<ReviewWithAuthor>,
}

pub fn get_details(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
) -> Result<Option<RestaurantDetails>, StoreError> {
    let Some(restaurant) = restaurants::table
        .find(restaurant_id)
        .select(Restaurant::as_select())
        .first::<Restaurant>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let category = match restaurant.category_id {
        Some(category_id) => restaurant_categories::table
            .find(category_id)
            .select(RestaurantCategory::as_select())
            .first(conn)
            .optional()?,
        None => None,
    };

    let avg_rating = reviews::table
        .filter(reviews::restaurant_id.eq(restaurant.id))
        .select(avg(reviews::rating))
        .first::<Option<BigDecimal>>(conn)?
        .and_then(|a| a.to_f64())
        .unwrap_or(0.0);

    let menu = MenuItem::belonging_to(&restaurant)
        .filter(menu_items::is_available.eq(true))
        .order(menu_items::name.asc())
        .select(MenuItem::as_select())
        .load(conn)?;

    let reviews = reviews::table
        .inner_join(users::table)
        .filter(reviews::restaurant_id.eq(restaurant.id))
        .order(reviews::created_at.desc())
        .select((Review::as_select(), users::name))
        .load::<(Review, String)>(conn)?
        .into_iter()
        .map(|(review, author)| ReviewWithAuthor { review, author })
        .collect();

    Ok(Some(RestaurantDetails {
        restaurant,
        category,
        avg_rating,
        menu,
        reviews,
    }))
}

/// Rating must be within 1..=5 before any store access.
pub fn add_review(
    conn: &mut PgConnection,
    user_id: Uuid,
    restaurant_id: Uuid,
    rating: i32,
    review_text: String,
) -> Result<Review, StoreError> {
    validate_rating(rating)?;

    let exists = restaurants::table
        .find(restaurant_id)
        .count()
        .first::<i64>(conn)?;
    if exists == 0 {
        return Err(StoreError::NotFound("restaurant".to_string()));
    }

    let review = Review {
        id: Uuid::new_v4(),
        user_id,
        restaurant_id,
        rating,
        review_text,
        created_at: Utc::now(),
    };
    diesel::insert_into(reviews::table)
        .values(&review)
        .execute(conn)?;
    Ok(review)
}

fn validate_rating(rating: i32) -> Result<(), StoreError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
    }
}
