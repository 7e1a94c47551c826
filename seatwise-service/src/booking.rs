use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::availability::{iso_weekday, parse_booking_date};
use crate::error::StoreError;
use crate::models::{Reservation, ReservationStatus, TimeSlot};
use crate::schema::{reservations, restaurants, time_slots};

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub slot_id: Uuid,
    pub date: String,
    pub num_people: i32,
    pub notes: Option<String>,
}

fn validate(request: &BookingRequest) -> Result<NaiveDate, StoreError> {
    if request.num_people < 1 {
        return Err(StoreError::Validation(
            "number of guests must be at least 1".to_string(),
        ));
    }
    parse_booking_date(&request.date).ok_or_else(|| {
        StoreError::Validation(format!("invalid reservation date {:?}", request.date))
    })
}

/// The capacity-checked write path. Locks the slot row for the duration of
/// the check-and-insert so concurrent bookings on the same slot serialize,
/// and rolls the occupancy counter forward with a guarded update whose
/// affected-row count decides success. Reservation insert and occupancy
/// increment commit as one unit.
pub fn book_table(
    conn: &mut PgConnection,
    request: BookingRequest,
) -> Result<Reservation, StoreError> {
    let date = validate(&request)?;

    let reservation = conn.transaction(|conn| {
        let slot = time_slots::table
            .select(TimeSlot::as_select())
            .find(request.slot_id)
            .for_update()
            .first::<TimeSlot>(conn)
            .optional()?
            .filter(|slot| slot.restaurant_id == request.restaurant_id)
            .ok_or_else(|| StoreError::NotFound("time slot".to_string()))?;

        if slot.day_of_week != iso_weekday(date) {
            return Err(StoreError::Validation(format!(
                "{} does not fall on the slot's weekday",
                date
            )));
        }

        let booked: i64 = reservations::table
            .filter(reservations::slot_id.eq(slot.id))
            .filter(reservations::reservation_date.eq(date))
            .filter(reservations::status.eq(ReservationStatus::Confirmed))
            .select(diesel::dsl::sum(reservations::num_people))
            .first::<Option<i64>>(conn)?
            .unwrap_or(0);
        if booked + i64::from(request.num_people) > i64::from(slot.max_capacity) {
            return Err(StoreError::CapacityExceeded(
                "slot no longer available".to_string(),
            ));
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            restaurant_id: request.restaurant_id,
            slot_id: slot.id,
            reservation_date: date,
            num_people: request.num_people,
            status: ReservationStatus::Confirmed,
            notes: request.notes.clone(),
            created_at: Utc::now(),
        };
        diesel::insert_into(reservations::table)
            .values(&reservation)
            .execute(conn)?;

        let updated = diesel::update(
            restaurants::table
                .filter(restaurants::id.eq(request.restaurant_id))
                .filter(
                    restaurants::current_occupancy
                        .le(restaurants::seating_capacity - request.num_people),
                ),
        )
        .set(restaurants::current_occupancy.eq(restaurants::current_occupancy + request.num_people))
        .execute(conn)?;
        if updated == 0 {
            return Err(StoreError::CapacityExceeded(
                "restaurant is at seating capacity".to_string(),
            ));
        }

        Ok(reservation)
    })?;

    // Refreshing the busyness cells is a follow-up, not part of the booking:
    // a failure here must not undo the committed reservation.
    if let Err(err) = crate::busy_hours::refresh_busy_hours(conn, request.restaurant_id) {
        tracing::warn!(
            restaurant_id = %request.restaurant_id,
            error = %err,
            "busy-hours refresh after booking failed"
        );
    }

    Ok(reservation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(num_people: i32, date: &str) -> BookingRequest {
        BookingRequest {
            user_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            date: date.to_string(),
            num_people,
            notes: None,
        }
    }

    #[test]
    fn rejects_non_positive_party() {
        assert!(matches!(
            validate(&request(0, "2024-05-01")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            validate(&request(-2, "2024-05-01")),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_date_before_any_write() {
        assert!(matches!(
            validate(&request(2, "05/01/2024")),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn accepts_well_formed_request() {
        let date = validate(&request(2, "2024-05-01")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    mod with_database {
        use super::*;
        use crate::models::{Restaurant, User, SOURCE_LOCAL};
        use crate::schema::{restaurants, time_slots, users};
        use crate::{establish_connection, schema};
        use chrono::NaiveTime;

        fn setup_database(conn: &mut PgConnection) {
            diesel::delete(schema::activity_log::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::busy_hours::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::reservations::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::time_slots::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::reviews::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::menu_items::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::restaurants::table)
                .execute(conn)
                .unwrap();
            diesel::delete(schema::users::table).execute(conn).unwrap();
        }

        fn seed(conn: &mut PgConnection, seating_capacity: i32, current_occupancy: i32) -> BookingRequest {
            let user = User {
                id: Uuid::new_v4(),
                name: "Test User".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: None,
                password_hash: "x".to_string(),
                is_admin: false,
                created_at: Utc::now(),
            };
            diesel::insert_into(users::table)
                .values(&user)
                .execute(conn)
                .unwrap();

            let restaurant = Restaurant {
                id: Uuid::new_v4(),
                name: "Test Restaurant".to_string(),
                location: "Test City".to_string(),
                latitude: None,
                longitude: None,
                seating_capacity,
                current_occupancy,
                category_id: None,
                source: SOURCE_LOCAL.to_string(),
                created_at: Utc::now(),
            };
            diesel::insert_into(restaurants::table)
                .values(&restaurant)
                .execute(conn)
                .unwrap();

            let slot = TimeSlot {
                id: Uuid::new_v4(),
                restaurant_id: restaurant.id,
                day_of_week: 3,
                start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                max_capacity: 50,
            };
            diesel::insert_into(time_slots::table)
                .values(&slot)
                .execute(conn)
                .unwrap();

            BookingRequest {
                user_id: user.id,
                restaurant_id: restaurant.id,
                slot_id: slot.id,
                // 2024-05-01 is a Wednesday, matching day_of_week=3
                date: "2024-05-01".to_string(),
                num_people: 2,
                notes: None,
            }
        }

        fn occupancy(conn: &mut PgConnection, id: Uuid) -> i32 {
            restaurants::table
                .find(id)
                .select(restaurants::current_occupancy)
                .first(conn)
                .unwrap()
        }

        #[test]
        #[ignore = "requires a running postgres with DATABASE_URL set"]
        fn near_full_restaurant_rejects_then_fills_exactly() {
            let conn = &mut establish_connection();
            setup_database(conn);
            let mut request = seed(conn, 50, 48);

            request.num_people = 3;
            assert!(matches!(
                book_table(conn, request.clone()),
                Err(StoreError::CapacityExceeded(_))
            ));
            assert_eq!(occupancy(conn, request.restaurant_id), 48);

            request.num_people = 2;
            let reservation = book_table(conn, request.clone()).unwrap();
            assert_eq!(reservation.status, ReservationStatus::Confirmed);
            assert_eq!(occupancy(conn, request.restaurant_id), 50);
        }

        #[test]
        #[ignore = "requires a running postgres with DATABASE_URL set"]
        fn rejected_booking_leaves_no_reservation_row() {
            let conn = &mut establish_connection();
            setup_database(conn);
            let mut request = seed(conn, 4, 0);

            request.num_people = 5;
            assert!(matches!(
                book_table(conn, request.clone()),
                Err(StoreError::CapacityExceeded(_))
            ));
            let count: i64 = reservations::table.count().first(conn).unwrap();
            assert_eq!(count, 0);
            assert_eq!(occupancy(conn, request.restaurant_id), 0);
        }

        #[test]
        #[ignore = "requires a running postgres with DATABASE_URL set"]
        fn unknown_slot_is_not_found() {
            let conn = &mut establish_connection();
            setup_database(conn);
            let mut request = seed(conn, 50, 0);
            request.slot_id = Uuid::new_v4();

            assert!(matches!(
                book_table(conn, request),
                Err(StoreError::NotFound(_))
            ));
        }
    }
}
