use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{ReservationStatus, TimeSlot};
use crate::schema::{reservations, time_slots};

#[derive(Debug, Clone, PartialEq)]
pub struct AvailableSlot {
    pub slot_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_capacity: i32,
    pub remaining: i32,
}

/// ISO weekday: 1=Monday .. 7=Sunday. Canonical across the whole store
/// (`time_slots.day_of_week`, `busy_hours.day_of_week`, reports).
pub fn iso_weekday(date: NaiveDate) -> i32 {
    date.weekday().number_from_monday() as i32
}

pub fn parse_booking_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Returns the slots valid for the date's weekday that can still seat
/// `party_size` on top of the guests already confirmed for that exact date.
/// An unparseable date yields an empty result rather than an error.
pub fn find_available_slots(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
    date_str: &str,
    party_size: i32,
) -> Result<Vec<AvailableSlot>, StoreError> {
    if party_size < 1 {
        return Err(StoreError::Validation(
            "party size must be at least 1".to_string(),
        ));
    }
    let Some(date) = parse_booking_date(date_str) else {
        return Ok(Vec::new());
    };

    let slots = time_slots::table
        .filter(time_slots::restaurant_id.eq(restaurant_id))
        .filter(time_slots::day_of_week.eq(iso_weekday(date)))
        .order(time_slots::start_time.asc())
        .select(TimeSlot::as_select())
        .load(conn)?;

    let booked = reservations::table
        .filter(reservations::slot_id.eq_any(slots.iter().map(|s| s.id)))
        .filter(reservations::reservation_date.eq(date))
        .filter(reservations::status.eq(ReservationStatus::Confirmed))
        .group_by(reservations::slot_id)
        .select((
            reservations::slot_id,
            diesel::dsl::sum(reservations::num_people),
        ))
        .load::<(Uuid, Option<i64>)>(conn)?
        .into_iter()
        .map(|(slot_id, guests)| (slot_id, guests.unwrap_or(0)))
        .collect();

    Ok(filter_by_capacity(slots, &booked, party_size))
}

fn filter_by_capacity(
    slots: Vec<TimeSlot>,
    booked: &HashMap<Uuid, i64>,
    party_size: i32,
) -> Vec<AvailableSlot> {
    slots
        .into_iter()
        .filter_map(|slot| {
            let taken = booked.get(&slot.id).copied().unwrap_or(0);
            if taken + i64::from(party_size) > i64::from(slot.max_capacity) {
                return None;
            }
            Some(AvailableSlot {
                slot_id: slot.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                max_capacity: slot.max_capacity,
                remaining: (i64::from(slot.max_capacity) - taken) as i32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: Uuid, max_capacity: i32) -> TimeSlot {
        TimeSlot {
            id,
            restaurant_id: Uuid::new_v4(),
            day_of_week: 3,
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            max_capacity,
        }
    }

    #[test]
    fn weekday_is_iso_numbered() {
        // 2024-05-01 was a Wednesday
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(iso_weekday(date), 3);
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        assert_eq!(iso_weekday(sunday), 7);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_booking_date("2024-05-01").is_some());
        assert!(parse_booking_date("01/05/2024").is_none());
        assert!(parse_booking_date("not a date").is_none());
        assert!(parse_booking_date("2024-13-40").is_none());
    }

    #[test]
    fn empty_slot_admits_exact_capacity_party() {
        let id = Uuid::new_v4();
        let booked = HashMap::new();

        let available = filter_by_capacity(vec![slot(id, 4)], &booked, 5);
        assert!(available.is_empty());

        let available = filter_by_capacity(vec![slot(id, 4)], &booked, 4);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].remaining, 4);
    }

    #[test]
    fn existing_bookings_reduce_capacity() {
        let id = Uuid::new_v4();
        let booked = HashMap::from([(id, 3i64)]);

        let available = filter_by_capacity(vec![slot(id, 4)], &booked, 2);
        assert!(available.is_empty());

        let available = filter_by_capacity(vec![slot(id, 4)], &booked, 1);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].remaining, 1);
    }

    #[test]
    fn never_returns_an_overfull_slot() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let slots: Vec<TimeSlot> = ids.iter().map(|id| slot(*id, 6)).collect();
        let booked = HashMap::from([(ids[0], 0i64), (ids[1], 2), (ids[2], 4), (ids[3], 6)]);

        for party_size in 1..=7 {
            for available in filter_by_capacity(slots.clone(), &booked, party_size) {
                let taken = booked[&available.slot_id];
                assert!(taken + i64::from(party_size) <= i64::from(available.max_capacity));
            }
        }
    }
}
