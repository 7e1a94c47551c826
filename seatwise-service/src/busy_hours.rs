use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::availability::iso_weekday;
use crate::error::StoreError;
use crate::models::{BusyHour, ReservationStatus};
use crate::schema::{busy_hours, reservations, restaurants, time_slots};

/// Scored cells cover typical service hours, 10:00 through 22:00.
pub const FIRST_HOUR: i32 = 10;
pub const LAST_HOUR: i32 = 22;

pub const TRAILING_DAYS: i64 = 28;
pub const DEFAULT_CAPACITY: i32 = 50;

/// Re-derives the whole weekday x hour busyness grid for one restaurant from
/// the trailing four weeks of confirmed reservations, in a single window
/// query plus one upsert. Last writer wins per cell.
pub fn refresh_busy_hours(conn: &mut PgConnection, restaurant_id: Uuid) -> Result<(), StoreError> {
    let capacity = restaurants::table
        .find(restaurant_id)
        .select(restaurants::seating_capacity)
        .first::<i32>(conn)
        .optional()?;
    let capacity = match capacity {
        Some(c) if c > 0 => c,
        _ => DEFAULT_CAPACITY,
    };

    let since = Utc::now().date_naive() - Duration::days(TRAILING_DAYS);
    let occurrences: Vec<(NaiveDate, NaiveTime, NaiveTime)> = reservations::table
        .inner_join(time_slots::table)
        .filter(reservations::restaurant_id.eq(restaurant_id))
        .filter(reservations::status.eq(ReservationStatus::Confirmed))
        .filter(reservations::reservation_date.ge(since))
        .select((
            reservations::reservation_date,
            time_slots::start_time,
            time_slots::end_time,
        ))
        .load(conn)?;

    let scores = cell_scores(&occurrences, capacity);
    let now = Utc::now();
    let rows: Vec<BusyHour> = scores
        .into_iter()
        .map(|((day_of_week, hour_of_day), busyness_score)| BusyHour {
            restaurant_id,
            day_of_week,
            hour_of_day,
            busyness_score,
            updated_at: now,
        })
        .collect();

    diesel::insert_into(busy_hours::table)
        .values(&rows)
        .on_conflict((
            busy_hours::restaurant_id,
            busy_hours::day_of_week,
            busy_hours::hour_of_day,
        ))
        .do_update()
        .set((
            busy_hours::busyness_score.eq(excluded(busy_hours::busyness_score)),
            busy_hours::updated_at.eq(excluded(busy_hours::updated_at)),
        ))
        .execute(conn)?;

    Ok(())
}

/// One score per (ISO weekday, hour) cell. A reservation contributes to every
/// hour its slot interval covers (`start.hour() <= h < end.hour()`); the cell
/// count is averaged over the four trailing weeks and normalized by seating
/// capacity, clamped to 1.0.
fn cell_scores(
    occurrences: &[(NaiveDate, NaiveTime, NaiveTime)],
    capacity: i32,
) -> Vec<((i32, i32), f64)> {
    let mut counts: HashMap<(i32, i32), u32> = HashMap::new();
    for (date, start, end) in occurrences {
        let day = iso_weekday(*date);
        for hour in FIRST_HOUR..=LAST_HOUR {
            if start.hour() as i32 <= hour && (end.hour() as i32) > hour {
                *counts.entry((day, hour)).or_insert(0) += 1;
            }
        }
    }

    let mut scores = Vec::with_capacity(7 * (LAST_HOUR - FIRST_HOUR + 1) as usize);
    for day in 1..=7 {
        for hour in FIRST_HOUR..=LAST_HOUR {
            let count = counts.get(&(day, hour)).copied().unwrap_or(0);
            let weekly_average = f64::from(count) / 4.0;
            let score = (weekly_average / f64::from(capacity)).min(1.0);
            scores.push(((day, hour), score));
        }
    }
    scores
}
