use std::collections::HashMap;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Utc};
use diesel::dsl::{avg, count_distinct, count_star, sum};
use diesel::prelude::*;
use uuid::Uuid;

use crate::availability::iso_weekday;
use crate::busy_hours::TRAILING_DAYS;
use crate::error::StoreError;
use crate::models::ReservationStatus;
use crate::schema::{reservations, restaurants, time_slots, users};

#[derive(Debug, Clone, PartialEq)]
pub struct TopRestaurant {
    pub name: String,
    pub booking_count: i64,
}

pub fn top_restaurants(
    conn: &mut PgConnection,
    limit: usize,
) -> Result<Vec<TopRestaurant>, StoreError> {
    let rows = reservations::table
        .inner_join(restaurants::table)
        .group_by((restaurants::id, restaurants::name))
        .select((restaurants::name, count_star()))
        .load::<(String, i64)>(conn)?;
    let mut ranked: Vec<TopRestaurant> = rows
        .into_iter()
        .map(|(name, booking_count)| TopRestaurant {
            name,
            booking_count,
        })
        .collect();
    ranked.sort_by(|a, b| b.booking_count.cmp(&a.booking_count));
    ranked.truncate(limit);
    Ok(ranked)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OccupancyStats {
    pub avg_occupancy: f64,
    pub max_occupancy: i32,
    pub total_customers: i64,
    pub avg_occupancy_percent: f64,
}

pub fn occupancy_stats(conn: &mut PgConnection) -> Result<OccupancyStats, StoreError> {
    let rows: Vec<(i32, i32)> = restaurants::table
        .select((restaurants::current_occupancy, restaurants::seating_capacity))
        .load(conn)?;
    Ok(compute_occupancy_stats(&rows))
}

fn compute_occupancy_stats(rows: &[(i32, i32)]) -> OccupancyStats {
    if rows.is_empty() {
        return OccupancyStats::default();
    }
    let total: i64 = rows.iter().map(|(occupancy, _)| i64::from(*occupancy)).sum();
    let percent_sum: f64 = rows
        .iter()
        .map(|(occupancy, capacity)| {
            if *capacity > 0 {
                f64::from(*occupancy) / f64::from(*capacity) * 100.0
            } else {
                0.0
            }
        })
        .sum();
    OccupancyStats {
        avg_occupancy: total as f64 / rows.len() as f64,
        max_occupancy: rows.iter().map(|(occupancy, _)| *occupancy).max().unwrap_or(0),
        total_customers: total,
        avg_occupancy_percent: percent_sum / rows.len() as f64,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayCount {
    /// ISO weekday: 1=Monday .. 7=Sunday.
    pub day_of_week: i32,
    pub booking_count: i64,
}

pub fn bookings_by_weekday(conn: &mut PgConnection) -> Result<Vec<WeekdayCount>, StoreError> {
    let dates: Vec<NaiveDate> = reservations::table
        .select(reservations::reservation_date)
        .load(conn)?;
    Ok(count_by_weekday(&dates))
}

fn count_by_weekday(dates: &[NaiveDate]) -> Vec<WeekdayCount> {
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for date in dates {
        *counts.entry(iso_weekday(*date)).or_insert(0) += 1;
    }
    (1..=7)
        .map(|day_of_week| WeekdayCount {
            day_of_week,
            booking_count: counts.get(&day_of_week).copied().unwrap_or(0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceStats {
    pub source: String,
    pub restaurant_count: i64,
    pub total_customers: i64,
}

pub fn provenance_stats(conn: &mut PgConnection) -> Result<Vec<ProvenanceStats>, StoreError> {
    let rows = restaurants::table
        .group_by(restaurants::source)
        .select((
            restaurants::source,
            count_star(),
            sum(restaurants::current_occupancy),
        ))
        .load::<(String, i64, Option<i64>)>(conn)?;
    Ok(rows
        .into_iter()
        .map(|(source, restaurant_count, customers)| ProvenanceStats {
            source,
            restaurant_count,
            total_customers: customers.unwrap_or(0),
        })
        .collect())
}

pub fn cancellation_rate(conn: &mut PgConnection) -> Result<f64, StoreError> {
    let by_status = reservations::table
        .group_by(reservations::status)
        .select((reservations::status, count_star()))
        .load::<(ReservationStatus, i64)>(conn)?;
    Ok(compute_cancellation_rate(&by_status))
}

fn compute_cancellation_rate(by_status: &[(ReservationStatus, i64)]) -> f64 {
    let total: i64 = by_status.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return 0.0;
    }
    let cancelled: i64 = by_status
        .iter()
        .filter(|(status, _)| *status == ReservationStatus::Cancelled)
        .map(|(_, count)| count)
        .sum();
    cancelled as f64 / total as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyScore {
    pub restaurant_id: Uuid,
    pub name: String,
    /// Trailing-window confirmed guests over offered seat-days, in [0, 1].
    pub score: f64,
}

pub fn efficiency_scores(conn: &mut PgConnection) -> Result<Vec<EfficiencyScore>, StoreError> {
    let since = Utc::now().date_naive() - Duration::days(TRAILING_DAYS);
    let guests: HashMap<Uuid, i64> = reservations::table
        .filter(reservations::status.eq(ReservationStatus::Confirmed))
        .filter(reservations::reservation_date.ge(since))
        .group_by(reservations::restaurant_id)
        .select((reservations::restaurant_id, sum(reservations::num_people)))
        .load::<(Uuid, Option<i64>)>(conn)?
        .into_iter()
        .map(|(id, guests)| (id, guests.unwrap_or(0)))
        .collect();
    let rows: Vec<(Uuid, String, i32)> = restaurants::table
        .select((
            restaurants::id,
            restaurants::name,
            restaurants::seating_capacity,
        ))
        .load(conn)?;
    Ok(compute_efficiency(rows, &guests))
}

fn compute_efficiency(
    rows: Vec<(Uuid, String, i32)>,
    guests: &HashMap<Uuid, i64>,
) -> Vec<EfficiencyScore> {
    let mut scores: Vec<EfficiencyScore> = rows
        .into_iter()
        .map(|(restaurant_id, name, capacity)| {
            let served = guests.get(&restaurant_id).copied().unwrap_or(0);
            let offered = i64::from(capacity.max(1)) * TRAILING_DAYS;
            EfficiencyScore {
                restaurant_id,
                name,
                score: (served as f64 / offered as f64).min(1.0),
            }
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakHour {
    pub hour_of_day: i32,
    pub booking_count: i64,
}

pub fn peak_hours(conn: &mut PgConnection, limit: usize) -> Result<Vec<PeakHour>, StoreError> {
    let starts: Vec<NaiveTime> = reservations::table
        .inner_join(time_slots::table)
        .select(time_slots::start_time)
        .load(conn)?;
    Ok(rank_peak_hours(&starts, limit))
}

fn rank_peak_hours(starts: &[NaiveTime], limit: usize) -> Vec<PeakHour> {
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for start in starts {
        *counts.entry(start.hour() as i32).or_insert(0) += 1;
    }
    let mut ranked: Vec<PeakHour> = counts
        .into_iter()
        .map(|(hour_of_day, booking_count)| PeakHour {
            hour_of_day,
            booking_count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.booking_count
            .cmp(&a.booking_count)
            .then(a.hour_of_day.cmp(&b.hour_of_day))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPattern {
    pub user_id: Uuid,
    pub name: String,
    pub booking_count: i64,
    pub avg_party_size: f64,
    pub distinct_restaurants: i64,
}

pub fn user_patterns(
    conn: &mut PgConnection,
    limit: usize,
) -> Result<Vec<UserPattern>, StoreError> {
    let rows = reservations::table
        .inner_join(users::table)
        .group_by((users::id, users::name))
        .select((
            users::id,
            users::name,
            count_star(),
            avg(reservations::num_people),
            count_distinct(reservations::restaurant_id),
        ))
        .load::<(Uuid, String, i64, Option<BigDecimal>, i64)>(conn)?;
    let mut patterns: Vec<UserPattern> = rows
        .into_iter()
        .map(
            |(user_id, name, booking_count, avg_party, distinct_restaurants)| UserPattern {
                user_id,
                name,
                booking_count,
                avg_party_size: avg_party.and_then(|a| a.to_f64()).unwrap_or(0.0),
                distinct_restaurants,
            },
        )
        .collect();
    patterns.sort_by(|a, b| b.booking_count.cmp(&a.booking_count));
    patterns.truncate(limit);
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_stats_of_empty_store_are_zero() {
        let stats = compute_occupancy_stats(&[]);
        assert_eq!(stats, OccupancyStats::default());
        assert!(!stats.avg_occupancy_percent.is_nan());
    }

    #[test]
    fn occupancy_stats_aggregate_correctly() {
        let stats = compute_occupancy_stats(&[(10, 50), (30, 60), (50, 50)]);
        assert_eq!(stats.total_customers, 90);
        assert_eq!(stats.max_occupancy, 50);
        assert!((stats.avg_occupancy - 30.0).abs() < 1e-9);
        // 20% + 50% + 100% over three rows
        assert!((stats.avg_occupancy_percent - (170.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_capacity_rows_do_not_poison_the_percentage() {
        let stats = compute_occupancy_stats(&[(5, 0)]);
        assert_eq!(stats.avg_occupancy_percent, 0.0);
    }

    #[test]
    fn weekday_counts_cover_all_seven_days() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), // Wednesday
            NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(), // Wednesday
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(), // Sunday
        ];
        let counts = count_by_weekday(&dates);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[2], WeekdayCount { day_of_week: 3, booking_count: 2 });
        assert_eq!(counts[6], WeekdayCount { day_of_week: 7, booking_count: 1 });
        assert_eq!(counts[0].booking_count, 0);
    }

    #[test]
    fn cancellation_rate_of_empty_table_is_zero() {
        assert_eq!(compute_cancellation_rate(&[]), 0.0);
    }

    #[test]
    fn cancellation_rate_is_cancelled_over_total() {
        let rate = compute_cancellation_rate(&[
            (ReservationStatus::Confirmed, 6),
            (ReservationStatus::Cancelled, 2),
        ]);
        assert!((rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn efficiency_is_clamped_and_sorted() {
        let busy = Uuid::new_v4();
        let idle = Uuid::new_v4();
        let guests = HashMap::from([(busy, 10_000i64)]);
        let scores = compute_efficiency(
            vec![
                (idle, "idle".to_string(), 50),
                (busy, "busy".to_string(), 50),
            ],
            &guests,
        );
        assert_eq!(scores[0].name, "busy");
        assert_eq!(scores[0].score, 1.0);
        assert_eq!(scores[1].score, 0.0);
    }

    #[test]
    fn peak_hours_rank_by_count_then_hour() {
        let starts = vec![
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        ];
        let ranked = rank_peak_hours(&starts, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], PeakHour { hour_of_day: 19, booking_count: 2 });
        assert_eq!(ranked[1], PeakHour { hour_of_day: 12, booking_count: 1 });
    }
}
