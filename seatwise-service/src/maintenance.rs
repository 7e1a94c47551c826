use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::sql_query;

use crate::error::StoreError;
use crate::models::ReservationStatus;
use crate::schema::{activity_log, reservations};

const RETENTION_DAYS: i64 = 90;

const HOT_TABLES: &[&str] = &[
    "restaurants",
    "reservations",
    "time_slots",
    "reviews",
    "busy_hours",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Optimize,
    Cleanup,
}

impl MaintenanceAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "optimize" => Some(MaintenanceAction::Optimize),
            "cleanup" => Some(MaintenanceAction::Cleanup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceAction::Optimize => "optimize",
            MaintenanceAction::Cleanup => "cleanup",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceItem {
    pub name: String,
    pub affected: i64,
}

pub fn run_maintenance(
    conn: &mut PgConnection,
    action: MaintenanceAction,
) -> Result<Vec<MaintenanceItem>, StoreError> {
    match action {
        MaintenanceAction::Optimize => {
            let mut items = Vec::with_capacity(HOT_TABLES.len());
            for table in HOT_TABLES {
                sql_query(format!("ANALYZE {table}")).execute(conn)?;
                items.push(MaintenanceItem {
                    name: format!("analyze.{table}"),
                    affected: 0,
                });
            }
            Ok(items)
        }
        MaintenanceAction::Cleanup => {
            let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
            let stale_logs = diesel::delete(
                activity_log::table.filter(activity_log::created_at.lt(cutoff)),
            )
            .execute(conn)?;
            let stale_cancellations = diesel::delete(
                reservations::table
                    .filter(reservations::status.eq(ReservationStatus::Cancelled))
                    .filter(reservations::created_at.lt(cutoff)),
            )
            .execute(conn)?;
            Ok(vec![
                MaintenanceItem {
                    name: "activity_log.purged".to_string(),
                    affected: stale_logs as i64,
                },
                MaintenanceItem {
                    name: "reservations.cancelled.purged".to_string(),
                    affected: stale_cancellations as i64,
                },
            ])
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

/// Row counts for the diagnostic passthrough page.
pub fn table_stats(conn: &mut PgConnection) -> Result<Vec<TableCount>, StoreError> {
    use crate::schema::{busy_hours, menu_items, restaurants, reviews, time_slots, users};

    let counts = [
        ("restaurants", restaurants::table.count().first::<i64>(conn)?),
        ("reservations", reservations::table.count().first::<i64>(conn)?),
        ("time_slots", time_slots::table.count().first::<i64>(conn)?),
        ("reviews", reviews::table.count().first::<i64>(conn)?),
        ("menu_items", menu_items::table.count().first::<i64>(conn)?),
        ("busy_hours", busy_hours::table.count().first::<i64>(conn)?),
        ("users", users::table.count().first::<i64>(conn)?),
        ("activity_log", activity_log::table.count().first::<i64>(conn)?),
    ];
    Ok(counts
        .into_iter()
        .map(|(table, rows)| TableCount {
            table: table.to_string(),
            rows,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions_only() {
        assert_eq!(
            MaintenanceAction::parse("optimize"),
            Some(MaintenanceAction::Optimize)
        );
        assert_eq!(
            MaintenanceAction::parse("cleanup"),
            Some(MaintenanceAction::Cleanup)
        );
        assert_eq!(MaintenanceAction::parse("drop-everything"), None);
        assert_eq!(MaintenanceAction::parse(""), None);
    }

    #[test]
    fn action_names_round_trip() {
        for action in [MaintenanceAction::Optimize, MaintenanceAction::Cleanup] {
            assert_eq!(MaintenanceAction::parse(action.as_str()), Some(action));
        }
    }
}
