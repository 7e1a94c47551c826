use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use uuid::Uuid;

use crate::schema::{
    activity_log, busy_hours, menu_items, reservations, restaurant_categories, restaurants,
    reviews, time_slots, users,
};

/// Provenance tag for rows entered through the admin/local path.
pub const SOURCE_LOCAL: &str = "local";
/// Provenance tag for rows ingested from the external venue lookup.
pub const SOURCE_EXTERNAL: &str = "external";

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::ReservationStatus)]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ToSql<crate::schema::sql_types::ReservationStatus, Pg> for ReservationStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ReservationStatus::Confirmed => out.write_all(b"CONFIRMED")?,
            ReservationStatus::Cancelled => out.write_all(b"CANCELLED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::ReservationStatus, Pg> for ReservationStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"CONFIRMED" => Ok(ReservationStatus::Confirmed),
            b"CANCELLED" => Ok(ReservationStatus::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurant_categories)]
pub struct RestaurantCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Clone)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub seating_capacity: i32,
    pub current_occupancy: i32,
    pub category_id: Option<Uuid>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = time_slots)]
pub struct TimeSlot {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    /// ISO weekday: 1=Monday .. 7=Sunday.
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_capacity: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(TimeSlot, foreign_key = slot_id))]
#[diesel(table_name = reservations)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub slot_id: Uuid,
    pub reservation_date: NaiveDate,
    pub num_people: i32,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(User))]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = menu_items)]
pub struct MenuItem {
    pub restaurant_id: Uuid,
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub is_available: bool,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, PartialEq)]
#[diesel(table_name = busy_hours, primary_key(restaurant_id, day_of_week, hour_of_day))]
pub struct BusyHour {
    pub restaurant_id: Uuid,
    pub day_of_week: i32,
    pub hour_of_day: i32,
    pub busyness_score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq)]
#[diesel(table_name = activity_log)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = activity_log)]
pub struct NewActivityLog {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
}
