use diesel::prelude::*;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{ActivityLog, NewActivityLog};
use crate::schema::activity_log;

pub const PAGE_SIZE: i64 = 50;

/// Best-effort audit appender. A failed write must never fail the operation
/// being recorded, so errors are swallowed here.
pub struct ActivityRecorder<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ActivityRecorder<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn record(&mut self, user_id: Option<Uuid>, action: &str, detail: Option<String>) {
        let _ = diesel::insert_into(activity_log::table)
            .values(NewActivityLog {
                user_id,
                action: action.to_string(),
                detail,
            })
            .execute(self.conn);
    }
}

/// Newest first, `PAGE_SIZE` entries per page; `page` is 1-based.
pub fn recent_activity(conn: &mut PgConnection, page: i64) -> Result<Vec<ActivityLog>, StoreError> {
    let offset = (page.max(1) - 1) * PAGE_SIZE;
    let entries = activity_log::table
        .order(activity_log::created_at.desc())
        .offset(offset)
        .limit(PAGE_SIZE)
        .select(ActivityLog::as_select())
        .load(conn)?;
    Ok(entries)
}
