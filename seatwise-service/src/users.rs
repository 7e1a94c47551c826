use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::User;
use crate::schema::users;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

pub fn create_user(conn: &mut PgConnection, new_user: NewUser) -> Result<User, StoreError> {
    let taken = users::table
        .filter(users::email.eq(&new_user.email))
        .count()
        .first::<i64>(conn)?;
    if taken > 0 {
        return Err(StoreError::Validation(
            "email already registered".to_string(),
        ));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email,
        phone: new_user.phone,
        password_hash: new_user.password_hash,
        is_admin: false,
        created_at: Utc::now(),
    };
    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;
    Ok(user)
}

pub fn find_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>, StoreError> {
    let user = users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .optional()?;
    Ok(user)
}

pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<User>, StoreError> {
    let user = users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()?;
    Ok(user)
}
