use super::query::enum_column;
use super::types::Database;
use crate::search::{EntityKind, Predicate};
use anyhow::{bail, Result};
use assetdesk_common::{NewUser, Page, PageRequest, SortOrder, UpdateUser, User};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

const USER_COLUMNS: &str = "staff_code, username, first_name, last_name, date_of_birth, joined_date, gender, role, location_id, is_deleted, first_login";

const NEXT_STAFF_NUMBER: &str = "SELECT COALESCE(MAX(CAST(SUBSTR(staff_code, 3) AS INTEGER)), 0) + 1 FROM users WHERE staff_code LIKE 'SD%'";

fn staff_code(number: i64) -> String {
    format!("SD{:04}", number)
}

async fn insert_user_row<'e, E>(executor: E, user: &User) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO users (staff_code, username, first_name, last_name, date_of_birth, joined_date, gender, role, location_id, is_deleted, first_login) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.staff_code)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.date_of_birth)
    .bind(user.joined_date)
    .bind(user.gender.as_ref())
    .bind(user.role.as_ref())
    .bind(user.location_id)
    .bind(user.is_deleted)
    .bind(user.first_login)
    .execute(executor)
    .await?;
    Ok(())
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        staff_code: row.try_get("staff_code")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        joined_date: row.try_get("joined_date")?,
        gender: enum_column(row, "gender")?,
        role: enum_column(row, "role")?,
        location_id: row.try_get("location_id")?,
        is_deleted: row.try_get("is_deleted")?,
        first_login: row.try_get("first_login")?,
    })
}

impl Database {
    pub async fn insert_user(&self, user: &User) -> Result<()> {
        insert_user_row(&self.pool, user).await
    }

    /// Insert a first-login user, taking the first free username among `base`,
    /// `base1`, `base2`, ... and the next staff code in the same transaction
    pub async fn insert_new_user(
        &self,
        base_username: &str,
        profile: &NewUser,
        location_id: i64,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let mut username = base_username.to_string();
        let mut suffix = 1;
        loop {
            let taken: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                    .bind(&username)
                    .fetch_one(&mut *tx)
                    .await?;
            if taken == 0 {
                break;
            }
            username = format!("{}{}", base_username, suffix);
            suffix += 1;
        }
        let next: i64 = sqlx::query_scalar(NEXT_STAFF_NUMBER)
            .fetch_one(&mut *tx)
            .await?;

        let user = User {
            staff_code: staff_code(next),
            username,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            date_of_birth: profile.date_of_birth,
            joined_date: profile.joined_date,
            gender: profile.gender,
            role: profile.role,
            location_id,
            is_deleted: false,
            first_login: true,
        };
        insert_user_row(&mut *tx, &user).await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn get_user_by_staff_code(&self, staff_code: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE staff_code = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(staff_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    /// Staff code after the highest one in use, `SD0001` onwards
    pub async fn next_staff_code(&self) -> Result<String> {
        let next: i64 = sqlx::query_scalar(NEXT_STAFF_NUMBER)
            .fetch_one(&self.pool)
            .await?;
        Ok(staff_code(next))
    }

    /// Page through users matching a predicate, by first name unless told otherwise
    pub async fn find_users(&self, predicate: &Predicate, request: &PageRequest) -> Result<Page<User>> {
        self.fetch_page(
            EntityKind::User.schema(),
            USER_COLUMNS,
            predicate,
            request,
            &[SortOrder::asc("firstName")],
            user_from_row,
        )
        .await
    }

    pub async fn count_users(&self, predicate: &Predicate) -> Result<u64> {
        self.count_matching(EntityKind::User.schema(), predicate)
            .await
    }

    /// Rewrite the profile fields of an active user
    pub async fn update_user(&self, staff_code: &str, update: &UpdateUser) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET date_of_birth = ?, joined_date = ?, gender = ?, role = ? WHERE staff_code = ? AND is_deleted = 0",
        )
        .bind(update.date_of_birth)
        .bind(update.joined_date)
        .bind(update.gender.as_ref())
        .bind(update.role.as_ref())
        .bind(staff_code)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            bail!("Active user not found: {}", staff_code);
        }

        match self.get_user_by_staff_code(staff_code).await? {
            Some(user) => Ok(user),
            None => bail!("Active user not found: {}", staff_code),
        }
    }

    pub async fn disable_user(&self, staff_code: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_deleted = 1 WHERE staff_code = ? AND is_deleted = 0")
            .bind(staff_code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("Active user not found: {}", staff_code);
        }
        Ok(())
    }
}
