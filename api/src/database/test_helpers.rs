/// Shared test helpers for database and service tests
use super::Database;
use assetdesk_common::{
    Asset, AssetState, Category, Gender, NewAsset, Role, User,
};
use chrono::NaiveDate;

/// Fresh in-memory database with the schema applied
pub async fn setup_test_db() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory test database")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn seed_category(db: &Database, code: &str, name: &str) {
    db.insert_category(&Category {
        category_code: code.to_string(),
        category_name: name.to_string(),
    })
    .await
    .expect("Failed to insert category");
}

pub async fn seed_asset(
    db: &Database,
    name: &str,
    category: &str,
    state: AssetState,
    location_id: i64,
) -> Asset {
    db.insert_asset(
        &NewAsset {
            asset_name: name.to_string(),
            category_code: category.to_string(),
            state,
            install_date: date(2021, 6, 15),
            specification: None,
        },
        location_id,
    )
    .await
    .expect("Failed to insert asset")
}

pub async fn seed_user(db: &Database, username: &str, role: Role, location_id: i64) -> User {
    let user = User {
        staff_code: db.next_staff_code().await.expect("Failed to get staff code"),
        username: username.to_string(),
        first_name: username.to_string(),
        last_name: "Tester".to_string(),
        date_of_birth: date(1990, 1, 1),
        joined_date: date(2020, 3, 2),
        gender: Gender::Other,
        role,
        location_id,
        is_deleted: false,
        first_login: true,
    };
    db.insert_user(&user).await.expect("Failed to insert user");
    user
}
