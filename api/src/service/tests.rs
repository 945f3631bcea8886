use super::*;
use crate::database::test_helpers::{date, seed_asset, seed_category, seed_user, setup_test_db};
use crate::search::SearchError;
use assetdesk_common::{
    AssetState, AssignmentState, EditAsset, ErrorCode, Gender, NewAsset, NewAssignment, NewUser,
    SortOrder, UpdateUser, User,
};
use chrono::{Duration, NaiveDateTime, Utc};

const MAX_PAGE_SIZE: u32 = 50;

async fn setup() -> (AssetDeskService, Arc<Database>) {
    let db = Arc::new(setup_test_db().await);
    seed_category(&db, "LA", "Laptop").await;
    seed_user(&db, "admin", Role::Admin, 1).await;
    seed_user(&db, "binhnv", Role::User, 1).await;
    seed_user(&db, "faraway", Role::User, 2).await;
    (AssetDeskService::new(db.clone(), MAX_PAGE_SIZE), db)
}

fn admin() -> CallerScope {
    CallerScope::new("admin", 1, Role::Admin)
}

fn binh() -> CallerScope {
    CallerScope::new("binhnv", 1, Role::User)
}

fn tomorrow() -> NaiveDateTime {
    (Utc::now() + Duration::days(1)).naive_utc()
}

fn new_assignment(asset_code: &str, assignee: &str) -> NewAssignment {
    NewAssignment {
        asset_code: asset_code.to_string(),
        assigned_to: assignee.to_string(),
        assigned_date: tomorrow(),
        note: None,
    }
}

fn new_user(first: &str, last: &str) -> NewUser {
    NewUser {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: date(1995, 5, 20),
        joined_date: date(2021, 8, 2),
        gender: Gender::Female,
        role: Role::User,
    }
}

#[test]
fn test_generate_username() {
    assert_eq!(generate_username("Binh", "Nguyen Van"), "binhnv");
    assert_eq!(generate_username("An", "Tran"), "ant");
    assert_eq!(generate_username("  Mai ", "  Le   Thi  Hoa "), "mailth");
}

#[test]
fn test_api_error_from_anyhow_keeps_search_errors() {
    let search: ApiError = anyhow::Error::new(SearchError::InvalidPage("x".into())).into();
    assert_eq!(search.error_code(), ErrorCode::ErrInvalidPage);
    assert_eq!(search.status(), 400);

    let storage: ApiError = anyhow::anyhow!("disk on fire").into();
    assert_eq!(storage.error_code(), ErrorCode::ErrInternal);
    let envelope: assetdesk_common::ResponseEnvelope<()> = storage.into_envelope();
    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.message.as_deref(), Some("Internal error"));
}

#[tokio::test]
async fn test_search_assets_scoped_to_location() {
    let (service, db) = setup().await;
    for i in 0..12 {
        seed_asset(&db, &format!("Laptop {:02}", i), "LA", AssetState::Available, 1).await;
    }
    seed_asset(&db, "Spare", "LA", AssetState::NotAvailable, 1).await;
    seed_asset(&db, "Remote", "LA", AssetState::Available, 2).await;

    let page = service
        .search_assets(&admin(), "state:AVAILABLE", &PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_elements, 12);
    assert!(page.items.iter().all(|a| a.location_id == 1));

    assert_eq!(service.count_assets(&admin(), "").await.unwrap(), 13);

    // A client cannot widen its scope by filtering on another location
    assert_eq!(service.count_assets(&admin(), "location:2").await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_assets_rejects_bad_filters() {
    let (service, _db) = setup().await;

    let err = service
        .search_assets(&admin(), "colour:red", &PageRequest::new(0, 10))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrSearchUnknownField);

    let err = service
        .search_assets(&admin(), "assetName<M", &PageRequest::new(0, 10))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrSearchTypeMismatch);

    let request = PageRequest::new(0, 10).sorted_by(SortOrder::asc("secret"));
    let err = service
        .search_assets(&admin(), "", &request)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrSearchUnknownField);

    let err = service
        .search_assets(&admin(), "", &PageRequest::new(0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrInvalidPage);
}

#[tokio::test]
async fn test_search_assets_clamps_page_size() {
    let (service, db) = setup().await;
    for i in 0..60 {
        seed_asset(&db, &format!("Laptop {:02}", i), "LA", AssetState::Available, 1).await;
    }
    let page = service
        .search_assets(&admin(), "", &PageRequest::new(0, 500))
        .await
        .unwrap();
    assert_eq!(page.items.len(), MAX_PAGE_SIZE as usize);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_create_asset_rules() {
    let (service, _db) = setup().await;
    let params = NewAsset {
        asset_name: "ThinkPad X1".to_string(),
        category_code: "la".to_string(),
        state: AssetState::Available,
        install_date: date(2022, 4, 1),
        specification: Some("16GB".to_string()),
    };

    let asset = service.create_asset(&admin(), params.clone()).await.unwrap();
    assert_eq!(asset.asset_code, "LA000001");
    assert_eq!(asset.location_id, 1);

    let err = service
        .create_asset(
            &admin(),
            NewAsset {
                state: AssetState::Assigned,
                ..params.clone()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetStateNotCorrect);

    let err = service
        .create_asset(
            &admin(),
            NewAsset {
                category_code: "ZZ".to_string(),
                ..params
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrCategoryNotFound);
}

#[tokio::test]
async fn test_delete_asset_refused_with_history() {
    let (service, db) = setup().await;
    let used = seed_asset(&db, "Used", "LA", AssetState::Available, 1).await;
    let unused = seed_asset(&db, "Unused", "LA", AssetState::Available, 1).await;
    let remote = seed_asset(&db, "Remote", "LA", AssetState::Available, 2).await;

    service
        .create_assignment(&admin(), new_assignment(&used.asset_code, "binhnv"))
        .await
        .unwrap();

    let err = service
        .delete_asset(&admin(), &used.asset_code)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetHasAssignment);
    assert_eq!(err.status(), 409);

    let err = service
        .check_delete_asset(&admin(), &remote.asset_code)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrLocationMismatch);

    service.delete_asset(&admin(), &unused.asset_code).await.unwrap();
    let err = service
        .delete_asset(&admin(), &unused.asset_code)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetNotFound);
}

#[tokio::test]
async fn test_asset_report_for_caller_location() {
    let (service, db) = setup().await;
    seed_asset(&db, "A", "LA", AssetState::Available, 1).await;
    seed_asset(&db, "B", "LA", AssetState::Recycled, 1).await;
    seed_asset(&db, "C", "LA", AssetState::Available, 2).await;

    let report = service.asset_report(&admin()).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].available, 1);
    assert_eq!(report[0].recycled, 1);
    assert_eq!(report[0].total, 2);
}

#[tokio::test]
async fn test_create_user_generates_unique_username() {
    let (service, _db) = setup().await;

    let first = service
        .create_user(&admin(), new_user("Binh", "Nguyen Van"))
        .await
        .unwrap();
    // "binhnv" is already seeded
    assert_eq!(first.username, "binhnv1");
    assert_eq!(first.staff_code, "SD0004");
    assert!(first.first_login);

    let second = service
        .create_user(&admin(), new_user("Binh", "Nguyen Van"))
        .await
        .unwrap();
    assert_eq!(second.username, "binhnv2");

    let err = service
        .create_user(
            &admin(),
            NewUser {
                joined_date: date(1990, 1, 1),
                ..new_user("Late", "Joiner")
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrCreateUserFail);
}

#[tokio::test]
async fn test_search_users_default_sort_and_scope() {
    let (service, _db) = setup().await;
    let page = service
        .search_users(&admin(), "role:user", &PageRequest::new(0, 10))
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["binhnv"]);
    assert_eq!(service.count_users(&admin(), "").await.unwrap(), 2);
}

#[tokio::test]
async fn test_disable_user_blocked_by_valid_assignment() {
    let (service, db) = setup().await;
    let asset = seed_asset(&db, "Laptop", "LA", AssetState::Available, 1).await;
    let binh_code = db
        .get_user_by_username("binhnv")
        .await
        .unwrap()
        .unwrap()
        .staff_code;

    let assignment = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "binhnv"))
        .await
        .unwrap();

    let err = service.disable_user(&admin(), &binh_code).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUserHasValidAssignment);

    service
        .decline_assignment(&binh(), assignment.assignment_id)
        .await
        .unwrap();
    service.disable_user(&admin(), &binh_code).await.unwrap();

    let err = service.disable_user(&admin(), &binh_code).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUserIsDisabled);

    let err = service.disable_user(&admin(), "SD9999").await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUserNotFound);
}

#[tokio::test]
async fn test_create_assignment_rules() {
    let (service, db) = setup().await;
    let asset = seed_asset(&db, "Laptop", "LA", AssetState::Available, 1).await;
    let broken = seed_asset(&db, "Broken", "LA", AssetState::NotAvailable, 1).await;

    let mut past = new_assignment(&asset.asset_code, "binhnv");
    past.assigned_date = date(2020, 1, 1).and_hms_opt(8, 0, 0).unwrap();
    let err = service.create_assignment(&admin(), past).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssignedDateInPast);

    let err = service
        .create_assignment(&admin(), new_assignment(&broken.asset_code, "binhnv"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetNotAvailable);

    let err = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "nobody"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUserNotFound);

    let err = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "faraway"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrLocationMismatch);

    let created = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "binhnv"))
        .await
        .unwrap();
    assert_eq!(created.state, AssignmentState::WaitingForAcceptance);
    assert_eq!(created.assigned_by, "admin");
    assert_eq!(
        db.get_asset(&asset.asset_code).await.unwrap().unwrap().state,
        AssetState::Assigned
    );
}

#[tokio::test]
async fn test_accept_and_decline_only_by_assignee() {
    let (service, db) = setup().await;
    let first = seed_asset(&db, "First", "LA", AssetState::Available, 1).await;
    let second = seed_asset(&db, "Second", "LA", AssetState::Available, 1).await;

    let a = service
        .create_assignment(&admin(), new_assignment(&first.asset_code, "binhnv"))
        .await
        .unwrap();
    let b = service
        .create_assignment(&admin(), new_assignment(&second.asset_code, "binhnv"))
        .await
        .unwrap();

    let err = service
        .accept_assignment(&admin(), a.assignment_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrNotAssignee);

    service.accept_assignment(&binh(), a.assignment_id).await.unwrap();
    let err = service
        .decline_assignment(&binh(), a.assignment_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssignmentNotWaiting);

    service.decline_assignment(&binh(), b.assignment_id).await.unwrap();
    assert_eq!(
        db.get_asset(&second.asset_code).await.unwrap().unwrap().state,
        AssetState::Available
    );
    assert_eq!(
        db.get_asset(&first.asset_code).await.unwrap().unwrap().state,
        AssetState::Assigned
    );

    let err = service.accept_assignment(&binh(), 9999).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssignmentNotFound);
}

#[tokio::test]
async fn test_delete_assignment() {
    let (service, db) = setup().await;
    let first = seed_asset(&db, "First", "LA", AssetState::Available, 1).await;
    let second = seed_asset(&db, "Second", "LA", AssetState::Available, 1).await;

    let accepted = service
        .create_assignment(&admin(), new_assignment(&first.asset_code, "binhnv"))
        .await
        .unwrap();
    service
        .accept_assignment(&binh(), accepted.assignment_id)
        .await
        .unwrap();
    let err = service
        .delete_assignment(&admin(), accepted.assignment_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssignmentAccepted);

    let waiting = service
        .create_assignment(&admin(), new_assignment(&second.asset_code, "binhnv"))
        .await
        .unwrap();
    service
        .delete_assignment(&admin(), waiting.assignment_id)
        .await
        .unwrap();
    assert_eq!(
        db.get_asset(&second.asset_code).await.unwrap().unwrap().state,
        AssetState::Available
    );
}

#[tokio::test]
async fn test_search_assignments_users_see_only_their_own() {
    let (service, db) = setup().await;
    seed_user(&db, "mai", Role::User, 1).await;
    let first = seed_asset(&db, "First", "LA", AssetState::Available, 1).await;
    let second = seed_asset(&db, "Second", "LA", AssetState::Available, 1).await;

    service
        .create_assignment(&admin(), new_assignment(&first.asset_code, "binhnv"))
        .await
        .unwrap();
    service
        .create_assignment(&admin(), new_assignment(&second.asset_code, "mai"))
        .await
        .unwrap();

    let all = service
        .search_assignments(&admin(), "", &PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(all.total_elements, 2);

    let own = service
        .search_assignments(&binh(), "", &PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(own.total_elements, 1);
    assert_eq!(own.items[0].assigned_to, "binhnv");

    // Filtering on someone else yields nothing rather than their rows
    let other = service
        .search_assignments(&binh(), "assignedTo:mai", &PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(other.total_elements, 0);

    // Counting follows the same scope as listing
    assert_eq!(
        service.count_assignments(&binh(), "").await.unwrap(),
        own.total_elements
    );
    assert_eq!(
        service
            .count_assignments(&binh(), "assignedTo:mai")
            .await
            .unwrap(),
        0
    );

    assert_eq!(
        service
            .count_assignments(&admin(), "state:WAITING_FOR_ACCEPTANCE")
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_plain_users_cannot_administer() {
    let (service, db) = setup().await;
    let asset = seed_asset(&db, "Laptop", "LA", AssetState::Available, 1).await;
    let binh_code = db
        .get_user_by_username("binhnv")
        .await
        .unwrap()
        .unwrap()
        .staff_code;
    let assignment = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "binhnv"))
        .await
        .unwrap();
    let spare = seed_asset(&db, "Spare", "LA", AssetState::Available, 1).await;

    let denied = |err: ApiError| {
        assert_eq!(err.error_code(), ErrorCode::ErrAccessDenied);
        assert_eq!(err.status(), 403);
    };

    let params = NewAsset {
        asset_name: "Sneaky".to_string(),
        category_code: "LA".to_string(),
        state: AssetState::Available,
        install_date: date(2022, 4, 1),
        specification: None,
    };
    denied(service.create_asset(&binh(), params).await.unwrap_err());
    denied(
        service
            .search_assets(&binh(), "", &PageRequest::new(0, 10))
            .await
            .unwrap_err(),
    );
    denied(service.count_assets(&binh(), "").await.unwrap_err());
    denied(service.get_asset(&binh(), &spare.asset_code).await.unwrap_err());
    denied(
        service
            .check_delete_asset(&binh(), &spare.asset_code)
            .await
            .unwrap_err(),
    );
    denied(service.delete_asset(&binh(), &spare.asset_code).await.unwrap_err());
    denied(service.asset_report(&binh()).await.unwrap_err());

    denied(
        service
            .create_user(&binh(), new_user("Self", "Promoted"))
            .await
            .unwrap_err(),
    );
    denied(service.count_users(&binh(), "").await.unwrap_err());
    denied(service.disable_user(&binh(), &binh_code).await.unwrap_err());

    denied(
        service
            .create_assignment(&binh(), new_assignment(&spare.asset_code, "binhnv"))
            .await
            .unwrap_err(),
    );
    denied(
        service
            .delete_assignment(&binh(), assignment.assignment_id)
            .await
            .unwrap_err(),
    );

    // Nothing changed on the way
    assert!(db.get_asset(&spare.asset_code).await.unwrap().is_some());
    assert_eq!(
        db.get_asset(&spare.asset_code).await.unwrap().unwrap().state,
        AssetState::Available
    );
    assert!(db.get_assignment(assignment.assignment_id).await.unwrap().is_some());

    // Answering their own assignment stays open to plain users
    service
        .accept_assignment(&binh(), assignment.assignment_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_edit_asset() {
    let (service, db) = setup().await;
    let asset = seed_asset(&db, "Laptop", "LA", AssetState::Available, 1).await;
    let remote = seed_asset(&db, "Remote", "LA", AssetState::Available, 2).await;
    let edit = EditAsset {
        asset_name: "Laptop Pro".to_string(),
        specification: Some("32GB".to_string()),
        install_date: date(2023, 2, 1),
        state: AssetState::WaitingForRecycle,
    };

    let edited = service
        .edit_asset(&admin(), &asset.asset_code, edit.clone())
        .await
        .unwrap();
    assert_eq!(edited.asset_name, "Laptop Pro");
    assert_eq!(edited.specification.as_deref(), Some("32GB"));
    assert_eq!(edited.install_date, date(2023, 2, 1));
    assert_eq!(edited.state, AssetState::WaitingForRecycle);
    assert_eq!(edited.category_code, "LA");

    let err = service
        .edit_asset(
            &admin(),
            &asset.asset_code,
            EditAsset {
                state: AssetState::Assigned,
                ..edit.clone()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetStateNotCorrect);

    let err = service
        .edit_asset(&admin(), &remote.asset_code, edit.clone())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrLocationMismatch);

    // Assets out on assignment are frozen
    let busy = seed_asset(&db, "Busy", "LA", AssetState::Available, 1).await;
    service
        .create_assignment(&admin(), new_assignment(&busy.asset_code, "binhnv"))
        .await
        .unwrap();
    let err = service
        .edit_asset(&admin(), &busy.asset_code, edit)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetStateNotCorrect);
    assert_eq!(
        db.get_asset(&busy.asset_code).await.unwrap().unwrap().asset_name,
        "Busy"
    );
}

#[tokio::test]
async fn test_get_records_in_scope() {
    let (service, db) = setup().await;
    seed_user(&db, "mai", Role::User, 1).await;
    let asset = seed_asset(&db, "Laptop", "LA", AssetState::Available, 1).await;
    let remote = seed_asset(&db, "Remote", "LA", AssetState::Available, 2).await;

    assert_eq!(
        service.get_asset(&admin(), &asset.asset_code).await.unwrap(),
        asset
    );
    let err = service
        .get_asset(&admin(), &remote.asset_code)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrLocationMismatch);
    let err = service.get_asset(&admin(), "LA999999").await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetNotFound);

    let code_of = |user: Option<User>| user.unwrap().staff_code;
    let binh_code = code_of(db.get_user_by_username("binhnv").await.unwrap());
    let mai_code = code_of(db.get_user_by_username("mai").await.unwrap());
    let far_code = code_of(db.get_user_by_username("faraway").await.unwrap());

    assert_eq!(
        service.get_user(&binh(), &binh_code).await.unwrap().username,
        "binhnv"
    );
    let err = service.get_user(&binh(), &mai_code).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAccessDenied);
    assert_eq!(
        service.get_user(&admin(), &mai_code).await.unwrap().username,
        "mai"
    );
    let err = service.get_user(&admin(), &far_code).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrLocationMismatch);

    let assignment = service
        .create_assignment(&admin(), new_assignment(&asset.asset_code, "mai"))
        .await
        .unwrap();
    assert_eq!(
        service
            .get_assignment(&admin(), assignment.assignment_id)
            .await
            .unwrap(),
        assignment
    );
    let err = service
        .get_assignment(&binh(), assignment.assignment_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAccessDenied);
    let mai = CallerScope::new("mai", 1, Role::User);
    assert_eq!(
        service
            .get_assignment(&mai, assignment.assignment_id)
            .await
            .unwrap()
            .assigned_to,
        "mai"
    );
}

#[tokio::test]
async fn test_update_user() {
    let (service, db) = setup().await;
    let binh_code = db
        .get_user_by_username("binhnv")
        .await
        .unwrap()
        .unwrap()
        .staff_code;
    let update = UpdateUser {
        date_of_birth: date(1992, 11, 3),
        joined_date: date(2019, 9, 16),
        gender: Gender::Male,
        role: Role::Admin,
    };

    let updated = service
        .update_user(&admin(), &binh_code, update.clone())
        .await
        .unwrap();
    assert_eq!(updated.date_of_birth, date(1992, 11, 3));
    assert_eq!(updated.joined_date, date(2019, 9, 16));
    assert_eq!(updated.gender, Gender::Male);
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.username, "binhnv");

    let err = service
        .update_user(
            &admin(),
            &binh_code,
            UpdateUser {
                joined_date: date(1980, 1, 1),
                ..update.clone()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUpdateUserFail);

    let err = service
        .update_user(&admin(), "SD9999", update.clone())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrUserNotFound);

    let err = service
        .update_user(&binh(), &binh_code, update)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAccessDenied);
}

#[tokio::test]
async fn test_edit_assignment_swaps_asset() {
    let (service, db) = setup().await;
    seed_user(&db, "mai", Role::User, 1).await;
    let first = seed_asset(&db, "First", "LA", AssetState::Available, 1).await;
    let second = seed_asset(&db, "Second", "LA", AssetState::Available, 1).await;
    let broken = seed_asset(&db, "Broken", "LA", AssetState::NotAvailable, 1).await;

    let waiting = service
        .create_assignment(&admin(), new_assignment(&first.asset_code, "binhnv"))
        .await
        .unwrap();

    let edited = service
        .edit_assignment(
            &admin(),
            waiting.assignment_id,
            NewAssignment {
                note: Some("swapped".to_string()),
                ..new_assignment(&second.asset_code, "mai")
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.asset_code, second.asset_code);
    assert_eq!(edited.assigned_to, "mai");
    assert_eq!(edited.note.as_deref(), Some("swapped"));
    assert_eq!(edited.state, AssignmentState::WaitingForAcceptance);
    assert_eq!(
        db.get_asset(&first.asset_code).await.unwrap().unwrap().state,
        AssetState::Available
    );
    assert_eq!(
        db.get_asset(&second.asset_code).await.unwrap().unwrap().state,
        AssetState::Assigned
    );

    let err = service
        .edit_assignment(
            &admin(),
            waiting.assignment_id,
            new_assignment(&broken.asset_code, "mai"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssetNotAvailable);
    assert_eq!(
        db.get_asset(&second.asset_code).await.unwrap().unwrap().state,
        AssetState::Assigned
    );

    let mai = CallerScope::new("mai", 1, Role::User);
    service
        .accept_assignment(&mai, waiting.assignment_id)
        .await
        .unwrap();
    let err = service
        .edit_assignment(
            &admin(),
            waiting.assignment_id,
            new_assignment(&second.asset_code, "binhnv"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ErrAssignmentNotWaiting);
}

#[tokio::test]
async fn test_create_user_staff_code_follows_highest_in_use() {
    let (service, db) = setup().await;
    // Seeded users hold SD0001..SD0003; a fourth one jumps ahead to SD0005
    let mut late = db.get_user_by_username("binhnv").await.unwrap().unwrap();
    late.staff_code = "SD0005".to_string();
    late.username = "late".to_string();
    db.insert_user(&late).await.unwrap();

    let created = service
        .create_user(&admin(), new_user("An", "Tran"))
        .await
        .unwrap();
    assert_eq!(created.staff_code, "SD0006");

    // A duplicate slipping past the generator is a conflict, not an internal error
    let err: ApiError = db.insert_user(&late).await.unwrap_err().into();
    assert_eq!(err.error_code(), ErrorCode::ErrDuplicateRecord);
    assert_eq!(err.status(), 409);
}

#[test]
fn test_respond_wraps_results() {
    let ok = respond(SuccessCode::AssetCountSuccess, Ok::<u64, ApiError>(3));
    assert!(ok.is_success());
    assert_eq!(ok.data, Some(3));

    let err = respond::<u64>(
        SuccessCode::AssetCountSuccess,
        Err(ApiError::NotFound(ErrorCode::ErrAssetNotFound, "LA000009".into())),
    );
    assert_eq!(err.status(), 404);
    assert_eq!(err.error_code, Some(ErrorCode::ErrAssetNotFound));
}
