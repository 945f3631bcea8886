use anyhow::Result;
use assetdesk_api::config::AppConfig;
use assetdesk_api::database::Database;
use assetdesk_api::service::{respond, AssetDeskService, CallerScope};
use assetdesk_common::{
    AssetState, Category, Gender, NewAsset, NewAssignment, NewUser, PageRequest, Role,
    SortOrder, SuccessCode, User,
};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "assetdesk")]
#[command(about = "Asset, user and assignment management")]
struct Cli {
    /// Username of the caller
    #[arg(long, default_value = "admin")]
    user: String,

    /// Location the caller belongs to
    #[arg(long, default_value_t = 1)]
    location: i64,

    /// Role of the caller (ADMIN or USER)
    #[arg(long, default_value = "ADMIN")]
    role: Role,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Assets,
    Users,
    Assignments,
}

#[derive(Subcommand)]
enum Commands {
    /// List records matching a filter such as "state:AVAILABLE,installDate<20220101"
    Search {
        entity: Entity,
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Defaults to DEFAULT_PAGE_SIZE
        #[arg(long)]
        size: Option<u32>,
        /// Sort key as "field" or "field,desc"; repeatable
        #[arg(long)]
        sort: Vec<SortOrder>,
    },
    /// Count records matching a filter
    Count {
        entity: Entity,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Show one asset code, staff code or assignment id in the caller's scope
    Get { entity: Entity, id: String },
    /// Load demo categories, users, assets and an assignment
    Seed,
    /// Accept an assignment as the caller
    Accept { id: i64 },
    /// Decline an assignment as the caller
    Decline { id: i64 },
    /// Per-category asset report for the caller's location
    Report,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env();
    tracing::debug!("Using database {}", config.database_url);
    let database = Arc::new(Database::new(&config.database_url).await?);
    let service = AssetDeskService::new(database.clone(), config.max_page_size);
    let caller = CallerScope::new(cli.user, cli.location, cli.role);

    match cli.command {
        Commands::Search {
            entity,
            filter,
            page,
            size,
            sort,
        } => {
            let mut request = PageRequest::new(page, size.unwrap_or(config.default_page_size));
            request.sort = sort;
            match entity {
                Entity::Assets => print_json(&respond(
                    SuccessCode::AssetLoadedSuccess,
                    service.search_assets(&caller, &filter, &request).await,
                )),
                Entity::Users => print_json(&respond(
                    SuccessCode::UserLoadedSuccess,
                    service.search_users(&caller, &filter, &request).await,
                )),
                Entity::Assignments => print_json(&respond(
                    SuccessCode::AssignmentLoadedSuccess,
                    service.search_assignments(&caller, &filter, &request).await,
                )),
            }
        }
        Commands::Count { entity, filter } => {
            let (code, result) = match entity {
                Entity::Assets => (
                    SuccessCode::AssetCountSuccess,
                    service.count_assets(&caller, &filter).await,
                ),
                Entity::Users => (
                    SuccessCode::UserCountSuccess,
                    service.count_users(&caller, &filter).await,
                ),
                Entity::Assignments => (
                    SuccessCode::AssignmentCountSuccess,
                    service.count_assignments(&caller, &filter).await,
                ),
            };
            print_json(&respond(code, result))
        }
        Commands::Get { entity, id } => match entity {
            Entity::Assets => print_json(&respond(
                SuccessCode::AssetLoadedSuccess,
                service.get_asset(&caller, &id).await,
            )),
            Entity::Users => print_json(&respond(
                SuccessCode::UserLoadedSuccess,
                service.get_user(&caller, &id).await,
            )),
            Entity::Assignments => {
                let id: i64 = id.parse()?;
                print_json(&respond(
                    SuccessCode::AssignmentLoadedSuccess,
                    service.get_assignment(&caller, id).await,
                ))
            }
        },
        Commands::Seed => seed_command(&database, &service, &caller).await,
        Commands::Accept { id } => print_json(&respond(
            SuccessCode::AssignmentAcceptedSuccess,
            service.accept_assignment(&caller, id).await,
        )),
        Commands::Decline { id } => print_json(&respond(
            SuccessCode::AssignmentDeclinedSuccess,
            service.decline_assignment(&caller, id).await,
        )),
        Commands::Report => print_json(&respond(
            SuccessCode::ReportLoadedSuccess,
            service.asset_report(&caller).await,
        )),
    }
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("invalid date {}-{}-{}", y, m, d))
}

async fn seed_command(
    database: &Database,
    service: &AssetDeskService,
    caller: &CallerScope,
) -> Result<()> {
    if database.category_exists("LA").await? {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    for (code, name) in [("LA", "Laptop"), ("MO", "Monitor"), ("PC", "Personal Computer")] {
        database
            .insert_category(&Category {
                category_code: code.to_string(),
                category_name: name.to_string(),
            })
            .await?;
    }

    // The seeding caller becomes the assigner, so it must exist as a user
    if !database.username_exists(&caller.username).await? {
        database
            .insert_user(&User {
                staff_code: database.next_staff_code().await?,
                username: caller.username.clone(),
                first_name: caller.username.clone(),
                last_name: "Seed".to_string(),
                date_of_birth: date(1990, 1, 1)?,
                joined_date: date(2020, 1, 6)?,
                gender: Gender::Other,
                role: caller.role,
                location_id: caller.location_id,
                is_deleted: false,
                first_login: false,
            })
            .await?;
    }

    let people = [
        ("Binh", "Nguyen Van", Role::User, Gender::Male),
        ("Mai", "Le Thi", Role::User, Gender::Female),
    ];
    let mut usernames = Vec::new();
    for (first, last, role, gender) in people {
        let user = service
            .create_user(
                caller,
                NewUser {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    date_of_birth: date(1994, 7, 12)?,
                    joined_date: date(2021, 3, 1)?,
                    gender,
                    role,
                },
            )
            .await?;
        usernames.push(user.username);
    }

    let assets = [
        ("ThinkPad T14", "LA", AssetState::Available),
        ("MacBook Pro 14", "LA", AssetState::Available),
        ("Dell U2720Q", "MO", AssetState::Available),
        ("HP ProDesk", "PC", AssetState::NotAvailable),
    ];
    let mut codes = Vec::new();
    for (name, category, state) in assets {
        let asset = service
            .create_asset(
                caller,
                NewAsset {
                    asset_name: name.to_string(),
                    category_code: category.to_string(),
                    state,
                    install_date: date(2022, 1, 10)?,
                    specification: None,
                },
            )
            .await?;
        codes.push(asset.asset_code);
    }

    let assignment = service
        .create_assignment(
            caller,
            NewAssignment {
                asset_code: codes[0].clone(),
                assigned_to: usernames[0].clone(),
                assigned_date: (Utc::now() + Duration::days(1)).naive_utc(),
                note: Some("Onboarding laptop".to_string()),
            },
        )
        .await?;
    tracing::info!("Seeded assignment {}", assignment.assignment_id);

    tracing::info!(
        "Seeded {} users and {} assets at location {}",
        usernames.len(),
        codes.len(),
        caller.location_id
    );
    Ok(())
}
