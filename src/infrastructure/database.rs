use crate::entities::{
    channel, clip_tags, clip_upvotes, clips, guest, oauth2_token, prelude::*, recorded_video,
    role, roles_users, user, user_social, users_flagged_for_deletion, video_comments, video_tags,
    video_upvotes,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryFilter, Schema, Set,
};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;
    seed_roles(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Order matters for foreign keys: user -> Channel -> RecordedVideo -> Clips
    let stmts = vec![
        (
            "user",
            schema
                .create_table_from_entity(user::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "role",
            schema
                .create_table_from_entity(role::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "roles_users",
            schema
                .create_table_from_entity(roles_users::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "Channel",
            schema
                .create_table_from_entity(channel::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "RecordedVideo",
            schema
                .create_table_from_entity(recorded_video::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "video_tags",
            schema
                .create_table_from_entity(video_tags::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "videoUpvotes",
            schema
                .create_table_from_entity(video_upvotes::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "videoComments",
            schema
                .create_table_from_entity(video_comments::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "Clips",
            schema
                .create_table_from_entity(clips::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "clip_tags",
            schema
                .create_table_from_entity(clip_tags::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "clipUpvotes",
            schema
                .create_table_from_entity(clip_upvotes::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "UserSocial",
            schema
                .create_table_from_entity(user_social::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "OAuth2Token",
            schema
                .create_table_from_entity(oauth2_token::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "Guest",
            schema
                .create_table_from_entity(guest::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "UsersFlaggedForDeletion",
            schema
                .create_table_from_entity(users_flagged_for_deletion::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        match db.execute(stmt).await {
            Ok(_) => info!("   - Table '{}' checked/created", name),
            Err(e) => tracing::warn!("   - Failed to create table '{}': {}", name, e),
        }
    }

    info!("🔄 Checking indexes...");

    let index_updates = [
        "CREATE INDEX IF NOT EXISTS idx_recorded_video_owner ON \"RecordedVideo\"(\"owningUser\")",
        "CREATE INDEX IF NOT EXISTS idx_recorded_video_channel ON \"RecordedVideo\"(\"channelID\")",
        "CREATE INDEX IF NOT EXISTS idx_clips_parent_video ON \"Clips\"(\"parentVideo\")",
        "CREATE INDEX IF NOT EXISTS idx_video_tags_video ON video_tags(\"videoID\")",
        "CREATE INDEX IF NOT EXISTS idx_clip_tags_clip ON clip_tags(\"clipID\")",
        "CREATE INDEX IF NOT EXISTS idx_guest_uuid ON \"Guest\"(\"UUID\")",
    ];

    for query in index_updates {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed: {}", query),
            Err(e) => tracing::warn!("   - Index update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}

/// Built-in roles: (name, description, permissions, default)
const BUILTIN_ROLES: &[(&str, &str, &[&str], bool)] = &[
    ("Admin", "Site administrator", &["admin"], false),
    ("User", "Registered viewer", &[], true),
    ("Streamer", "May broadcast live streams", &["stream"], false),
    ("Recorder", "May record streams to video", &["record"], false),
    ("Uploader", "May upload videos", &["upload"], false),
];

pub async fn seed_roles(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🌱 Seeding roles...");

    for (name, description, permissions, is_default) in BUILTIN_ROLES {
        let exists = Role::find()
            .filter(role::Column::Name.eq(*name))
            .one(db)
            .await?;

        if exists.is_none() {
            let model = role::ActiveModel {
                name: Set(Some(name.to_string())),
                description: Set(Some(description.to_string())),
                permissions: Set(role::join_permissions(permissions)),
                is_default: Set(Some(*is_default)),
                ..Default::default()
            };
            model.insert(db).await?;
            info!("   - Role '{}' created", name);
        }
    }

    Ok(())
}
