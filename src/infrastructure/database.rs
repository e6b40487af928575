use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::time::Duration;
use tracing::info;

use crate::config::ServerConfig;
use crate::entities::{file_chunks, files};

pub async fn setup_database(config: &ServerConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", config.database_url);

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Chunks reference files, but rows arrive in the opposite order during
    // an upload, so no foreign key between them.
    let stmts = vec![
        (
            "files",
            schema
                .create_table_from_entity(files::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "file_chunks",
            schema
                .create_table_from_entity(file_chunks::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
        info!("   - Table '{}' checked/created", name);
    }

    if builder == sea_orm::DatabaseBackend::Sqlite {
        // WAL lets reads proceed while an upload is writing chunks.
        db.execute_unprepared("PRAGMA journal_mode = WAL;").await?;
        info!("   - SQLite journal mode set to WAL");
    }

    db.execute(sea_orm::Statement::from_string(
        builder,
        "CREATE INDEX IF NOT EXISTS idx_file_chunks_file_id ON file_chunks(file_id)".to_owned(),
    ))
    .await?;

    // Chunks staged by a process that died mid-upload have no files row.
    let swept = db
        .execute(sea_orm::Statement::from_string(
            builder,
            "DELETE FROM file_chunks WHERE file_id NOT IN (SELECT id FROM files)".to_owned(),
        ))
        .await?;
    if swept.rows_affected() > 0 {
        info!("   - Swept {} orphaned chunk rows", swept.rows_affected());
    }

    Ok(())
}
