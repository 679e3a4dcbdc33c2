//! Applies pending migrations one step at a time with a progress line each.

use colored::Colorize;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigrationStatus;
use sea_orm_migration::prelude::MigratorTrait;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::Migrator;

const STATUS_COLUMN: usize = 72;

/// One migration applied by [`apply_pending`].
#[derive(Debug, Clone)]
pub struct Applied {
    pub name: String,
    pub elapsed: Duration,
}

/// Applies every migration not yet recorded in the migrations table.
///
/// Each step is recorded as it lands, so a failure leaves earlier steps in
/// place and a rerun resumes at the one that failed.
pub async fn apply_pending(db: &DatabaseConnection) -> Result<Vec<Applied>, DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if pending.is_empty() {
        println!("{}", "Schema is up to date".dimmed());
        return Ok(Vec::new());
    }

    let mut applied = Vec::with_capacity(pending.len());
    for migration in pending {
        let name = migration.name().to_owned();
        let label = format!("Applying {name}");
        print!("{}{} ", label.bold(), ".".repeat(STATUS_COLUMN.saturating_sub(label.len())));
        let _ = io::stdout().flush();

        let start = Instant::now();
        if let Err(e) = Migrator::up(db, Some(1)).await {
            println!("{} {e}", "failed".red());
            return Err(e);
        }
        let elapsed = start.elapsed();
        println!("{} {}", "done".green(), format!("({elapsed:.2?})").dimmed());
        applied.push(Applied { name, elapsed });
    }
    Ok(applied)
}

/// Names of all known migrations, each paired with whether it has been applied.
pub async fn status(db: &DatabaseConnection) -> Result<Vec<(String, bool)>, DbErr> {
    Ok(Migrator::get_migration_with_status(db)
        .await?
        .into_iter()
        .map(|m| (m.name().to_owned(), matches!(m.status(), MigrationStatus::Applied)))
        .collect())
}
