use colored::Colorize;
use migration::runner;
use sea_orm::Database;
use std::process::ExitCode;
use std::{env, fs, io, path::Path};
use util::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let db_path = AppConfig::global().database_path;
    let command = env::args().nth(1);

    let outcome = match command.as_deref() {
        Some("clean") => remove_db_file(&db_path).map_err(|e| e.to_string()),
        Some("fresh") => match remove_db_file(&db_path) {
            Ok(()) => migrate(&db_path).await,
            Err(e) => Err(e.to_string()),
        },
        Some("status") => print_status(&db_path).await,
        None | Some("up") => migrate(&db_path).await,
        Some(other) => Err(format!("unknown command `{other}` (expected up, fresh, clean or status)")),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn migrate(db_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(db_path).parent() {
        fs::create_dir_all(parent).map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    let db = Database::connect(format!("sqlite://{db_path}?mode=rwc"))
        .await
        .map_err(|e| e.to_string())?;
    runner::apply_pending(&db).await.map_err(|e| e.to_string())?;
    Ok(())
}

async fn print_status(db_path: &str) -> Result<(), String> {
    let db = Database::connect(format!("sqlite://{db_path}?mode=rwc"))
        .await
        .map_err(|e| e.to_string())?;
    for (name, applied) in runner::status(&db).await.map_err(|e| e.to_string())? {
        let mark = if applied { "applied".green() } else { "pending".yellow() };
        println!("{name:<48} {mark}");
    }
    Ok(())
}

fn remove_db_file(path: &str) -> io::Result<()> {
    let db_path = Path::new(path);
    if db_path.exists() {
        fs::remove_file(db_path)?;
        println!("Deleted {}", db_path.display());
    } else {
        println!("Nothing to delete at {}", db_path.display());
    }
    Ok(())
}
