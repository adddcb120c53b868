use migration::Migrator;
use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Standalone runner for environments where the app's auto-migration on
/// startup is not wanted: `cargo run -p migration -- <up|down|fresh|status> [n]`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());
    let steps = args.next().map(|raw| raw.parse::<u32>()).transpose()?;

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./mawrid.db?mode=rwc".to_string());
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => Migrator::up(&db, steps).await?,
        // Rolling back everything by accident hurts; default to one step.
        "down" => Migrator::down(&db, steps.or(Some(1))).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "status" => Migrator::status(&db).await?,
        other => {
            eprintln!("unknown command {other:?}; expected up|down|fresh|status");
            std::process::exit(2);
        }
    }

    Ok(())
}
