use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use engine::{EntityKind, UserRole, entities, hash_password, users};
use migration::MigratorTrait;

#[derive(Parser, Debug)]
#[command(name = "mawrid_admin")]
#[command(about = "Admin utilities for Mawrid (bootstrap accounts, seed demo data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./mawrid.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Admin(Admin),
    Seed(Seed),
}

#[derive(Args, Debug)]
struct Admin {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an approved admin account, prompting for the password.
    Create(AdminCreateArgs),
}

#[derive(Args, Debug)]
struct AdminCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    name: String,
    /// Password; prompted for interactively when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct Seed {
    #[command(subcommand)]
    command: SeedCommand,
}

#[derive(Subcommand, Debug)]
enum SeedCommand {
    /// Insert a handful of demo entities, skipping ones already present.
    Demo,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_admin(
    db: &DatabaseConnection,
    args: AdminCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password_twice()?,
    };

    if users::Entity::find()
        .filter(users::Column::Username.eq(args.username.clone()))
        .one(db)
        .await?
        .is_some()
    {
        eprintln!("user already exists: {}", args.username);
        std::process::exit(1);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(args.username.clone()),
        email: Set(args.email),
        phone: Set(args.phone),
        name: Set(args.name),
        password: Set(hash_password(&password)?),
        role: Set(UserRole::Admin.as_str().to_string()),
        is_active: Set(true),
        is_approved: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    users::Entity::insert(user).exec(db).await?;

    println!("created admin: {}", args.username);
    Ok(())
}

async fn seed_demo(db: &DatabaseConnection) -> Result<(), Box<dyn Error + Send + Sync>> {
    let demo = [
        ("وزارة التجارة", "الرياض"),
        ("شركة الاتصالات", "جدة"),
        ("البنك الأهلي", "الدمام"),
        ("شركة الكهرباء", "الرياض"),
        ("وزارة الصحة", "مكة"),
    ];

    for (name, province) in demo {
        if entities::Entity::find()
            .filter(entities::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some()
        {
            println!("entity already present: {name}");
            continue;
        }

        let now = Utc::now();
        let entity = entities::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            kind: Set(EntityKind::Main.as_str().to_string()),
            province: Set(Some(province.to_string())),
            main_entity_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        entities::Entity::insert(entity).exec(db).await?;

        println!("created entity: {name}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Admin(Admin {
            command: AdminCommand::Create(args),
        }) => create_admin(&db, args).await?,
        Command::Seed(Seed {
            command: SeedCommand::Demo,
        }) => seed_demo(&db).await?,
    }

    Ok(())
}
