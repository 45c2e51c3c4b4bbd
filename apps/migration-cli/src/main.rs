use clap::{Parser, ValueEnum};
use migration::{migrate, MigrationCommand};
use uncolympics::config::db::DbKind;
use uncolympics::infra::db::connect_db;

#[derive(Clone, Copy, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(c: Command) -> Self {
        match c {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Reset => MigrationCommand::Reset,
            Command::Refresh => MigrationCommand::Refresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

/// In-memory SQLite is not offered: the database would vanish when the
/// command exits.
#[derive(Clone, Copy, ValueEnum)]
enum Db {
    Postgres,
    SqliteFile,
}

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Uncolympics database migration tool")]
struct Args {
    #[arg(value_enum)]
    command: Command,

    /// Database type; connection details come from the usual environment
    /// variables (`POSTGRES_*`, `SQLITE_PATH`).
    #[arg(short, long, value_enum, default_value = "postgres")]
    db: Db,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_env_filter("migration=info,uncolympics=info,sqlx=warn")
        .init();

    let args = Args::parse();
    let kind = match args.db {
        Db::Postgres => DbKind::Postgres,
        Db::SqliteFile => DbKind::SqliteFile,
    };

    let conn = match connect_db(kind).await {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("❌ Could not connect: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&conn, args.command.into()).await {
        eprintln!("❌ Migration failed: {e}");
        std::process::exit(1);
    }
}
