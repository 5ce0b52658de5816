use clap::{Parser, Subcommand};
use pizza_restaurant_service::{
    api::{self, AppState},
    config::Config,
    establish_pool, run_migrations, seed,
    store::RestaurantStore,
    DbPool,
};
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations and serve the HTTP API
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Replace the database contents with sample data
    Seed,
}

#[tokio::main]
pub async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = establish_pool(&config.database_url, config.pool_size)?;

    match &cli.command {
        Commands::Serve => serve(&config, pool).await,
        Commands::Migrate => migrate(&pool),
        Commands::Seed => {
            migrate(&pool)?;
            let conn = &mut pool.get()?;
            let summary = seed::load(&mut RestaurantStore::new(conn))?;
            info!(
                restaurants = summary.restaurants,
                pizzas = summary.pizzas,
                restaurant_pizzas = summary.restaurant_pizzas,
                "database seeded"
            );
            Ok(())
        }
    }
}

fn migrate(pool: &DbPool) -> Result<(), BoxError> {
    let conn = &mut pool.get()?;
    let applied = run_migrations(conn)?;
    info!(applied, "migrations up to date");
    Ok(())
}

async fn serve(config: &Config, pool: DbPool) -> Result<(), BoxError> {
    migrate(&pool)?;

    let app = api::router(AppState::new(pool));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        database = %config.database_url,
        "pizza restaurants API listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;

    Ok(())
}
