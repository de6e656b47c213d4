use shareit::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 1).await?;
    let orm = orm_from_pool(pool);
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
