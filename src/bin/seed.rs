use shopeasy_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    seed::{SAMPLE_USERNAME, seed_sample_data},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, 1).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    if seed_sample_data(&orm).await? {
        println!("Seed completed. Demo login: {SAMPLE_USERNAME}");
    } else {
        println!("Catalog already populated, nothing to seed");
    }
    Ok(())
}
