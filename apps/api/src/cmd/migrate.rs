use anyhow::Result;

use crate::config::Config;
use crate::db::{create_pool, run_migrations};

pub async fn apply() -> Result<()> {
    let pool = create_pool(&Config::database_url_from_env()?).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied successfully");
    Ok(())
}
