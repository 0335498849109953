use anyhow::{anyhow, Result};

use crate::auth::create_account;
use crate::cmd::CreateUserArgs;
use crate::config::Config;
use crate::db::create_pool;
use crate::store::postgres::PgStore;

pub async fn run(args: CreateUserArgs) -> Result<()> {
    let pool = create_pool(&Config::database_url_from_env()?).await?;
    let store = PgStore::new(pool);
    let user = create_account(&store, &args.username, &args.password, args.staff)
        .await
        .map_err(|e| anyhow!("could not create user: {e}"))?;
    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}
