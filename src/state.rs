use std::sync::Arc;

use sqlx::SqlitePool;

use super::{config::Config, database, seed};

pub struct State {
    pub config: Config,
    pub db: SqlitePool,
}

impl State {
    /// Config, pool, schema, seed, in that order. Any failure here is fatal,
    /// the server must not accept requests over a half-initialized store.
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = database::connect(&config.database_path)
            .await
            .expect("Database misconfigured!");

        seed::seed(&db, &config.secret)
            .await
            .expect("Seeding failed!");

        Arc::new(Self { config, db })
    }
}
