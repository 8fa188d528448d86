use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::{
    auth::repo::{PgUserRepo, UserRepo},
    config::{AppConfig, JwtConfig},
    goals::{GoalRepo, PgGoalRepo},
    meals::{MealRepo, PgMealRepo},
    memory::MemoryStore,
    nutrition::{LlmClient, MealParser, OpenRouterClient},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub meals: Arc<dyn MealRepo>,
    pub goals: Arc<dyn GoalRepo>,
    pub parser: MealParser,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let parser = match &config.llm {
            Some(llm) => {
                info!(model = %llm.model, "meal parsing via completion endpoint");
                MealParser::new(Some(
                    Arc::new(OpenRouterClient::new(llm.clone())) as Arc<dyn LlmClient>
                ))
            }
            None => {
                warn!("OPENROUTER_KEY not set; meal parsing uses the keyword table");
                MealParser::keyword_only()
            }
        };

        let Some(database_url) = config.database_url.as_deref() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::with_memory_store(config, parser));
        };

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self {
            config,
            users: Arc::new(PgUserRepo::new(db.clone())),
            meals: Arc::new(PgMealRepo::new(db.clone())),
            goals: Arc::new(PgGoalRepo::new(db)),
            parser,
        })
    }

    pub fn with_memory_store(config: Arc<AppConfig>, parser: MealParser) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            users: store.clone(),
            meals: store.clone(),
            goals: store,
            parser,
        }
    }

    /// Self-contained state for tests: in-memory store, keyword parser, fixed JWT secret.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            llm: None,
        });
        Self::with_memory_store(config, MealParser::keyword_only())
    }
}
