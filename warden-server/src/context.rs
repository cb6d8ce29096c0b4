//! warden-server/src/context.rs
//!
//! Builds every long-lived service the server needs (stores, capability
//! client, pipeline, message service) from CLI args and config.

use std::sync::Arc;

use tracing::{info, warn};
use warden_ai::{create_provider, AiClient, ProviderConfig};
use warden_common::traits::repository_traits::{
    GroupContextRepository, HistoryRepository, SuspiciousMessageRepository, UserRepository,
};
use warden_core::cache::RetentionPolicy;
use warden_core::repositories::{
    InMemoryGroupRepository, InMemorySuspiciousMessageRepository, InMemoryUserRepository,
    PostgresGroupRepository, PostgresHistoryRepository, PostgresSuspiciousMessageRepository,
    PostgresUserRepository,
};
use warden_core::services::moderation::default_tools;
use warden_core::services::{ActionExecutor, MessageService, ModerationPipeline};
use warden_core::{Database, Error, InMemoryHistoryStore, ModerationConfig};

use crate::Args;

struct Stores {
    history: Arc<dyn HistoryRepository>,
    groups: Arc<dyn GroupContextRepository>,
    users: Arc<dyn UserRepository>,
    flags: Arc<dyn SuspiciousMessageRepository>,
}

/// Everything the main loop needs, wired once at startup.
pub struct ServerContext {
    pub config: ModerationConfig,
    pub history: Arc<dyn HistoryRepository>,
    pub message_service: Arc<MessageService>,
}

impl ServerContext {
    pub async fn new(args: &Args, executor: Arc<dyn ActionExecutor>) -> Result<Self, Error> {
        let mut config = ModerationConfig::load(args.config.as_deref())?;
        if let Some(model) = &args.model {
            config.capability.model = model.clone();
        }
        if let Some(api_base) = &args.api_base {
            config.capability.api_base = Some(api_base.clone());
        }

        let stores = match &args.db_url {
            Some(url) => {
                info!("Using Postgres stores");
                let db = Database::new(url).await?;
                db.migrate().await?;
                postgres_stores(&db)
            }
            None => {
                warn!("No database URL configured; history and registries are kept in memory");
                in_memory_stores(&config)
            }
        };

        let ai = build_ai_client(args, &config)?;
        let tools = default_tools(&ai).await;
        info!(model = %config.capability.model, tools = ?tools.names().await, "Capability layer ready");

        let pipeline = Arc::new(ModerationPipeline::new(
            ai,
            tools,
            stores.history.clone(),
            stores.flags,
            executor,
            config.clone(),
        ));
        let message_service = Arc::new(MessageService::new(pipeline, stores.groups, stores.users));

        Ok(Self {
            config,
            history: stores.history,
            message_service,
        })
    }
}

fn postgres_stores(db: &Database) -> Stores {
    let pool = db.pool().clone();
    Stores {
        history: Arc::new(PostgresHistoryRepository::new(pool.clone())),
        groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        flags: Arc::new(PostgresSuspiciousMessageRepository::new(pool)),
    }
}

fn in_memory_stores(config: &ModerationConfig) -> Stores {
    let retention = RetentionPolicy {
        keep_count: Some(config.history.keep_count),
    };
    Stores {
        history: Arc::new(InMemoryHistoryStore::new(retention)),
        groups: Arc::new(InMemoryGroupRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
        flags: Arc::new(InMemorySuspiciousMessageRepository::new()),
    }
}

fn build_ai_client(args: &Args, config: &ModerationConfig) -> Result<AiClient, Error> {
    let api_key = args
        .api_key
        .clone()
        .ok_or_else(|| Error::Configuration("OPENROUTER_KEY is not set".to_string()))?;

    let provider_config = ProviderConfig {
        provider_type: "openrouter".to_string(),
        api_base: config.capability.api_base.clone(),
        api_key,
        default_model: config.capability.model.clone(),
        max_tokens: config.capability.max_tokens,
        options: Default::default(),
    };
    let provider = create_provider(provider_config)?;
    Ok(AiClient::new(provider, config.capability.timeout()))
}
