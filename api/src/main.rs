use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::{anyhow, Context};
use tracing::info;

use dragon_api::{create_app, telemetry, AppState, DynVerificationService};
use dragon_core::services::verification::{ImageRenderer, VerificationService, VerificationServiceConfig};
use dragon_infra::{
    create_code_store, create_sms_sender, CodeSweeper, ConfiguredStore, SvgImageRenderer, SweeperConfig,
};
use dragon_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;

    info!(environment = %config.environment, "Starting Dragon verification code service");

    let store = create_code_store(&config.cache)
        .await
        .context("failed to create code store")?;

    if let ConfiguredStore::Memory(memory) = &store {
        let sweeper = Arc::new(CodeSweeper::new(
            memory.clone(),
            SweeperConfig::from(&config.cache),
        ));
        sweeper.start_background_task();
    }

    let sms_sender = create_sms_sender(&config.sms);
    let renderer: Arc<dyn ImageRenderer> = Arc::new(SvgImageRenderer::default());

    let service: DynVerificationService = VerificationService::new(
        store.as_code_store(),
        sms_sender,
        renderer,
        VerificationServiceConfig::from(&config.verification),
    )
    .context("failed to build verification service")?;

    let mut app_state = AppState::new(Arc::new(service));
    if let ConfiguredStore::Redis(redis) = &store {
        app_state = app_state.with_redis_probe(redis.client().clone());
    }
    let app_state = web::Data::new(app_state);

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let environment = config.environment;
    let mut server = HttpServer::new(move || create_app(app_state.clone(), environment))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    info!("Server stopped");
    Ok(())
}
