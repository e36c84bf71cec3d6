use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use rolegate_core::config::Config;
use rolegate_core::tracing::init_tracing;

use rolegate_codes::authority::CodeAuthority;
use rolegate_codes::authority::renewal::RenewalTask;
use rolegate_codes::config::CodesConfig;
use rolegate_codes::infra::clock::SystemClock;
use rolegate_codes::infra::revocation::RevocationScheduler;
use rolegate_codes::infra::role_gateway::ConfiguredRoleGateway;
use rolegate_codes::router::build_router;
use rolegate_codes::state::{AppState, TargetRole};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let config = CodesConfig::try_from_env().context("failed to load config from environment")?;
    let format = config.code_format()?;

    let authority = Arc::new(CodeAuthority::new(
        format,
        config.cycle_duration(),
        Arc::new(SystemClock),
    ));

    let shutdown = CancellationToken::new();
    let renewal = RenewalTask::spawn(Arc::clone(&authority), shutdown.child_token());
    let revocations = RevocationScheduler::new(shutdown.child_token());
    let role_gateway =
        ConfiguredRoleGateway::from_webhook(config.role_webhook(), config.role_webhook_token())?;

    if config.target_role().is_none() {
        info!("TARGET_ROLE_ID unset; claims consume codes without a role until one is set");
    }

    let state = AppState {
        authority,
        role_gateway,
        revocations: revocations.clone(),
        internal_token: Arc::from(config.internal_token.as_str()),
        target_role: TargetRole::new(config.target_role().map(str::to_owned)),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.codes_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("codes service listening on {addr}");
    let draining = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            // readyz reports 503 while in-flight requests drain
            draining.cancel();
        })
        .await
        .context("server error")?;

    renewal.shutdown().await;
    revocations.shutdown().await;
    Ok(())
}
