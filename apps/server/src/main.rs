use bookloop_server::{api::app_router, build_state, config::Config, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    if config.scheduler_enabled {
        scheduler::start_follow_up_scheduler(state.clone(), config.follow_up_interval);
    } else {
        tracing::info!("Follow-up scheduler disabled; relying on external triggers");
    }

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
