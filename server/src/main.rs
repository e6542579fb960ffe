mod config;
mod cookies;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    // Fail fast: no request is served with incomplete configuration.
    let config = config::Config::from_env().expect("configuration");
    let port = config.port;

    let api = Arc::new(services::gateway::RestAuthApi::new(&config));
    let state = state::AppState::new(api, config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "routineo listening");
    axum::serve(listener, app).await.expect("server failed");
}
