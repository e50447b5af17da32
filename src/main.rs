use std::process;
use std::sync::Arc;

use sleep_coach::config::Config;
use sleep_coach::http::{router, AppState};
use sleep_coach::llm::GroqClient;
use sleep_coach::store::RestStore;

#[tokio::main]
async fn main() {
  // .env is a development convenience; absence is not an error.
  let _ = dotenvy::dotenv();

  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sleep_coach=info,tower_http=info".into()),
    )
    .init();

  let config = match Config::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("configuration error: {}", e);
      process::exit(1);
    }
  };

  let state = AppState {
    store: Arc::new(RestStore::new(config.store_url.clone(), config.store_anon_key.clone())),
    model: Arc::new(GroqClient::new(config.groq_api_key.clone())),
  };

  let addr = format!("0.0.0.0:{}", config.port);
  let listener = match tokio::net::TcpListener::bind(&addr).await {
    Ok(listener) => listener,
    Err(e) => {
      eprintln!("failed to bind {}: {}", addr, e);
      process::exit(1);
    }
  };

  tracing::info!(%addr, "sleep-coach listening");

  if let Err(e) = axum::serve(listener, router(state)).await {
    eprintln!("server error: {}", e);
    process::exit(1);
  }
}
