use std::sync::Arc;

use bookstore_hex::auth::JwtAuth;
use bookstore_hex::config::Config;
use bookstore_hex::inbound::http::{AppState, HttpServer, HttpServerConfig};
use bookstore_hex::notify::{LogMailer, Mailer, SmtpMailer};
use bookstore_repo::{build_repo, Repo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / JWT_SECRET / SMTP_* when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let repo: Repo = build_repo(config.database_url.as_deref()).await?;
    tracing::info!(backend = repo.backend_name(), "repository ready");

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "order emails go through smtp");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set; order emails are only logged");
            Arc::new(LogMailer::new())
        }
    };

    let jwt = Arc::new(JwtAuth::new(
        &config.jwt_secret,
        i64::try_from(config.jwt_expiration_secs)?,
    ));
    let state = AppState::new(repo, jwt, mailer);

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(state, server_cfg).await?;
    http.run().await
}
