//src/main.rs

use axum::{
    routing::{get, patch, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;

fn router(app_state: AppState) -> Router {
    let record_routes = Router::new()
        .route("/"
               ,get(handlers::records::list_records)
               .post(handlers::records::create_record)
        )
        .route("/{id}"
               ,put(handlers::records::edit_record)
               .delete(handlers::records::delete_record)
        )
        .route("/{id}/pay"
               ,patch(handlers::records::mark_paid)
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::dashboard::health))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/payables", get(handlers::dashboard::get_payables))
        .route("/api/forecast", get(handlers::dashboard::get_forecast))
        .route("/api/report", get(handlers::dashboard::get_report))
        .route("/api/sectors", get(handlers::dashboard::list_sectors))
        .nest("/api/records", record_routes)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!().run(pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let app = router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
