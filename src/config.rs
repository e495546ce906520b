// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::clock::{parse_utc_offset, LocalClock},
    db::{LedgerStore, MemoryLedgerStore, PgLedgerRepository},
    services::ledger_service::LedgerService,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_UTC_OFFSET: &str = "-03:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: String,
    pub utc_offset: FixedOffset,
    // Exportação JSON da tabela carregada no backend em memória
    pub seed_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("LEDGER_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("LEDGER_STORE inválido: '{}' (use 'postgres' ou 'memory')", other),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida");
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: '{}'", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let utc_offset = parse_utc_offset(
            &lookup("LEDGER_UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string()),
        )?;

        let seed_file = lookup("LEDGER_SEED_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        if seed_file.is_some() && store != StoreBackend::Memory {
            bail!("LEDGER_SEED_FILE só é aceito com LEDGER_STORE=memory");
        }

        Ok(Self {
            store,
            database_url,
            max_connections,
            bind_addr,
            utc_offset,
            seed_file,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    // Só existe com o backend Postgres (migrações no main)
    pub db_pool: Option<PgPool>,
    pub ledger_service: LedgerService,
    pub clock: LocalClock,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let clock = LocalClock::new(settings.utc_offset);

        match settings.store {
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: os dados somem ao reiniciar.");
                let store = match &settings.seed_file {
                    Some(path) => {
                        let json = tokio::fs::read_to_string(path)
                            .await
                            .with_context(|| format!("Falha ao ler {}", path.display()))?;
                        let store = MemoryLedgerStore::from_json(&json)
                            .with_context(|| format!("Exportação inválida em {}", path.display()))?;
                        tracing::info!("🌱 Lançamentos carregados de {}", path.display());
                        store
                    }
                    None => MemoryLedgerStore::new(),
                };
                Ok(Self::with_store(Arc::new(store), clock))
            }
            StoreBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let repo = PgLedgerRepository::new(db_pool.clone());
                Ok(Self {
                    db_pool: Some(db_pool),
                    ledger_service: LedgerService::new(Arc::new(repo)),
                    clock,
                })
            }
        }
    }

    pub fn with_store(store: Arc<dyn LedgerStore>, clock: LocalClock) -> Self {
        Self {
            db_pool: None,
            ledger_service: LedgerService::new(store),
            clock,
        }
    }
}
