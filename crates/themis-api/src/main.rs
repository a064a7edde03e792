use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use themis_api::{
    app::build_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use themis_chat::{ChatOrchestrator, CompletionRelay};
use themis_llm::{ClientFactory, ProviderConfig};
use themis_persist::{
    DocumentSource, InMemoryDocumentSource, InMemoryPersistenceClient, MongoPersistenceClient,
    PersistenceClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Themis API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize completion client
    tracing::info!(model = %config.llm.model, "Initializing completion client");
    let mut provider = ProviderConfig::openai(config.openai_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    let chat_client = ClientFactory::create_chat_client(provider)?;
    let relay = CompletionRelay::new(chat_client, config.llm.model.clone());

    // Initialize storage
    let (persist, documents) = init_storage(&config).await?;

    let chat = ChatOrchestrator::new(persist, documents, relay, config.chat_config());

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), chat));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_storage(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PersistenceClient>, Arc<dyn DocumentSource>)> {
    match config.storage.backend {
        StorageBackend::Mongodb => {
            tracing::info!(database = %config.storage.database, "Connecting to MongoDB");
            let client =
                MongoPersistenceClient::connect(&config.mongodb_uri, &config.storage.database).await?;
            let documents: Arc<dyn DocumentSource> = Arc::new(client.document_source());
            tracing::info!("MongoDB connected");
            Ok((Arc::new(client), documents))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; threads are lost on restart");
            let documents = match &config.storage.documents_path {
                Some(path) => {
                    tracing::info!(path = %path, "Loading legal documents");
                    InMemoryDocumentSource::from_json_file(path).await?
                }
                None => InMemoryDocumentSource::new(Vec::new()),
            };
            Ok((Arc::new(InMemoryPersistenceClient::new()), Arc::new(documents)))
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
