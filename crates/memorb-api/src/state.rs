//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI commands
//! and REST handlers. Every port is type-erased, so tests build the same
//! state over in-process fakes with [`AppState::from_parts`].

use std::sync::Arc;

use memorb_core::chat::service::ChatService;
use memorb_core::chat::transcript::TranscriptStore;
use memorb_core::llm::box_provider::BoxLlmProvider;
use memorb_core::memory::box_embedder::BoxEmbedder;
use memorb_core::memory::box_vector::BoxVectorStore;
use memorb_core::memory::session::MemorySessionFactory;
use memorb_core::reflection::ReflectionPipeline;
use memorb_core::reflection::episodic::EpisodicRecorder;
use memorb_core::scrape::ScraperSet;
use memorb_infra::llm::create_provider;
use memorb_infra::scrape::build_scrapers;
use memorb_infra::vector::embedder::OllamaEmbedder;
use memorb_infra::vector::qdrant::QdrantVectorStore;
use memorb_types::config::{AppConfig, Settings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<MemorySessionFactory>,
    pub chat: ChatService,
    pub episodic: Arc<EpisodicRecorder>,
    pub transcripts: Arc<TranscriptStore>,
    pub scrapers: Arc<ScraperSet>,
    pub reflection: ReflectionPipeline,
}

impl AppState {
    /// Build the production state: OpenAI-compatible LLM, Qdrant, Ollama,
    /// and both scrapers. No network I/O happens here.
    pub fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let settings = &config.settings;
        let memory = &settings.memory;

        let llm = Arc::new(create_provider(&config.credentials, &settings.llm.model));
        let store = Arc::new(BoxVectorStore::new(QdrantVectorStore::new(&memory.vector_store)?));
        let embedder = Arc::new(BoxEmbedder::new(OllamaEmbedder::new(
            &memory.embedder,
            memory.vector_store.embedding_model_dims as usize,
        )));
        let scrapers = build_scrapers(&settings.scraper)?;

        tracing::info!(
            vector_store = %memory.vector_store.grpc_url(),
            embedder = %memory.embedder.base_url,
            prefix = %memory.vector_store.collection_name,
            "services wired"
        );

        Ok(Self::from_parts(settings, llm, store, embedder, scrapers))
    }

    /// Wire services over already-built ports.
    pub fn from_parts(
        settings: &Settings,
        llm: Arc<BoxLlmProvider>,
        store: Arc<BoxVectorStore>,
        embedder: Arc<BoxEmbedder>,
        scrapers: ScraperSet,
    ) -> Self {
        let transcripts = Arc::new(TranscriptStore::new());
        let reflection = ReflectionPipeline::new(Arc::clone(&llm), settings.llm.clone());

        let chat = ChatService::new(
            Arc::clone(&llm),
            Arc::clone(&transcripts),
            settings.llm.clone(),
            settings.episodic.system_prompt.clone(),
            settings.memory.search_limit,
        );

        let episodic = EpisodicRecorder::new(
            reflection.clone(),
            Arc::clone(&store),
            Arc::clone(&embedder),
            settings.episodic.collection_prefix.clone(),
            settings.memory.vector_store.namespace_spec(),
        );

        let memory = MemorySessionFactory::new(settings.memory.clone(), store, embedder, llm);

        Self {
            memory: Arc::new(memory),
            chat,
            episodic: Arc::new(episodic),
            transcripts,
            scrapers: Arc::new(scrapers),
            reflection,
        }
    }
}
