//! Answering service: retrieval, prompt assembly and generation.

use crate::chunker::TextSplitter;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::ingest::ingest;
use crate::rag::pipeline::{cite_sources, format_context, prompt_variables};
use crate::rag::types::{AnswerResponse, QueryStage, ServiceState, ServiceStats};
use crate::types::IndexInfo;
use crate::vector_index::VectorIndex;
use std::sync::Arc;
use taxrag_core::{AppError, AppResult, Settings};
use taxrag_llm::{create_client, LlmClient, LlmRequest};
use taxrag_prompt::PromptStore;

/// Ingest the documents directory and build the configured collection.
///
/// Used both by the first-run bootstrap and by explicit rebuilds.
pub async fn provision_index(
    settings: &Settings,
    embedder: Arc<dyn EmbeddingProvider>,
    force_recreate: bool,
) -> AppResult<VectorIndex> {
    let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
    let chunks = ingest(&settings.documents_dir, &splitter)?;

    VectorIndex::build(
        &settings.vector_db_dir,
        chunks,
        &settings.collection_name,
        force_recreate,
        embedder,
    )
    .await
}

/// Question answering over the indexed tax documents.
///
/// The generation client and embedding provider are constructed once by the
/// caller and shared by every query.
///
/// # Example
/// ```no_run
/// use taxrag_core::Settings;
/// use taxrag_knowledge::RagService;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut service = RagService::from_settings(Settings::load()?)?;
/// service.initialize().await?;
///
/// let answer = service.ask("What is the standard VAT rate?").await?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
pub struct RagService {
    settings: Settings,
    /// `None` when no credential was available at construction
    llm: Option<Arc<dyn LlmClient>>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Option<VectorIndex>,
    prompts: Option<PromptStore>,
    state: ServiceState,
}

impl RagService {
    pub fn new(
        settings: Settings,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            settings,
            llm: Some(llm),
            embedder,
            index: None,
            prompts: None,
            state: ServiceState::Uninitialized,
        }
    }

    /// Construct the clients described by `settings`.
    ///
    /// A missing generation credential is not an error here; it is reported
    /// by [`RagService::initialize`], which then leaves the service in
    /// `ServiceState::Error`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a provider name is unknown.
    pub fn from_settings(settings: Settings) -> AppResult<Self> {
        let llm = match settings.resolve_api_key() {
            Some(api_key) => Some(create_client(
                &settings.provider,
                settings.endpoint.as_deref(),
                Some(api_key.as_str()),
            )?),
            None => None,
        };
        let embedder = create_provider(&settings.embedding)?;

        Ok(Self {
            settings,
            llm,
            embedder,
            index: None,
            prompts: None,
            state: ServiceState::Uninitialized,
        })
    }

    /// Load or build the index and load the prompt templates.
    ///
    /// Fails with `AppError::Config` first if no generation credential was
    /// available when the service was constructed.
    /// The index is built here only when nothing has been persisted yet (or
    /// the persisted collection is empty). Any failure leaves the service in
    /// `ServiceState::Error`.
    pub async fn initialize(&mut self) -> AppResult<()> {
        if self.state == ServiceState::Ready {
            return Ok(());
        }

        match self.load_components().await {
            Ok(()) => {
                self.state = ServiceState::Ready;
                tracing::info!(
                    "Service ready: {} chunks, model {}, prompt '{}'",
                    self.index.as_ref().map(VectorIndex::len).unwrap_or(0),
                    self.settings.model,
                    self.settings.prompt_type
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("Initialization failed: {}", e);
                self.state = ServiceState::Error(e.to_string());
                Err(e)
            }
        }
    }

    async fn load_components(&mut self) -> AppResult<()> {
        if self.llm.is_none() {
            return Err(AppError::Config(format!(
                "API key not found. Set the {} environment variable",
                self.settings.api_key_env
            )));
        }
        self.settings.validate()?;

        let info = VectorIndex::inspect(&self.settings.vector_db_dir, &self.settings.collection_name)?;
        if !info.exists || info.count == 0 {
            tracing::info!(
                "First run: no index for collection '{}', building it from {:?}",
                self.settings.collection_name,
                self.settings.documents_dir
            );
            self.bootstrap_index(false).await?;
        } else {
            self.index = Some(VectorIndex::load(
                &self.settings.vector_db_dir,
                &self.settings.collection_name,
                Arc::clone(&self.embedder),
            )?);
        }

        let prompts = PromptStore::load(&self.settings.prompts_file)?;
        prompts.get(&self.settings.prompt_type)?;
        self.prompts = Some(prompts);

        Ok(())
    }

    /// Ingest the documents and build the index, replacing the loaded one.
    pub async fn bootstrap_index(&mut self, force_recreate: bool) -> AppResult<IndexInfo> {
        let index =
            provision_index(&self.settings, Arc::clone(&self.embedder), force_recreate).await?;
        let info = index.info();
        self.index = Some(index);
        Ok(info)
    }

    /// Answer a question from the indexed documents.
    ///
    /// An empty retrieval still produces an answer, generated without context.
    /// Failures name the stage that failed and leave the service ready.
    pub async fn ask(&self, question: &str) -> AppResult<AnswerResponse> {
        let ready = (&self.state, &self.index, &self.prompts, &self.llm);
        let (index, prompts, llm) = match ready {
            (ServiceState::Ready, Some(index), Some(prompts), Some(llm)) => {
                (index, prompts, llm)
            }
            _ => {
                return Err(AppError::Validation(
                    "Service is not initialized".to_string(),
                ))
            }
        };

        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }

        tracing::info!(stage = %QueryStage::Retrieving, "Answering: {}", question);
        let results = index
            .search(question, self.settings.top_k)
            .await
            .map_err(|e| e.in_stage("retrieval"))?;

        if results.is_empty() {
            tracing::warn!("No chunks retrieved; generating without context");
        }

        let context = format_context(&results);

        tracing::debug!(stage = %QueryStage::Generating, "Context of {} chunks", results.len());
        let prompt_type = &self.settings.prompt_type;
        let prompt = prompts
            .render(prompt_type, &prompt_variables(&context, question))
            .map_err(|e| e.in_stage("generation"))?;
        let params = prompts
            .parameters(prompt_type)
            .map_err(|e| e.in_stage("generation"))?;

        let request = LlmRequest::new(prompt, self.settings.model.as_str())
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens);

        let response = llm
            .complete(&request)
            .await
            .map_err(|e| e.in_stage("generation"))?;

        tracing::info!(
            stage = %QueryStage::Completed,
            "Answer generated ({} tokens, {} sources)",
            response.usage.total_tokens,
            results.len()
        );

        Ok(AnswerResponse {
            question: question.to_string(),
            answer: response.content,
            sources: cite_sources(&results),
        })
    }

    /// Current configuration and index size.
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            model: self.settings.model.clone(),
            prompt_type: self.settings.prompt_type.clone(),
            documents_in_db: self.index.as_ref().map(VectorIndex::len).unwrap_or(0),
            top_k: self.settings.top_k,
            chunk_size: self.settings.chunk_size,
        }
    }

    /// Names of the loaded prompt templates.
    pub fn list_prompts(&self) -> Vec<String> {
        self.prompts
            .as_ref()
            .map(PromptStore::names)
            .unwrap_or_default()
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }
}
