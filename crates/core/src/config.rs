//! Settings for the RAG assistant.
//!
//! Settings are merged from several sources, later ones winning:
//! - Built-in defaults (relative to the workspace directory)
//! - A YAML file (`<workspace>/taxrag.yaml` or `TAXRAG_CONFIG`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! The generation credential is never read from the YAML file. Only the
//! name of the environment variable holding it is configurable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default settings file name inside the workspace.
pub const SETTINGS_FILE: &str = "taxrag.yaml";

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Workspace root; relative paths in the settings file resolve against it
    pub workspace: PathBuf,

    /// Optional explicit settings file
    pub config_file: Option<PathBuf>,

    /// Directory scanned for source documents
    pub documents_dir: PathBuf,

    /// Directory holding the persisted vector index
    pub vector_db_dir: PathBuf,

    /// YAML file with the prompt template definitions
    pub prompts_file: PathBuf,

    /// Collection identifier of the persisted index
    pub collection_name: String,

    /// Target chunk length in characters
    pub chunk_size: usize,

    /// Characters shared between adjacent chunks
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Generation provider ("claude")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Optional generation endpoint override
    pub endpoint: Option<String>,

    /// Environment variable holding the generation credential
    pub api_key_env: String,

    /// Prompt template used for answering
    pub prompt_type: String,

    /// Embedding function settings
    pub embedding: EmbeddingConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding function configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Optional endpoint for HTTP providers
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    32
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            batch_size: default_batch_size(),
        }
    }
}

/// On-disk settings file. Every field is optional and overrides the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    documents_dir: Option<PathBuf>,
    vector_db_dir: Option<PathBuf>,
    prompts_file: Option<PathBuf>,
    collection_name: Option<String>,
    rag: Option<RagSection>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RagSection {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    prompt_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Settings {
    /// Default settings rooted at `workspace`.
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            documents_dir: workspace.join("data").join("documents"),
            vector_db_dir: workspace.join("data").join("vector_db"),
            prompts_file: workspace.join("config").join("prompts").join("base.yaml"),
            workspace,
            config_file: None,
            collection_name: "tax_documents".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            provider: "claude".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            endpoint: None,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            prompt_type: "base".to_string(),
            embedding: EmbeddingConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }

    /// Load settings from the environment, defaults and the settings file.
    ///
    /// Environment variables:
    /// - `TAXRAG_WORKSPACE`: Workspace root (default: current directory)
    /// - `TAXRAG_CONFIG`: Path to the settings file
    /// - `TAXRAG_PROVIDER` / `TAXRAG_MODEL`: Generation backend
    /// - `TAXRAG_DOCUMENTS_DIR` / `TAXRAG_VECTOR_DB_DIR`: Data locations
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use taxrag_core::config::Settings;
    ///
    /// let settings = Settings::load().expect("Failed to load settings");
    /// println!("Documents: {:?}", settings.documents_dir);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`Settings::load`], with an explicit workspace and settings file
    /// taking precedence over `TAXRAG_WORKSPACE` and `TAXRAG_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let workspace = workspace
            .or_else(|| std::env::var("TAXRAG_WORKSPACE").ok().map(PathBuf::from));
        let workspace = match workspace {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let config_file =
            config_file.or_else(|| std::env::var("TAXRAG_CONFIG").ok().map(PathBuf::from));

        let mut settings = Self::load_from(workspace, config_file)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Load defaults for `workspace` and merge the settings file, if any.
    ///
    /// An explicitly named settings file must exist; the implicit
    /// `<workspace>/taxrag.yaml` is optional.
    pub fn load_from(workspace: PathBuf, config_file: Option<PathBuf>) -> AppResult<Self> {
        if !workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                workspace
            )));
        }

        let mut settings = Self::for_workspace(workspace);

        let path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Settings file not found: {:?}",
                        path
                    )));
                }
                settings.config_file = Some(path.clone());
                Some(path)
            }
            None => {
                let implicit = settings.workspace.join(SETTINGS_FILE);
                implicit.exists().then_some(implicit)
            }
        };

        if let Some(path) = path {
            settings.merge_yaml(&path)?;
        }

        Ok(settings)
    }

    /// Merge a YAML settings file into these settings.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read settings file {:?}: {}", path, e))
        })?;

        let file: SettingsFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse settings file {:?}: {}", path, e))
        })?;

        if let Some(dir) = file.documents_dir {
            self.documents_dir = self.resolve(dir);
        }
        if let Some(dir) = file.vector_db_dir {
            self.vector_db_dir = self.resolve(dir);
        }
        if let Some(prompts) = file.prompts_file {
            self.prompts_file = self.resolve(prompts);
        }
        if let Some(name) = file.collection_name {
            self.collection_name = name;
        }

        if let Some(rag) = file.rag {
            if let Some(size) = rag.chunk_size {
                self.chunk_size = size;
            }
            if let Some(overlap) = rag.chunk_overlap {
                self.chunk_overlap = overlap;
            }
            if let Some(top_k) = rag.top_k {
                self.top_k = top_k;
            }
            if let Some(prompt_type) = rag.prompt_type {
                self.prompt_type = prompt_type;
            }
        }

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                self.provider = provider;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if llm.endpoint.is_some() {
                self.endpoint = llm.endpoint;
            }
            if let Some(env) = llm.api_key_env {
                self.api_key_env = env;
            }
        }

        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }

        if let Some(logging) = file.logging {
            if logging.level.is_some() {
                self.log_level = logging.level;
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged settings file {:?}", path);
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("TAXRAG_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = std::env::var("TAXRAG_MODEL") {
            self.model = model;
        }
        if let Ok(dir) = std::env::var("TAXRAG_DOCUMENTS_DIR") {
            self.documents_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("TAXRAG_VECTOR_DB_DIR") {
            self.vector_db_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }

    /// Apply CLI overrides to the settings.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        prompt_type: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.model = model;
        }

        if let Some(prompt_type) = prompt_type {
            self.prompt_type = prompt_type;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the generation credential from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the RAG settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.collection_name.trim().is_empty() {
            return Err(AppError::Config(
                "collection_name cannot be empty".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Create the data directories if missing.
    pub fn ensure_dirs(&self) -> AppResult<()> {
        for dir in [&self.documents_dir, &self.vector_db_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::Config(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }
        Ok(())
    }
}
