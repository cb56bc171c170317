use serde::Deserialize;

use crate::error::Result;

/// Sample value shipped in the default config file; treated as "unset".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_OUTPUT_FOLDER: &str = "organized_files";
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_output_folder() -> String {
    DEFAULT_OUTPUT_FOLDER.to_string()
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini_api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Reserved for a future fuzzy-similarity detector; currently unused.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Relative values are resolved against the scanned root.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            model: default_model(),
            similarity_threshold: default_similarity_threshold(),
            output_folder: default_output_folder(),
        }
    }
}

impl AppConfig {
    /// Loads `<name>.{toml,yaml,json}` if present; a missing file yields
    /// the defaults. `SMART_ORGANIZER_*` environment variables override
    /// file values.
    pub fn load(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("SMART_ORGANIZER"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn api_key_configured(&self) -> bool {
        let key = self.gemini_api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}
