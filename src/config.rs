use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// OpenAI API key used by the chatbot panel
    pub openai_api_key: String,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat completion model
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Size of the top-ranked group a recommendation is drawn from
    #[serde(default = "default_five")]
    pub top_k: usize,

    /// Chat turns kept per session
    #[serde(default = "default_five")]
    pub chat_history_limit: usize,

    /// Cards shown at once in the trending carousel
    #[serde(default = "default_five")]
    pub trending_window: usize,

    /// Movies shown per genre in the showcase
    #[serde(default = "default_five")]
    pub showcase_size: usize,

    /// Seconds a session may go without an event before it is dropped
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Fixed seed for the recommendation random source
    #[serde(default)]
    pub recommender_seed: Option<u64>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_five() -> usize {
    5
}

fn default_session_ttl_secs() -> u64 {
    1800
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Idle time after which a session is dropped
    pub fn session_ttl(&self) -> chrono::Duration {
        let max_secs = chrono::Duration::MAX.num_seconds();
        let secs = i64::try_from(self.session_ttl_secs).unwrap_or(max_secs);
        chrono::Duration::seconds(secs.min(max_secs))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
