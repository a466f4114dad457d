/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. The upstream API
/// keys have no default: the relay endpoints report a configuration
/// error when the corresponding key is absent.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the generation-job service.
    pub generate_api_url: String,
    /// Optional key sent to the generation-job service as `apikey`.
    pub generate_api_key: Option<String>,
    /// Seconds between generation status checks (default: `4`).
    pub generate_poll_secs: u64,
    /// Chat completion endpoint (Gemini `generateContent`).
    pub chat_api_url: String,
    /// Key for the chat upstream.
    pub gemini_api_key: Option<String>,
    /// Background-removal model endpoint.
    pub remove_bg_api_url: String,
    /// Key for the background-removal upstream.
    pub hf_api_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `PORT`                 | `3000`                                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                     |
    /// | `GENERATE_API_URL`     | `http://localhost:7860`                  |
    /// | `GENERATE_API_KEY`     | *(unset)*                                |
    /// | `GENERATE_POLL_SECS`   | `4`                                      |
    /// | `CHAT_API_URL`         | Gemini `generateContent` endpoint        |
    /// | `GEMINI_API_KEY`       | *(unset)*                                |
    /// | `REMOVE_BG_API_URL`    | HuggingFace `briaai/RMBG-1.4` endpoint   |
    /// | `HF_API_KEY`           | *(unset)*                                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let generate_api_url =
            std::env::var("GENERATE_API_URL").unwrap_or_else(|_| "http://localhost:7860".into());

        let generate_api_key = std::env::var("GENERATE_API_KEY").ok();

        let generate_poll_secs: u64 = std::env::var("GENERATE_POLL_SECS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("GENERATE_POLL_SECS must be a valid u64");

        let chat_api_url = std::env::var("CHAT_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1/models/gemini-2.0-flash:generateContent"
                .into()
        });

        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let remove_bg_api_url = std::env::var("REMOVE_BG_API_URL").unwrap_or_else(|_| {
            "https://api-inference.huggingface.co/models/briaai/RMBG-1.4".into()
        });

        let hf_api_key = std::env::var("HF_API_KEY").ok();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generate_api_url,
            generate_api_key,
            generate_poll_secs,
            chat_api_url,
            gemini_api_key,
            remove_bg_api_url,
            hf_api_key,
        }
    }
}
