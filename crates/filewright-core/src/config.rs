use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub providers: ProvidersConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub gemini: Option<GeminiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub enabled: bool,
    pub api_key_env: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on generate calls within one run; a run that still has
    /// pending tool calls at the limit fails rather than looping forever.
    pub max_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "Filewright".to_string(),
                version: "0.1.0".to_string(),
            },
            providers: ProvidersConfig {
                gemini: Some(GeminiConfig::default()),
            },
            agent: AgentConfig { max_turns: 8 },
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "GEMINI_API_KEY".to_string(),
            default_model: "gemini-2.5-flash".to_string(),
            max_tokens: 4096,
            timeout_seconds: 30,
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> ConfigResult<Self> {
        let mut settings = config::Config::builder();

        // 1. Load default configuration
        settings = settings.add_source(config::File::from_str(
            include_str!("../../../config/default.toml"),
            config::FileFormat::Toml,
        ));

        // 2. Load user configuration if it exists
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("filewright").join("config.toml");
            if user_config.exists() {
                settings = settings.add_source(config::File::from(user_config).required(false));
            }
        }

        // 3. Override with environment variables
        settings =
            settings.add_source(config::Environment::with_prefix("FILEWRIGHT").separator("_"));

        settings
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let gemini = match &self.providers.gemini {
            Some(gemini) if gemini.enabled => gemini,
            _ => {
                return Err(ConfigError::Invalid(
                    "The gemini provider must be enabled".to_string(),
                ))
            }
        };

        self.validate_api_key_env(&gemini.api_key_env)?;

        if gemini.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.gemini.max_tokens".to_string(),
                value: "0".to_string(),
            });
        }

        if self.agent.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_turns".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_api_key_env(&self, env_var: &str) -> ConfigResult<()> {
        if std::env::var(env_var).is_err() {
            return Err(ConfigError::EnvVarNotFound(env_var.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_load() {
        let config = Config::load().unwrap();
        assert_eq!(config.app.name, "Filewright");

        let gemini = config.providers.gemini.unwrap();
        assert_eq!(
            gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();

        let gemini = parsed.providers.gemini.unwrap();
        assert_eq!(gemini.default_model, "gemini-2.5-flash");
        assert_eq!(gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(parsed.agent.max_turns, 8);
    }

    #[test]
    fn validation_requires_api_key_env_var() {
        let mut config = Config::default();
        let gemini = config.providers.gemini.as_mut().unwrap();
        gemini.api_key_env = "FILEWRIGHT_TEST_MISSING_KEY".to_string();

        match config.validate() {
            Err(ConfigError::EnvVarNotFound(var)) => {
                assert_eq!(var, "FILEWRIGHT_TEST_MISSING_KEY");
            }
            other => panic!("expected EnvVarNotFound, got {:?}", other),
        }
    }

    #[test]
    fn validation_rejects_zero_max_turns() {
        let mut config = Config::default();
        let gemini = config.providers.gemini.as_mut().unwrap();
        gemini.api_key_env = "FILEWRIGHT_TEST_PRESENT_KEY".to_string();
        std::env::set_var("FILEWRIGHT_TEST_PRESENT_KEY", "k");
        config.agent.max_turns = 0;

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "agent.max_turns");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn validation_rejects_disabled_provider() {
        let mut config = Config::default();
        config.providers.gemini = None;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
