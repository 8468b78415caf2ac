/*
 * Responsibility
 * - Issuer defaults (max age, accepted signing algorithms)
 * - Loading them from the environment / .env
 */
use std::fmt;

/// Default token lifetime, in seconds.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 3600;

/// Asymmetric JWS algorithms accepted for session keys unless configured otherwise.
pub const DEFAULT_ALLOWED_ALGORITHMS: &[&str] = &[
    "ES256", "ES384", "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "EdDSA",
];

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerConfig {
    // Lifetime of issued tokens (exp - iat), seconds.
    pub max_age_seconds: u64,
    // JWS `alg` values a session key may declare.
    pub allowed_algorithms: Vec<String>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            allowed_algorithms: DEFAULT_ALLOWED_ALGORITHMS
                .iter()
                .map(|alg| alg.to_string())
                .collect(),
        }
    }
}

impl IssuerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_age_seconds = match lookup("POP_TOKEN_MAX_AGE_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid("POP_TOKEN_MAX_AGE_SECONDS"))?,
            None => defaults.max_age_seconds,
        };

        let allowed_algorithms = match lookup("POP_TOKEN_ALLOWED_ALGS") {
            Some(raw) => {
                let algs = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>();

                // Symmetric and unsigned algorithms can never prove possession of a private key.
                if algs.is_empty()
                    || algs
                        .iter()
                        .any(|alg| !DEFAULT_ALLOWED_ALGORITHMS.contains(&alg.as_str()))
                {
                    return Err(ConfigError::Invalid("POP_TOKEN_ALLOWED_ALGS"));
                }
                algs
            }
            None => defaults.allowed_algorithms,
        };

        Ok(Self {
            max_age_seconds,
            allowed_algorithms,
        })
    }

    pub fn allows(&self, alg: &str) -> bool {
        self.allowed_algorithms.iter().any(|a| a == alg)
    }
}
