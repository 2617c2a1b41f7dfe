use std::env;

use derivative::Derivative;
use tracing::info;

use super::SettingsError;

pub const LASTFM_API_KEY_ENV: &str = "NAMEDROP_LASTFM_API_KEY";
pub const SOUNDCLOUD_CLIENT_ID_ENV: &str = "NAMEDROP_SOUNDCLOUD_CLIENT_ID";

#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct Credentials {
    #[derivative(Debug = "ignore")]
    pub lastfm_api_key: String,
    #[derivative(Debug = "ignore")]
    pub soundcloud_client_id: String,
}

impl Credentials {
    pub fn new(lastfm_api_key: impl Into<String>, soundcloud_client_id: impl Into<String>) -> Self {
        Self {
            lastfm_api_key: lastfm_api_key.into(),
            soundcloud_client_id: soundcloud_client_id.into(),
        }
    }

    /// Loads `.env` when present, then reads both keys from the environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {path:?}");
        }
        Ok(Self {
            lastfm_api_key: read_var(LASTFM_API_KEY_ENV)?,
            soundcloud_client_id: read_var(SOUNDCLOUD_CLIENT_ID_ENV)?,
        })
    }
}

fn read_var(name: &'static str) -> Result<String, SettingsError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(SettingsError::MissingCredential(name)),
    }
}
