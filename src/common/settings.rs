use loco_rs::app::AppContext;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Settings {
    /// Root directory of the blob store.
    pub blob_root: String,
    /// Secret for signing presigned download URLs.
    pub presign_secret: String,
    /// Base URL of the vision oracle service.
    pub oracle_url: String,
    /// Model identifier appended to oracle requests.
    pub oracle_model: String,
    pub oracle_api_key: String,
}

impl Settings {
    /// Deserializes the `settings` section of the Loco configuration file
    /// into a strongly-typed `Settings` struct.
    ///
    /// # Errors
    /// When the `settings` section does not match the expected structure.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Reads settings from the app context, falling back to defaults when
    /// the config file carries no `settings` section.
    #[must_use]
    pub fn from_context(ctx: &AppContext) -> Self {
        ctx.config
            .settings
            .as_ref()
            .and_then(|value| Self::from_json(value).ok())
            .unwrap_or_default()
    }
}
