//! Movie metadata as returned by the lookup service.

use anyhow::{Context, bail};
use serde::Deserialize;

/// The fields the fragment renders. Field names follow the service's
/// PascalCase JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    pub director: String,
    pub genre: String,
    pub rated: String,
    pub plot: String,
    pub poster: String,
}

impl MovieRecord {
    /// Decodes a lookup reply body.
    ///
    /// Replies of the form `{"Response":"False","Error":"..."}` and records
    /// missing any rendered field are errors.
    pub fn from_json(body: &[u8]) -> anyhow::Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(body).context("reply is not JSON")?;

        if value.get("Response").and_then(|r| r.as_str()) == Some("False") {
            let reason = value
                .get("Error")
                .and_then(|e| e.as_str())
                .unwrap_or("no reason given");
            bail!("service rejected lookup: {}", reason);
        }

        serde_json::from_value(value).context("reply is missing movie fields")
    }
}
