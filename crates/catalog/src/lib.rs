//! Discoverable LiDAR datasets and the ranking used to pick one to load.

pub mod rank;

use foundation::time::{DateLike, EpochMillis};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use rank::*;

/// One candidate returned by a LiDAR dataset search.
///
/// Only the fields the ranking needs are typed; everything else the provider
/// sends is kept verbatim in `extra` so the descriptor can be handed back to
/// the loader unchanged.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    /// Non-string labels are dropped and rank as unknown quality.
    #[serde(
        default,
        deserialize_with = "text_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateLike>,
    /// Older providers only send `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateLike>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetDescriptor {
    pub fn new(quality_level: impl Into<String>, publication_date: impl Into<String>) -> Self {
        Self {
            quality_level: Some(quality_level.into()),
            publication_date: Some(DateLike::Text(publication_date.into())),
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn quality_score(&self) -> QualityScore {
        QualityScore::from_label(self.quality_level.as_deref())
    }

    /// Publication time used for recency ordering.
    ///
    /// `publicationDate` wins over `date` when present; whichever field is
    /// chosen, a value that does not parse counts as the epoch.
    pub fn published_at(&self) -> EpochMillis {
        let chosen = [&self.publication_date, &self.date]
            .into_iter()
            .flatten()
            .find(|d| d.is_present());
        match chosen {
            Some(d) => d.to_epoch_millis().unwrap_or(EpochMillis::EPOCH),
            None => EpochMillis::EPOCH,
        }
    }
}

fn text_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) => Some(label),
        _ => None,
    })
}
