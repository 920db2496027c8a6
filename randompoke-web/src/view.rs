//! Serializable shapes handed to JavaScript.
use randompoke_core::{GenerationOptions, GeneratedRecord, HistoryControls, LoadedOptions, OptionsOrigin};
use serde::Serialize;

use crate::paths;

/// One record ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: u32,
    pub name: String,
    pub summary: String,
    pub alt_text: String,
    pub sprite_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_symbol: Option<&'static str>,
    pub shiny: bool,
    /// RFC 3339, absent for some older vault entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<&GeneratedRecord> for RecordView {
    fn from(record: &GeneratedRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            summary: record.summary(),
            alt_text: record.alt_text(),
            sprite_url: paths::sprite_url(record),
            nature: record.nature.map(|n| n.label().to_string()),
            gender_symbol: record.gender_symbol(),
            shiny: record.shiny,
            timestamp: record.timestamp.map(|t| t.to_rfc3339()),
        }
    }
}

#[must_use]
pub fn record_views(records: &[GeneratedRecord]) -> Vec<RecordView> {
    records.iter().map(RecordView::from).collect()
}

/// Startup options for the form, plus the share query they encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedOptionsView {
    pub options: GenerationOptions,
    pub origin: OptionsOrigin,
    pub auto_generate: bool,
    pub share_query: String,
}

impl From<LoadedOptions> for LoadedOptionsView {
    fn from(loaded: LoadedOptions) -> Self {
        Self {
            share_query: loaded.options.to_query(),
            options: loaded.options,
            origin: loaded.origin,
            auto_generate: loaded.auto_generate,
        }
    }
}

/// Navigation/vault control state plus the displayed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsView {
    #[serde(flatten)]
    pub controls: HistoryControls,
    pub displayed: Vec<RecordView>,
}
