use serde::{Deserialize, Serialize};

/// Card data as handed over by the caller, already fetched and parsed.
///
/// `text` carries the inline markup (`<strong>`, `<em>`, `[credit]`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub title: String,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub text: String,
    pub type_id: String,
    #[serde(default)]
    pub display_subtypes: Option<String>,
}
