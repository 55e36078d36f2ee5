use serde::{Deserialize, Serialize};

use super::KnowledgeItem;

/// Traceable link from generated content back to a knowledge source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub item_id: String,
    pub source_uri: String,
    pub display_label: String,
}

impl Citation {
    /// Derive a citation deterministically from a knowledge item.
    ///
    /// The label is always a single line: it is embedded in line comments
    /// of generated files.
    pub fn from_item(item: &KnowledgeItem) -> Self {
        let label = match item.title.as_deref().map(single_line) {
            Some(title) if !title.is_empty() => title,
            _ => single_line(&item.id),
        };
        Self {
            item_id: item.id.clone(),
            source_uri: item.source_uri.clone(),
            display_label: format!("{label} ({})", single_line(&item.source_uri)),
        }
    }
}

/// Collapse runs of whitespace and control characters into single spaces
/// and trim the ends.
pub fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
