//! Citation renderings for generated files and proposal descriptions.

use fops_core::models::citation::single_line;
use fops_core::models::Citation;

/// Comment block listing `citations`, one per line, each prefixed with
/// `comment` (e.g. `#`). Empty when there is nothing to cite.
pub fn citation_comment_block(comment: &str, citations: &[Citation]) -> String {
    if citations.is_empty() {
        return String::new();
    }
    let mut out = format!("{comment} Sources:\n");
    for (i, c) in citations.iter().enumerate() {
        out.push_str(&format!(
            "{comment}   [{}] {}\n",
            i + 1,
            single_line(&c.display_label)
        ));
    }
    out
}

/// Numbered markdown list, e.g. `1. [label](uri)`.
pub fn numbered_markdown(citations: &[Citation]) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. [{}]({})\n",
                i + 1,
                single_line(&c.display_label),
                single_line(&c.source_uri)
            )
        })
        .collect()
}
