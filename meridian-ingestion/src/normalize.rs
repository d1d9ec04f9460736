// ABOUTME: Source normalization: extract a title from the first heading, else fall back to filename
// ABOUTME: Handles Markdown/plain-text/structured-document flavors uniformly by stripping to plain text

use std::sync::LazyLock;

use regex::Regex;

static MD_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+)$").unwrap());
static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^---\n.*?\n---\n").unwrap());

#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub title: String,
    pub content: String,
}

/// Strips YAML front matter and extracts a title from the first Markdown
/// heading; other document flavors pass through content unchanged.
#[must_use]
pub fn normalize(raw: &str, filename: &str) -> NormalizedDocument {
    let stripped = FRONT_MATTER.replace(raw, "");
    let title = MD_HEADING
        .captures(&stripped)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| title_from_filename(filename));
    NormalizedDocument {
        title,
        content: stripped.trim().to_string(),
    }
}

fn title_from_filename(filename: &str) -> String {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    base.rsplit_once('.').map_or(base, |(stem, _)| stem).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_from_first_heading() {
        let doc = normalize("# My Title\n\nbody text", "fallback.md");
        assert_eq!(doc.title, "My Title");
        assert!(doc.content.contains("body text"));
    }

    #[test]
    fn falls_back_to_filename_when_no_heading() {
        let doc = normalize("plain content, no heading here", "notes/weekly-report.md");
        assert_eq!(doc.title, "weekly-report");
    }

    #[test]
    fn strips_front_matter_before_heading_search() {
        let doc = normalize("---\ntitle: ignored\n---\n# Real Title\nbody", "x.md");
        assert_eq!(doc.title, "Real Title");
    }
}
