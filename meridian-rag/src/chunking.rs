// ABOUTME: Fixed-size overlapping chunker: a sliding window over token-approximate character counts
// ABOUTME: Shared by the ingestion coordinator and any direct callers of the vector adapter's insert path

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    pub min_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_tokens: 64,
            min_tokens: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub content: String,
    pub chunk_index: usize,
    pub token_count: usize,
}

/// Splits `text` on whitespace-delimited tokens into overlapping windows of
/// at most `max_tokens`, stepping by `max_tokens - overlap_tokens`. A final
/// remainder shorter than `min_tokens` is merged into the previous chunk
/// rather than emitted as its own tiny chunk.
#[must_use]
pub fn chunk_fixed_size(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let step = config.max_tokens.saturating_sub(config.overlap_tokens).max(1);
    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < tokens.len() {
        let end = (start + config.max_tokens).min(tokens.len());
        let window = &tokens[start..end];

        if window.len() < config.min_tokens && !chunks.is_empty() {
            if let Some(last) = chunks.last_mut() {
                last.content.push(' ');
                last.content.push_str(&window.join(" "));
                last.token_count += window.len();
            }
        } else {
            chunks.push(TextChunk {
                content: window.join(" "),
                chunk_index: index,
                token_count: window.len(),
            });
            index += 1;
        }

        if end == tokens.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_produces_single_chunk() {
        let chunks = chunk_fixed_size("one two three", &ChunkingConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].token_count, 3);
    }

    #[test]
    fn long_text_produces_overlapping_windows() {
        let text = (0..1000).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let config = ChunkingConfig {
            max_tokens: 100,
            overlap_tokens: 10,
            min_tokens: 5,
        };
        let chunks = chunk_fixed_size(&text, &config);
        assert!(chunks.len() > 1);
        for window in chunks.windows(2) {
            assert!(window[1].chunk_index > window[0].chunk_index);
        }
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(chunk_fixed_size("", &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn tiny_remainder_merges_into_previous_chunk() {
        let text = "a b c d e f g";
        let config = ChunkingConfig {
            max_tokens: 5,
            overlap_tokens: 0,
            min_tokens: 3,
        };
        let chunks = chunk_fixed_size(text, &config);
        assert_eq!(chunks.len(), 1);
    }
}
