//! Recursive character text splitter.
//!
//! Text is split on the first separator of the hierarchy that occurs in it
//! (paragraphs, then lines, then words, then single characters). The pieces are
//! merged back greedily into chunks of at most `chunk_size` characters, and each
//! new chunk re-uses up to `chunk_overlap` characters from the tail of the
//! previous one. Pieces that are still too large are split again with the next
//! separator.

use std::collections::VecDeque;

use crate::domain::document::DocumentChunk;
use crate::domain::error::RagError;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Size limits for the splitter, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl SplitterSettings {
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidSplitter(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidSplitter(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    settings: SplitterSettings,
}

impl RecursiveTextSplitter {
    pub fn new(settings: SplitterSettings) -> Result<Self, RagError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &DEFAULT_SEPARATORS)
    }

    /// Splits a whole document and tags every chunk with its source and position.
    pub fn split_document(&self, source: &str, text: &str) -> Vec<DocumentChunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| DocumentChunk {
                source: source.to_string(),
                chunk_index,
                text,
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= self.settings.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                // Unreachable with the default hierarchy, which ends in "".
                chunks.extend(self.split_with(piece, &[""]));
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    /// Greedily joins pieces that each fit into `chunk_size`.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let SplitterSettings {
            chunk_size,
            chunk_overlap,
        } = self.settings;
        let separator_len = char_len(separator);

        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { separator_len };

            if total + len + joiner > chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window, separator) {
                    merged.push(chunk);
                }
                // Keep at most `chunk_overlap` characters as the head of the next chunk.
                loop {
                    let joiner = if window.is_empty() { 0 } else { separator_len };
                    let overflows = total > 0 && total + len + joiner > chunk_size;
                    if total <= chunk_overlap && !overflows {
                        break;
                    }
                    let Some(first) = window.pop_front() else {
                        break;
                    };
                    let joined = if window.is_empty() { 0 } else { separator_len };
                    total = total.saturating_sub(char_len(first) + joined);
                }
            }

            if !window.is_empty() {
                total += separator_len;
            }
            total += len;
            window.push_back(piece);
        }

        if let Some(chunk) = join_trimmed(&window, separator) {
            merged.push(chunk);
        }
        merged
    }
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self {
            settings: SplitterSettings::default(),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
