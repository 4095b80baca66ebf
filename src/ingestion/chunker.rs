//! Word-window text chunking with overlap

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Text chunker producing overlapping word windows
pub struct Chunker {
    /// Window size in words
    chunk_size: usize,
    /// Words shared between consecutive chunks
    overlap: usize,
}

impl Chunker {
    /// Create a chunker; `overlap` must stay below `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate(chunk_size, overlap)?;
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Chunk a document's text, tagging each chunk with its position
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let pieces = chunk_text(text, self.chunk_size, self.overlap)
            .expect("parameters validated at construction");
        let total = pieces.len() as u32;

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content,
                index: i as u32,
                total_chunks: total,
            })
            .collect()
    }
}

fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::validation("chunk_size must be positive"));
    }
    if overlap >= chunk_size {
        return Err(Error::validation(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }
    Ok(())
}

/// Split text into overlapping word windows.
///
/// Tokenizes on whitespace runs, filtering empty tokens. Text at or below
/// `chunk_size` words becomes a single trimmed chunk; otherwise a window
/// of `chunk_size` words advances by `chunk_size - overlap` words until
/// its end reaches the word count. Words are rejoined with single
/// spaces. Pure and deterministic.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    validate(chunk_size, overlap)?;

    let words: Vec<&str> = text.split_whitespace().collect();

    if words.is_empty() {
        return Ok(Vec::new());
    }

    if words.len() <= chunk_size {
        return Ok(vec![text.trim().to_string()]);
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        // A window touching the last word fully covers the remainder;
        // stepping again would only re-emit its tail.
        if end == words.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
