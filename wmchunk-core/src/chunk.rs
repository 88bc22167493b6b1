//! Chunked progressive reveal of a symbol sequence.
//!
//! A sequence is cut into contiguous groups of `chunk_size` symbols (the last
//! group may be shorter). At step `k` the screen shows `k` masked chunks
//! followed by the live chunk, so the displayed prefix grows chunk by chunk:
//!
//! ```text
//! step 0: 1 2
//! step 1: # # 3 4
//! ```

use crate::error::ChunkError;

pub const DEFAULT_MASK: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSequencer {
    symbols: Vec<String>,
    chunk_size: usize,
    mask: char,
}

impl ChunkSequencer {
    pub fn new<S: AsRef<str>>(
        symbols: &[S],
        chunk_size: usize,
        mask: char,
    ) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        Ok(Self {
            symbols: symbols.iter().map(|s| s.as_ref().to_owned()).collect(),
            chunk_size,
            mask,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks, `ceil(len / chunk_size)`.
    pub fn len(&self) -> usize {
        self.symbols.len().div_ceil(self.chunk_size)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &[String]> {
        self.symbols.chunks(self.chunk_size)
    }

    pub fn chunk(&self, step: usize) -> Option<&[String]> {
        self.chunks().nth(step)
    }

    /// Text shown while chunk `step` is live: `step` masked chunks followed by
    /// the chunk itself.
    pub fn reveal(&self, step: usize) -> Option<String> {
        let live = self.chunk(step)?;
        let mut tokens = self.mask_tokens(step);
        tokens.extend(live.iter().cloned());
        Some(tokens.join(" "))
    }

    /// Text shown after chunk `step` has been masked.
    pub fn masked(&self, step: usize) -> Option<String> {
        self.chunk(step)?;
        Some(self.mask_tokens(step + 1).join(" "))
    }

    /// `(reveal, masked)` pairs for every step, in presentation order.
    pub fn steps(&self) -> impl Iterator<Item = (String, String)> + '_ {
        (0..self.len()).filter_map(|step| Some((self.reveal(step)?, self.masked(step)?)))
    }

    fn mask_tokens(&self, masked_chunks: usize) -> Vec<String> {
        vec![self.mask.to_string(); masked_chunks * self.chunk_size]
    }
}
