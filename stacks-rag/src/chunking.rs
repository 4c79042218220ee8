//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! splits text hierarchically at paragraph, sentence, then word boundaries
//! before falling back to hard character cuts with overlap.

/// A strategy for splitting raw document text into passages.
///
/// Implementations must be deterministic: identical input always produces
/// identical output. Splitting is best-effort and never fails.
pub trait Chunker: Send + Sync {
    /// Split text into passages.
    ///
    /// Returns an empty `Vec` for empty or whitespace-only input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). If a paragraph exceeds
/// `chunk_size`, splits by sentence boundaries (`. `, `! `, `? `). If a
/// sentence still exceeds `chunk_size`, splits by word boundaries, and as a
/// last resort by hard character cuts with `chunk_overlap` characters carried
/// between consecutive cuts.
///
/// Overlap applies to hard character cuts only. Chunks split at a natural
/// boundary carry zero overlap: each paragraph, sentence, or word belongs to
/// exactly one chunk.
///
/// Sizes and overlap are measured in characters, not bytes, so multi-byte
/// input never splits inside a code point.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive
    ///   hard-cut chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let separators = ["\n\n", ". ", "! ", "? ", " "];
        split_and_merge(text, self.chunk_size, self.chunk_overlap, &separators)
    }
}

/// Number of characters in a string.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. If a segment exceeds `chunk_size`, it is split further
/// using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];
    let segments = split_keeping_separator(text, separator);

    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if char_len(&current) + char_len(segment) <= chunk_size {
            current.push_str(segment);
        } else {
            // Current chunk is full — process it
            if char_len(&current) > chunk_size {
                chunks.extend(split_and_merge(
                    &current,
                    chunk_size,
                    chunk_overlap,
                    remaining_separators,
                ));
            } else {
                chunks.push(current);
            }
            current = segment.to_string();
        }
    }

    if !current.is_empty() {
        if char_len(&current) > chunk_size {
            chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, remaining_separators));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so that merging segments reproduces the input.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Hard character-based splitting with overlap, stepping by char boundaries.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
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
    fn empty_input_produces_no_chunks() {
        let chunker = RecursiveChunker::new(1000, 200);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  \n\n").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk("A short passage about gradient descent.");
        assert_eq!(chunks, vec!["A short passage about gradient descent.".to_string()]);
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = RecursiveChunker::new(120, 30);
        let text = "First paragraph about linear models.\n\nSecond paragraph about trees. \
                    It has two sentences! And a question? Plus trailing words here."
            .repeat(4);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn chunks_respect_the_size_bound() {
        let chunker = RecursiveChunker::new(100, 20);
        let text = "word ".repeat(400);
        for chunk in chunker.chunk(&text) {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let chunker = RecursiveChunker::new(50, 10);
        let text = format!("{}\n\n{}", "a".repeat(40), "b".repeat(40));
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with('a'));
        assert!(chunks[1].starts_with('b'));
    }

    #[test]
    fn boundary_splits_carry_no_overlap() {
        let chunker = RecursiveChunker::new(50, 10);
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(40), "b".repeat(40), "c".repeat(40));
        let chunks = chunker.chunk(&text);

        // Each character of the input lands in exactly one chunk.
        let total: usize = chunks.iter().map(|c| c.chars().count()).sum();
        assert_eq!(total, text.chars().count());
    }

    #[test]
    fn hard_cuts_overlap_by_the_configured_amount() {
        let chunker = RecursiveChunker::new(100, 20);
        // No separators at all forces hard character cuts.
        let text: String =
            (0..350).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(pair[0].chars().count() - 20).collect();
            let head: String = pair[1].chars().take(20).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn multibyte_text_never_panics() {
        let chunker = RecursiveChunker::new(50, 10);
        let text = "統計モデルの学習。".repeat(40);
        let chunks = chunker.chunk(&text);
        assert!(!chunks.is_empty());
        for chunk in chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
