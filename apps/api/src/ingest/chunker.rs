//! Recursive character splitter.
//!
//! Text is split on the coarsest separator present (`"\n\n"`, then `"\n"`,
//! then `" "`, then individual characters). Pieces are merged greedily up to
//! `chunk_size` characters; each new chunk starts with the trailing pieces of
//! the previous one, up to `chunk_overlap` characters. Pieces too large for a
//! chunk are split again with the next separator.
//!
//! All lengths are counted in `char`s.

use std::collections::VecDeque;

use thiserror::Error;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Error, PartialEq)]
pub enum ChunkerError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// A passage of a document produced by the chunker, before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub ordinal: usize,
    /// Character offset of the span inside the source text.
    pub offset: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkerError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Splits `text` into overlapping spans with dense ordinals starting at 0.
    pub fn split(&self, text: &str) -> Vec<TextSpan> {
        let root = Piece { start: 0, text };
        self.split_recursive(root, &SEPARATORS)
            .into_iter()
            .enumerate()
            .map(|(ordinal, chunk)| TextSpan {
                ordinal,
                offset: text[..chunk.start].chars().count(),
                text: chunk.text,
            })
            .collect()
    }

    fn split_recursive(&self, piece: Piece<'_>, separators: &[&'static str]) -> Vec<Merged> {
        let (separator, remaining) = pick_separator(piece.text, separators);

        let splits: Vec<Piece<'_>> = if separator.is_empty() {
            piece
                .text
                .char_indices()
                .map(|(i, c)| Piece {
                    start: piece.start + i,
                    text: &piece.text[i..i + c.len_utf8()],
                })
                .collect()
        } else {
            let mut pos = piece.start;
            let mut splits = Vec::new();
            for part in piece.text.split(separator) {
                if !part.is_empty() {
                    splits.push(Piece {
                        start: pos,
                        text: part,
                    });
                }
                pos += part.len() + separator.len();
            }
            splits
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<Piece<'_>> = Vec::new();

        for split in splits {
            if char_len(split.text) < self.chunk_size {
                fitting.push(split);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge_splits(&fitting, separator));
                fitting.clear();
            }

            if remaining.is_empty() {
                push_joined(&mut chunks, std::slice::from_ref(&split), separator);
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge_splits(&fitting, separator));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[Piece<'_>], separator: &str) -> Vec<Merged> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<Piece<'_>> = VecDeque::new();
        let mut total = 0usize;

        for &split in splits {
            let len = char_len(split.text);
            let joined_len = |current: &VecDeque<Piece<'_>>, total: usize| {
                total + len + if current.is_empty() { 0 } else { separator_len }
            };

            if joined_len(&current, total) > self.chunk_size && !current.is_empty() {
                push_joined(&mut chunks, current.make_contiguous(), separator);

                // Drop leading pieces until what remains fits the overlap
                // budget and leaves room for the incoming piece.
                while total > self.chunk_overlap
                    || (joined_len(&current, total) > self.chunk_size && total > 0)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front.text) + if current.is_empty() { 0 } else { separator_len };
                }
            }

            if !current.is_empty() {
                total += separator_len;
            }
            current.push_back(split);
            total += len;
        }

        push_joined(&mut chunks, current.make_contiguous(), separator);
        chunks
    }
}

/// A slice of the source text and its byte offset in the source.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    start: usize,
    text: &'a str,
}

/// A finished chunk. `start` is the byte offset of its first non-whitespace
/// character in the source.
#[derive(Debug)]
struct Merged {
    start: usize,
    text: String,
}

fn pick_separator<'a>(
    text: &str,
    separators: &'a [&'static str],
) -> (&'static str, &'a [&'static str]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Joins pieces with `separator` and trims the result. Separators are
/// whitespace, so the trimmed chunk begins at the first non-whitespace
/// character of the first piece that has one.
fn push_joined(chunks: &mut Vec<Merged>, pieces: &[Piece<'_>], separator: &str) {
    let joined = pieces.iter().map(|p| p.text).collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = pieces
        .iter()
        .find_map(|p| p.text.find(|c: char| !c.is_whitespace()).map(|i| p.start + i));
    if let Some(start) = start {
        chunks.push(Merged {
            start,
            text: trimmed.to_string(),
        });
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(spans: &[TextSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert_eq!(
            RecursiveChunker::new(100, 100).unwrap_err(),
            ChunkerError::OverlapTooLarge {
                size: 100,
                overlap: 100
            }
        );
        assert_eq!(
            RecursiveChunker::new(0, 0).unwrap_err(),
            ChunkerError::ZeroChunkSize
        );
    }

    #[test]
    fn test_empty_and_blank_text_produce_no_chunks() {
        let chunker = RecursiveChunker::new(10, 2).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split(" \n\n \n").is_empty());
    }

    #[test]
    fn test_separator_free_text_overlaps_exactly() {
        let chunker = RecursiveChunker::new(10, 3).unwrap();
        let spans = chunker.split("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(
            texts(&spans),
            vec!["abcdefghij", "hijklmnopq", "opqrstuvwx", "vwxyz"]
        );
        let offsets: Vec<usize> = spans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 7, 14, 21]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = RecursiveChunker::new(1000, 100).unwrap();
        let spans = chunker.split("  Alice Smith\nSenior Rust Engineer  ");
        assert_eq!(texts(&spans), vec!["Alice Smith\nSenior Rust Engineer"]);
        assert_eq!(spans[0].ordinal, 0);
        assert_eq!(spans[0].offset, 2);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = RecursiveChunker::new(20, 0).unwrap();
        let text = "Alice Smith rocks\n\nBob Jones is great\n\nCarol";
        let spans = chunker.split(text);
        assert_eq!(
            texts(&spans),
            vec!["Alice Smith rocks", "Bob Jones is great", "Carol"]
        );
    }

    #[test]
    fn test_word_overlap_carries_trailing_words() {
        let chunker = RecursiveChunker::new(11, 5).unwrap();
        let spans = chunker.split("one two three four");
        assert_eq!(texts(&spans), vec!["one two", "two three", "three four"]);
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let chunker = RecursiveChunker::new(50, 10).unwrap();
        let text = "Experienced engineer with Rust, Go and Kubernetes. ".repeat(40)
            + "\n\n"
            + &"x".repeat(130);
        let spans = chunker.split(&text);
        assert!(spans.len() > 10);
        for span in &spans {
            assert!(span.text.chars().count() <= 50, "too long: {:?}", span.text);
        }
    }

    #[test]
    fn test_ordinals_are_dense() {
        let chunker = RecursiveChunker::new(30, 5).unwrap();
        let spans = chunker.split(&"word ".repeat(100));
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.ordinal, i);
        }
    }

    #[test]
    fn test_multibyte_text_is_counted_in_chars() {
        let chunker = RecursiveChunker::new(4, 1).unwrap();
        let spans = chunker.split("日本語のテキスト");
        assert_eq!(texts(&spans), vec!["日本語の", "のテキス", "スト"]);
        assert_eq!(spans[1].offset, 3);
    }

    #[test]
    fn test_offsets_point_at_chunk_text_when_words_repeat() {
        let chunker = RecursiveChunker::new(30, 5).unwrap();
        let text = "word ".repeat(20);
        let spans = chunker.split(&text);
        let offsets: Vec<usize> = spans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 25, 50, 75]);
    }

    #[test]
    fn test_offsets_locate_every_chunk_in_source() {
        let chunker = RecursiveChunker::new(40, 10).unwrap();
        let text = "Python developer. Python and AWS.\nPython, Python, Python.\n\n".repeat(5);
        let chars: Vec<char> = text.chars().collect();
        for span in chunker.split(&text) {
            let at_offset: String = chars[span.offset..]
                .iter()
                .take(span.text.chars().count())
                .collect();
            assert_eq!(at_offset, span.text, "offset {} is wrong", span.offset);
        }
    }
}
