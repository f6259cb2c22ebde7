use crate::domain::errors::{PipelineError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_CHUNK_OVERLAP: usize = 64;

/// Splits normalized markdown into bounded segments for embedding.
///
/// Sizes are counted in characters and cuts always land on character
/// boundaries. Chunk ends prefer structural breaks (blank line, then line
/// end, then word end) over mid-word cuts; each following chunk starts
/// exactly `overlap` characters before the previous end. The final chunk
/// absorbs a tail shorter than `overlap`, so it may exceed `chunk_size` by
/// at most `overlap - 1` characters.
///
/// Deterministic: identical input and parameters yield identical output.
/// Empty input yields no chunks; input within `chunk_size` yields one.
pub fn chunk_markdown(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(PipelineError::chunking("chunk size must be positive"));
    }
    if overlap >= chunk_size {
        return Err(PipelineError::chunking(format!(
            "overlap {overlap} must be smaller than chunk size {chunk_size}"
        )));
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let total = chars.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    if total <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let byte_at = |i: usize| {
        if i == total {
            text.len()
        } else {
            chars[i].0
        }
    };

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        if total - start <= chunk_size {
            chunks.push(text[byte_at(start)..].to_string());
            break;
        }

        let mut end = cut_point(&chars, start + overlap + 1, start + chunk_size);
        // A trailing remainder shorter than the overlap would be almost
        // entirely repeated context; fold it into this chunk instead.
        if total - end < overlap {
            end = total;
        }

        chunks.push(text[byte_at(start)..byte_at(end)].to_string());
        if end == total {
            break;
        }
        start = end - overlap;
    }

    Ok(chunks)
}

/// Largest cut position in `[min_end, limit]` on the best boundary class
/// present: after a blank line, after a line end, after a space. Falls back
/// to a hard cut at `limit`.
fn cut_point(chars: &[(usize, char)], min_end: usize, limit: usize) -> usize {
    let mut after_line = None;
    let mut after_word = None;

    let mut i = limit;
    while i >= min_end {
        let c = chars[i - 1].1;
        if c == '\n' {
            if i >= 2 && chars[i - 2].1 == '\n' {
                return i;
            }
            after_line.get_or_insert(i);
        } else if c == ' ' && after_word.is_none() {
            after_word = Some(i);
        }
        i -= 1;
    }

    after_line.or(after_word).unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_markdown("", 1024, 64).unwrap().is_empty());
    }

    #[test]
    fn short_input_yields_one_chunk() {
        let chunks = chunk_markdown("a short note", 1024, 64).unwrap();
        assert_eq!(chunks, vec!["a short note".to_string()]);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        assert!(chunk_markdown("text", 64, 64).is_err());
        assert!(chunk_markdown("text", 0, 0).is_err());
    }

    #[test]
    fn unbroken_2000_chars_split_into_two_windows() {
        let text: String = "abcdefghij".repeat(200);
        let chunks = chunk_markdown(&text, 1024, 64).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(char_len(&chunks[0]), 1024);
        assert_eq!(chunks[0], text[..1024]);
        // second chunk spans characters 960..2000, sharing 64 with the first
        assert_eq!(chunks[1], text[960..]);
        assert_eq!(&chunks[0][960..], &chunks[1][..64]);
    }

    #[test]
    fn consecutive_chunks_share_exactly_the_overlap() {
        let text: String = "0123456789".repeat(500);
        let chunks = chunk_markdown(&text, 512, 32).unwrap();

        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let tail: String = prev[prev.len() - 32..].iter().collect();
            let head: String = pair[1].chars().take(32).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn all_but_the_final_chunk_respect_chunk_size() {
        let text: String = "lorem ipsum dolor sit amet ".repeat(200);
        let chunks = chunk_markdown(&text, 256, 16).unwrap();

        for chunk in &chunks[..chunks.len() - 1] {
            assert!(char_len(chunk) <= 256);
        }
        assert!(char_len(chunks.last().unwrap()) < 256 + 16);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!(
            "{}\n\n{}\n\n{}",
            "x".repeat(500),
            "y".repeat(500),
            "z".repeat(500)
        );
        let chunks = chunk_markdown(&text, 1024, 64).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].ends_with("\n\n"));
        assert_eq!(char_len(&chunks[0]), 1004);
    }

    #[test]
    fn deterministic_across_calls() {
        let text: String = "some repeated content with words ".repeat(100);
        let a = chunk_markdown(&text, 300, 30).unwrap();
        let b = chunk_markdown(&text, 300, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn never_splits_inside_a_code_point() {
        let text: String = "héllo wörld ".repeat(300);
        let chunks = chunk_markdown(&text, 128, 16).unwrap();
        // reaching here without a panic proves every cut hit a char boundary
        assert!(!chunks.is_empty());
    }
}
