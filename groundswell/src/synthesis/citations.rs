//! Stitches grounding citations into generated text.
//!
//! Supports carry byte end-offsets into the original text, so markers are
//! inserted highest-offset-first: every insertion shifts the tail of the
//! string, and descending order keeps all not-yet-processed offsets valid.

use std::collections::HashMap;

use crate::llm::grounded::{GroundingMetadata, GroundingSupport};

/// Inserts bracketed citation markers at each support's end offset and
/// appends a numbered source list. Text without grounding metadata passes
/// through unmodified.
pub fn stitch_citations(text: &str, metadata: Option<&GroundingMetadata>) -> String {
    let Some(metadata) = metadata else {
        return text.to_string();
    };
    if metadata.grounding_supports.is_empty() || metadata.grounding_chunks.is_empty() {
        return text.to_string();
    }

    // Number unique cited URIs in first-seen order. Two chunk entries with
    // the same URI share one number.
    let mut sources: Vec<(String, Option<String>)> = Vec::new();
    let mut chunk_numbers: HashMap<usize, usize> = HashMap::new();
    for support in &metadata.grounding_supports {
        for &chunk_index in &support.grounding_chunk_indices {
            if chunk_numbers.contains_key(&chunk_index) {
                continue;
            }
            let Some(web) = metadata
                .grounding_chunks
                .get(chunk_index)
                .and_then(|chunk| chunk.web.as_ref())
            else {
                continue;
            };
            let Some(uri) = web.uri.as_deref() else {
                continue;
            };
            if let Some(position) = sources.iter().position(|(existing, _)| existing == uri) {
                chunk_numbers.insert(chunk_index, position + 1);
            } else {
                sources.push((uri.to_string(), web.title.clone()));
                chunk_numbers.insert(chunk_index, sources.len());
            }
        }
    }
    if sources.is_empty() {
        return text.to_string();
    }

    let mut supports: Vec<&GroundingSupport> = metadata.grounding_supports.iter().collect();
    supports.sort_by(|a, b| b.end_offset().cmp(&a.end_offset()));

    let mut stitched = text.to_string();
    for support in supports {
        let mut numbers: Vec<usize> = support
            .grounding_chunk_indices
            .iter()
            .filter_map(|index| chunk_numbers.get(index).copied())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        if numbers.is_empty() {
            continue;
        }

        let marker: String = numbers
            .into_iter()
            .map(|number| format!("[{number}]"))
            .collect();

        // Offsets are bytes into the original UTF-8 text; clamp to length
        // and back off to a char boundary rather than panic on bad provider
        // data.
        let mut at = support.end_offset().min(stitched.len());
        while at > 0 && !stitched.is_char_boundary(at) {
            at -= 1;
        }
        stitched.insert_str(at, &marker);
    }

    stitched.push_str("\n\nSources:\n");
    for (index, (uri, title)) in sources.iter().enumerate() {
        let title = title.as_deref().unwrap_or(uri);
        stitched.push_str(&format!("[{}] [{title}]({uri})\n", index + 1));
    }

    stitched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::grounded::{GroundingChunk, Segment, WebSource};
    use pretty_assertions::assert_eq;

    fn chunk(uri: &str, title: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebSource {
                uri: Some(uri.to_string()),
                title: Some(title.to_string()),
            }),
        }
    }

    fn support(end_index: usize, chunk_indices: Vec<usize>) -> GroundingSupport {
        GroundingSupport {
            segment: Some(Segment {
                start_index: 0,
                end_index,
            }),
            grounding_chunk_indices: chunk_indices,
        }
    }

    #[test]
    fn test_no_metadata_is_identity() {
        let text = "Housing coalition wins rent freeze.";
        assert_eq!(stitch_citations(text, None), text);
    }

    #[test]
    fn test_empty_metadata_is_identity() {
        let text = "Housing coalition wins rent freeze.";
        let metadata = GroundingMetadata::default();
        assert_eq!(stitch_citations(text, Some(&metadata)), text);
    }

    #[test]
    fn test_markers_inserted_descending_by_offset() {
        // Offsets refer to the original text: processing 30 before 10 keeps
        // both valid.
        let text = "0123456789abcdefghijklmnopqrstuvwxyz";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                chunk("https://example.org/a", "Source A"),
                chunk("https://example.org/b", "Source B"),
            ],
            grounding_supports: vec![support(10, vec![0]), support(30, vec![1])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        let body = stitched.split("\n\nSources:\n").next().unwrap();

        assert_eq!(body, "0123456789[1]abcdefghijklmnopqrst[2]uvwxyz");
        // Body grew by exactly the inserted marker lengths.
        assert_eq!(body.len(), text.len() + "[1]".len() + "[2]".len());
    }

    #[test]
    fn test_duplicate_uris_share_one_source_number() {
        let text = "first claim. second claim.";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                chunk("https://example.org/same", "Same story"),
                chunk("https://example.org/same", "Same story syndicated"),
            ],
            grounding_supports: vec![support(12, vec![0]), support(26, vec![1])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        assert!(stitched.contains("first claim.[1]"));
        assert!(stitched.contains("second claim.[1]"));
        assert!(!stitched.contains("[2]"));

        let sources = stitched.split("\n\nSources:\n").nth(1).unwrap();
        assert_eq!(
            sources,
            "[1] [Same story](https://example.org/same)\n"
        );
    }

    #[test]
    fn test_sources_listed_in_first_seen_order() {
        let text = "abcdefghij";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                chunk("https://example.org/late", "Late"),
                chunk("https://example.org/early", "Early"),
            ],
            // The low-offset support cites chunk 1, so its URI is seen first.
            grounding_supports: vec![support(2, vec![1]), support(8, vec![0])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        let sources = stitched.split("\n\nSources:\n").nth(1).unwrap();
        assert_eq!(
            sources,
            "[1] [Early](https://example.org/early)\n[2] [Late](https://example.org/late)\n"
        );
        assert!(stitched.starts_with("ab[1]"));
    }

    #[test]
    fn test_one_support_citing_two_chunks() {
        let text = "claim.";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                chunk("https://example.org/a", "A"),
                chunk("https://example.org/b", "B"),
            ],
            grounding_supports: vec![support(6, vec![0, 1])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        assert!(stitched.starts_with("claim.[1][2]"));
    }

    #[test]
    fn test_offset_past_end_clamps_to_text_length() {
        let text = "short";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("https://example.org/a", "A")],
            grounding_supports: vec![support(999, vec![0])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        assert!(stitched.starts_with("short[1]"));
    }

    #[test]
    fn test_offset_inside_multibyte_char_backs_off_to_boundary() {
        // "é" is two bytes; offset 3 lands inside the second "é".
        let text = "éé";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("https://example.org/a", "A")],
            grounding_supports: vec![support(3, vec![0])],
        };

        let stitched = stitch_citations(text, Some(&metadata));
        assert!(stitched.starts_with("é[1]é"));
    }

    #[test]
    fn test_chunk_without_uri_is_skipped() {
        let text = "claim.";
        let metadata = GroundingMetadata {
            grounding_chunks: vec![GroundingChunk { web: None }],
            grounding_supports: vec![support(6, vec![0])],
        };

        assert_eq!(stitch_citations(text, Some(&metadata)), text);
    }
}
