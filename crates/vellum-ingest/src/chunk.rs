use vellum_core::{Chunk, DocumentId};

use crate::extract::PageText;

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters carried from the tail of one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Splits cleaned text into bounded, overlapping, page-attributed chunks.
///
/// Sentences are never split mid-way: a single sentence longer than
/// `chunk_size` becomes its own oversized chunk, trading the size bound for
/// semantic integrity.
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunk `text`, attributing each chunk to a page of `page_table` when
    /// one is given.
    ///
    /// Total over any input: empty or whitespace-only text yields an empty
    /// vector rather than an error.
    #[must_use]
    pub fn chunk(
        &self,
        text: &str,
        document_id: DocumentId,
        page_table: Option<&[PageText]>,
    ) -> Vec<Chunk> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        // Length of the buffer once joined with single spaces.
        let mut current_len = 0usize;

        for sentence in split_sentences(&cleaned) {
            let sentence_len = sentence.chars().count();
            let joined_len = current_len + usize::from(!current.is_empty()) + sentence_len;

            if !current.is_empty() && joined_len > self.config.chunk_size {
                let sealed = current.join(" ");
                let overlap = tail_chars(&sealed, self.config.chunk_overlap);
                chunks.push(seal(sealed, chunks.len(), document_id, page_table));
                if overlap.is_empty() {
                    current_len = sentence_len;
                    current = vec![sentence];
                } else {
                    current_len = overlap.chars().count() + 1 + sentence_len;
                    current = vec![overlap, sentence];
                }
            } else {
                current_len = joined_len;
                current.push(sentence);
            }
        }

        if !current.is_empty() {
            let sealed = current.join(" ");
            chunks.push(seal(sealed, chunks.len(), document_id, page_table));
        }

        chunks
    }
}

fn seal(
    text: String,
    chunk_index: usize,
    document_id: DocumentId,
    page_table: Option<&[PageText]>,
) -> Chunk {
    let page_number = page_table
        .filter(|table| !table.is_empty())
        .map(|table| attribute_page(&text, table));
    let char_count = text.chars().count();
    Chunk {
        text,
        chunk_index,
        document_id,
        page_number,
        char_count,
    }
}

/// Best-effort page attribution: the first 100 characters of the chunk are
/// matched as a substring against each page's raw text, first match wins,
/// falling back to page 1.
///
/// Advisory only — suitable for citation display, never a correctness
/// guarantee.
#[must_use]
pub fn attribute_page(chunk_text: &str, page_table: &[PageText]) -> u32 {
    let prefix: String = chunk_text.chars().take(100).collect();
    page_table
        .iter()
        .find(|page| page.text.contains(&prefix))
        .map_or(1, |page| page.page_number)
}

/// Collapse whitespace: runs containing a newline become one newline, other
/// runs become one space; leading and trailing whitespace is dropped.
fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;

    for c in text.chars() {
        if c.is_whitespace() {
            if matches!(c, '\n' | '\r') {
                pending = Some('\n');
            } else if pending.is_none() {
                pending = Some(' ');
            }
        } else {
            if let Some(sep) = pending.take()
                && !out.is_empty()
            {
                out.push(sep);
            }
            out.push(c);
        }
    }

    out
}

/// Split on `.`, `!`, or `?` followed by whitespace, keeping the terminator
/// with its sentence. Empty units are dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace())
        {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_owned());
            }
            current.clear();
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_owned());
    }

    sentences
}

/// Last `n` characters of `text`, or all of it when shorter.
fn tail_chars(text: &str, n: usize) -> String {
    let count = text.chars().count();
    if count <= n {
        return text.to_owned();
    }
    text.chars().skip(count - n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: DocumentId = DocumentId(1);

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunker(500, 50).chunk("", DOC, None);
        assert!(chunks.is_empty());
    }

    #[test]
    fn whitespace_only_yields_no_chunks() {
        let chunks = chunker(500, 50).chunk("  \n\t  \n ", DOC, None);
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunker(500, 50).chunk("Hello world.", DOC, None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].char_count, 12);
        assert_eq!(chunks[0].page_number, None);
    }

    #[test]
    fn oversized_single_sentence_emitted_whole() {
        // One 600-char sentence with chunk_size 500: never split mid-sentence.
        let sentence = format!("{}.", "a".repeat(599));
        let chunks = chunker(500, 50).chunk(&sentence, DOC, None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_count, 600);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn overlap_seeds_second_chunk() {
        // Two 300-char sentences with chunk_size 500, overlap 50: the first
        // chunk is sentence one, the second starts with its last 50 chars.
        let s1 = format!("{}.", "a".repeat(299));
        let s2 = format!("{}.", "b".repeat(299));
        let text = format!("{s1} {s2}");
        let chunks = chunker(500, 50).chunk(&text, DOC, None);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, s1);
        assert_eq!(chunks[0].char_count, 300);
        let tail: String = s1.chars().skip(250).collect();
        assert!(chunks[1].text.starts_with(&tail));
        assert!(chunks[1].text.ends_with(&s2));
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = (0..40)
            .map(|i| format!("Sentence number {i} has some words in it."))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunker(200, 40).chunk(&text, DOC, None);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let tail = tail_chars(&pair[0].text, 40);
            assert!(pair[1].text.starts_with(&tail));
        }
    }

    #[test]
    fn indices_are_contiguous() {
        let text = (0..30)
            .map(|i| format!("Short sentence {i}."))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunker(80, 10).chunk(&text, DOC, None);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.document_id, DOC);
        }
    }

    #[test]
    fn clean_text_collapses_runs_and_trims() {
        assert_eq!(
            clean_text("  Hello   \t world.\n\n\nNext   line.\t "),
            "Hello world.\nNext line."
        );
    }

    #[test]
    fn sealed_chunks_join_sentences_with_spaces() {
        let chunks = chunker(500, 50).chunk("Hello   \t world.\n\n\nNext   line.", DOC, None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world. Next line.");
    }

    #[test]
    fn question_and_exclamation_split_sentences() {
        let sentences = split_sentences("Is this split? Yes! And this too.");
        assert_eq!(sentences, vec!["Is this split?", "Yes!", "And this too."]);
    }

    #[test]
    fn terminator_without_whitespace_does_not_split() {
        let sentences = split_sentences("Version 1.2 shipped");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn tail_chars_shorter_text_returned_whole() {
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(tail_chars("abcdef", 3), "def");
    }

    #[test]
    fn tail_chars_is_character_based() {
        assert_eq!(tail_chars("héllo", 4), "éllo");
    }

    #[test]
    fn page_attribution_finds_matching_page() {
        let pages = vec![
            PageText {
                page_number: 1,
                text: "Completely different opening content.".into(),
            },
            PageText {
                page_number: 2,
                text: "The merger agreement was signed in May. More page two text.".into(),
            },
        ];
        assert_eq!(
            attribute_page("The merger agreement was signed in May.", &pages),
            2
        );
    }

    #[test]
    fn page_attribution_defaults_to_first_page() {
        let pages = vec![PageText {
            page_number: 3,
            text: "unrelated".into(),
        }];
        assert_eq!(attribute_page("no page contains this prefix", &pages), 1);
    }

    #[test]
    fn chunks_carry_page_numbers_when_table_given() {
        let pages = vec![PageText {
            page_number: 1,
            text: "A tiny document body.".into(),
        }];
        let chunks = chunker(500, 50).chunk("A tiny document body.", DOC, Some(&pages));
        assert_eq!(chunks[0].page_number, Some(1));
    }

    #[test]
    fn empty_page_table_leaves_page_unattributed() {
        let chunks = chunker(500, 50).chunk("Some text here.", DOC, Some(&[]));
        assert_eq!(chunks[0].page_number, None);
    }

    mod proptest_chunker {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn chunk_never_panics(
                text in "\\PC{0,2000}",
                chunk_size in 1usize..1000,
                chunk_overlap in 0usize..200,
            ) {
                let chunker = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap });
                let _ = chunker.chunk(&text, DOC, None);
            }

            #[test]
            fn indices_sequential_and_chunks_nonempty(
                text in "[a-z .!?]{0,1000}",
                chunk_size in 5usize..200,
                chunk_overlap in 0usize..4,
            ) {
                let chunker = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap });
                let chunks = chunker.chunk(&text, DOC, None);
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.chunk_index, i);
                    prop_assert!(!chunk.text.is_empty());
                    prop_assert_eq!(chunk.char_count, chunk.text.chars().count());
                }
            }

            #[test]
            fn every_sentence_lands_in_some_chunk(
                words in proptest::collection::vec("[a-z]{1,8}", 1..60),
                chunk_size in 30usize..120,
            ) {
                let text = words
                    .iter()
                    .map(|w| format!("{w} {w}."))
                    .collect::<Vec<_>>()
                    .join(" ");
                let chunker = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap: 10 });
                let chunks = chunker.chunk(&text, DOC, None);

                for sentence in split_sentences(&clean_text(&text)) {
                    prop_assert!(
                        chunks.iter().any(|c| c.text.contains(&sentence)),
                        "sentence {:?} missing from all chunks",
                        sentence
                    );
                }
            }

            #[test]
            fn size_bound_holds_for_small_sentences(
                words in proptest::collection::vec("[a-z]{1,8}", 1..80),
                chunk_size in 40usize..200,
                chunk_overlap in 0usize..30,
            ) {
                // Every generated sentence is at most 18 chars, far below
                // chunk_size, so the oversized-sentence exception never fires.
                let text = words
                    .iter()
                    .map(|w| format!("{w} {w}."))
                    .collect::<Vec<_>>()
                    .join(" ");
                let chunker = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap });
                let chunks = chunker.chunk(&text, DOC, None);

                for chunk in &chunks {
                    prop_assert!(
                        chunk.char_count <= chunk_size + chunk_overlap,
                        "chunk of {} chars exceeds bound {}",
                        chunk.char_count,
                        chunk_size + chunk_overlap
                    );
                }
            }
        }
    }
}
