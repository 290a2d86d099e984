//! Zone labeling passes.
//!
//! Three cooperating pieces: paragraph detection over leaf zones, the
//! article-content scoring pipeline, and a tag-based shortcut labeler.
//! The NLP steps (tokenizing, sentence detection) belong to external
//! collaborators invoked through the traits here.

pub mod content;
pub mod paragraph;
pub mod tag;

use crate::error::Result;
use crate::tree::{Payload, Tree};

/// Classification label for zones holding running paragraph text.
pub const PARAGRAPH: &str = "paragraph";

/// Classification label for extracted article content.
pub const ARTICLE_CONTENT: &str = "article content";

/// Feature written by the scoring pass: leaf token count.
pub const WORD_COUNT: &str = "word count";

/// Feature written by the scoring pass: aggregated content score.
pub const CONTENT_SCORE: &str = "content score";

/// Feature written by the scoring pass: share of the root aggregate.
pub const SCORE_FRACTION: &str = "score fraction";

/// Feature written by the column pass: fraction minus best child fraction.
pub const SCORE_DELTA: &str = "score delta";

/// Splits text into word tokens. Production callers wrap their NLP stack.
pub trait Tokenizer {
    fn count_words(&self, text: &str) -> usize;
}

/// Counts sentences that contain at least one verb-tagged token, per the
/// external POS tagger.
pub trait SentenceDetector {
    fn count_sentences(&self, text: &str) -> usize;
}

/// Whitespace token counter. Good enough for the CLI and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_words(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Terminal-punctuation splitter counting every sentence that contains a
/// word. Stands in for a POS-backed detector where verb tagging is
/// unavailable; real callers should supply one that checks for verbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSentences;

impl SentenceDetector for PunctuationSentences {
    fn count_sentences(&self, text: &str) -> usize {
        text.split(['.', '!', '?'])
            .filter(|s| s.chars().any(char::is_alphabetic))
            .count()
    }
}

/// Give every descendant of a classified node the same label.
///
/// Breadth-first order makes one pass enough: each node's parent has
/// already been settled by the time the node comes up.
pub fn propagate_label<P: Payload>(tree: &mut Tree<P>, label: &str) -> Result<()> {
    let root = tree.root_id()?;
    for id in tree.descendants_and_self(root)? {
        let inherited = match tree.require(id)?.parent() {
            Some(parent) => tree.require(parent)?.classes.has(label),
            None => false,
        };
        if inherited {
            tree.require_mut(id)?.classes.add(label);
        }
    }
    Ok(())
}
