//! Paragraph detection over leaf zones.

use log::debug;

use crate::error::Result;
use crate::label::{SentenceDetector, PARAGRAPH};
use crate::zone::ZoneTree;

/// Minimum verb-bearing sentences for a zone to count as a paragraph.
const SENTENCE_THRESHOLD: usize = 2;

/// Classify every leaf zone whose visible text holds at least two
/// verb-bearing sentences. Returns how many zones were labeled.
pub fn label_paragraphs(
    zones: &mut ZoneTree,
    detector: &dyn SentenceDetector,
) -> Result<usize> {
    let root = zones.root_id()?;
    let mut labeled = 0;
    for id in zones.leaves(root)? {
        let sentences = detector.count_sentences(&zones.require(id)?.payload.visible_text);
        if sentences >= SENTENCE_THRESHOLD {
            zones.require_mut(id)?.classes.add(PARAGRAPH);
            labeled += 1;
        }
    }
    debug!("labeled {labeled} paragraph zones");
    Ok(labeled)
}
