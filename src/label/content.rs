//! Article-content scoring and classification.
//!
//! Bottom-up, then top-down: leaf zones are scored by word count, scores
//! aggregate toward the root, every node gets its share of the total, and
//! then a single greedy walk down the column tree classifies the path whose
//! score concentration clears the threshold. Finally the label flows down
//! both trees.

use log::debug;

use crate::column::{ColumnData, ColumnTree};
use crate::error::Result;
use crate::label::paragraph::label_paragraphs;
use crate::label::{
    propagate_label, SentenceDetector, Tokenizer, ARTICLE_CONTENT, CONTENT_SCORE, PARAGRAPH,
    SCORE_DELTA, SCORE_FRACTION, WORD_COUNT,
};
use crate::tree::feature::FeatureValue;
use crate::tree::walk::{BreadthFirst, Reversed};
use crate::tree::Node;
use crate::zone::ZoneTree;

/// Minimum score-fraction delta for a column on the greedy path to be
/// classified as article content.
const DELTA_THRESHOLD: f64 = 0.3;

/// Supplies each column's score fraction, derived from the zones it covers.
pub trait ColumnFractions {
    fn score_fraction(&self, column: &Node<ColumnData>) -> Result<f64>;
}

/// Sums the score fractions of the zones a column owns. Zones are disjoint
/// between columns, so the sums stay within [0, 1].
pub struct ZoneFractionSum<'a> {
    zones: &'a ZoneTree,
}

impl<'a> ZoneFractionSum<'a> {
    pub fn new(zones: &'a ZoneTree) -> Self {
        Self { zones }
    }
}

impl ColumnFractions for ZoneFractionSum<'_> {
    fn score_fraction(&self, column: &Node<ColumnData>) -> Result<f64> {
        let mut total = 0.0;
        for &zone in &column.payload.zones {
            total += self.zones.require(zone)?.features.decimal(SCORE_FRACTION)?;
        }
        Ok(total)
    }
}

/// The full labeling pipeline over a zone tree and its column grouping.
pub struct ContentLabeler<'a> {
    tokenizer: &'a dyn Tokenizer,
    detector: &'a dyn SentenceDetector,
}

impl<'a> ContentLabeler<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, detector: &'a dyn SentenceDetector) -> Self {
        Self {
            tokenizer,
            detector,
        }
    }

    /// Paragraphs, scores, column classification, downward propagation.
    ///
    /// When no zone scores at all, the zone root is classified wholesale and
    /// the column steps are skipped.
    pub fn execute(
        &self,
        zones: &mut ZoneTree,
        columns: &mut ColumnTree,
        fractions: &dyn ColumnFractions,
    ) -> Result<()> {
        let total = self.execute_zones(zones)?;
        if total == 0 {
            return Ok(());
        }

        self.classify_columns(columns, fractions)?;
        propagate_label(columns, ARTICLE_CONTENT)?;

        // Zones covered by a classified column pick up the label, then it
        // flows down the zone tree as well.
        let column_root = columns.root_id()?;
        for id in columns.descendants_and_self(column_root)? {
            let column = columns.require(id)?;
            if !column.classes.has(ARTICLE_CONTENT) {
                continue;
            }
            for zone in column.payload.zones.clone() {
                zones.require_mut(zone)?.classes.add(ARTICLE_CONTENT);
            }
        }
        propagate_label(zones, ARTICLE_CONTENT)?;
        Ok(())
    }

    /// The zone-side half of the pipeline: paragraphs, scores, and the
    /// empty-page fallback. For callers without a column grouping.
    /// Returns the root aggregate.
    pub fn execute_zones(&self, zones: &mut ZoneTree) -> Result<i64> {
        label_paragraphs(zones, self.detector)?;
        let total = self.score(zones)?;
        if total == 0 {
            debug!("no scoreable text; classifying the root wholesale");
            let root = zones.root_id()?;
            zones.require_mut(root)?.classes.add(ARTICLE_CONTENT);
            propagate_label(zones, ARTICLE_CONTENT)?;
        }
        Ok(total)
    }

    /// Word counts, leaf scores, bottom-up aggregates, score fractions.
    /// Returns the root aggregate.
    pub fn score(&self, zones: &mut ZoneTree) -> Result<i64> {
        let root = zones.root_id()?;

        for id in zones.leaves(root)? {
            let node = zones.require_mut(id)?;
            let words = self.tokenizer.count_words(&node.payload.visible_text) as i64;
            let score = if node.classes.has(PARAGRAPH) { words } else { 0 };
            node.features.set(WORD_COUNT, FeatureValue::Int(words));
            node.features.set(CONTENT_SCORE, FeatureValue::Int(score));
        }

        // Children come out before parents in the mirrored breadth-first
        // order, so every child aggregate is final when its parent sums.
        let mut walker = Reversed::new(BreadthFirst::new());
        for id in zones.descendants_and_self_with(root, &mut walker, None)? {
            let children = zones.require(id)?.children().to_vec();
            if children.is_empty() {
                continue;
            }
            let mut sum = 0i64;
            for child in children {
                sum += zones.require(child)?.features.int(CONTENT_SCORE)?;
            }
            zones
                .require_mut(id)?
                .features
                .set(CONTENT_SCORE, FeatureValue::Int(sum));
        }

        let total = zones.require(root)?.features.int(CONTENT_SCORE)?;
        debug!("root aggregate content score: {total}");
        if total > 0 {
            for id in zones.descendants_and_self(root)? {
                let score = zones.require(id)?.features.int(CONTENT_SCORE)?;
                let fraction = score as f64 / total as f64;
                zones
                    .require_mut(id)?
                    .features
                    .set(SCORE_FRACTION, FeatureValue::Decimal(fraction));
            }
        }
        Ok(total)
    }

    /// Fractions onto columns, deltas, then one greedy descent classifying
    /// the path. Only nodes on that single path are ever tested.
    pub fn classify_columns(
        &self,
        columns: &mut ColumnTree,
        fractions: &dyn ColumnFractions,
    ) -> Result<()> {
        let root = columns.root_id()?;
        let order = columns.descendants_and_self(root)?;

        for &id in &order {
            let fraction = fractions.score_fraction(columns.require(id)?)?;
            columns
                .require_mut(id)?
                .features
                .set(SCORE_FRACTION, FeatureValue::Decimal(fraction));
        }
        for &id in &order {
            let node = columns.require(id)?;
            let own = node.features.decimal(SCORE_FRACTION)?;
            let mut best_child = 0.0f64;
            for &child in node.children() {
                best_child = best_child.max(columns.require(child)?.features.decimal(SCORE_FRACTION)?);
            }
            columns
                .require_mut(id)?
                .features
                .set(SCORE_DELTA, FeatureValue::Decimal(own - best_child));
        }

        let mut cursor = root;
        loop {
            if columns.require(cursor)?.features.decimal(SCORE_DELTA)? >= DELTA_THRESHOLD {
                columns.require_mut(cursor)?.classes.add(ARTICLE_CONTENT);
            }
            let children = columns.require(cursor)?.children().to_vec();
            let Some(&first) = children.first() else {
                break;
            };
            // First child with the strictly highest fraction wins ties.
            let mut best = first;
            let mut best_fraction = columns.require(first)?.features.decimal(SCORE_FRACTION)?;
            for &child in &children[1..] {
                let fraction = columns.require(child)?.features.decimal(SCORE_FRACTION)?;
                if fraction > best_fraction {
                    best = child;
                    best_fraction = fraction;
                }
            }
            cursor = best;
        }
        Ok(())
    }
}
