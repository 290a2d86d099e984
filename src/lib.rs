//! # zonal
//!
//! Zone segmentation and article-content labeling for rendered web pages.
//!
//! A rendering pipeline hands over a positioned element tree whose nodes
//! carry pre-assigned classification labels. `zonal` merges runs of those
//! elements into **zones**, spans of the page that behave as one layout and
//! content unit, and then scores and labels the zones (plus an externally
//! built column grouping) to find the main article text.
//!
//! ## Pipeline
//!
//! 1. [`ZoneTreeBuilder`] recursively breaks the page into a [`ZoneTree`],
//!    driven by classification predicates ([`ZoneRules`]).
//! 2. [`label::content::ContentLabeler`] detects paragraphs, aggregates
//!    word-count scores bottom-up, and classifies the greedy best-scoring
//!    column path as article content.
//! 3. [`xml`] persists element and zone trees; a serialize/deserialize round
//!    trip reproduces the tree exactly, which
//!    [`Tree::structural_diff`](tree::Tree::structural_diff) verifies.
//!
//! ## Quick start
//!
//! ```
//! use zonal::{ElementData, ElementTree, Node, NodeId, PageText, Rect, Span};
//! use zonal::{VocabularyRules, ZoneTreeBuilder};
//!
//! let page = PageText {
//!     html: String::new(),
//!     text: "Hello world.".to_string(),
//! };
//!
//! // Element trees are built in two phases: insert nodes with raw ids,
//! // then link once.
//! let mut elements = ElementTree::new();
//! let mut body = Node::new(NodeId(0), ElementData::new("body"));
//! body.payload.text = Span::new(0, 12);
//! body.classes.add("BreakDown");
//! body.push_child(NodeId(1));
//! elements.insert(body).unwrap();
//! let mut para = Node::new(NodeId(1), ElementData::new("p"));
//! para.payload.text = Span::new(0, 12);
//! para.payload.bounds = Rect::new(0, 0, 100, 20);
//! para.classes.add("SignificantBlock");
//! para.set_parent(Some(NodeId(0)));
//! elements.insert(para).unwrap();
//! elements.link().unwrap();
//!
//! let rules = VocabularyRules::default();
//! let zones = ZoneTreeBuilder::new(&rules).build(&elements, &page).unwrap();
//! assert_eq!(zones.len(), 2);
//! let leaf = zones.leaves(zones.root_id().unwrap()).unwrap()[0];
//! assert_eq!(zones.node(leaf).unwrap().payload.text, "Hello world.");
//! ```

pub mod column;
pub mod error;
pub mod geom;
pub mod label;
pub mod page;
pub mod tree;
pub mod xml;
pub mod zone;

pub use column::{ColumnData, ColumnTree};
pub use error::{Error, Result};
pub use geom::Rect;
pub use page::{ElementData, ElementTree, PageText, Span, Vocabulary};
pub use tree::{ClassSet, Node, NodeId, Tree};
pub use zone::builder::{VocabularyRules, ZoneRules, ZoneTreeBuilder};
pub use zone::{ZoneData, ZoneKind, ZoneTree};
