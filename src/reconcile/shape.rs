use serde_json::{Map, Value};

const MEDIA_MARKERS: [&str; 3] = ["related", "updatedBy", "alternativeText"];
const LINK_MARKERS: [&str; 3] = ["url", "target", "page"];

/// How a mapping node is handled during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Media,
    Link,
    Plain,
}

/// Classifies by marker-key presence. Media is checked first; a mapping
/// carrying only some of a shape's markers is `Plain`.
pub fn classify(node: &Map<String, Value>) -> NodeShape {
    if MEDIA_MARKERS.iter().all(|key| node.contains_key(*key)) {
        NodeShape::Media
    } else if LINK_MARKERS.iter().all(|key| node.contains_key(*key)) {
        NodeShape::Link
    } else {
        NodeShape::Plain
    }
}
