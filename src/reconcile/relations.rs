use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::core::types::{format_path, PageRecord, PathSegment, UnresolvedRelation};

const SENTINEL_PREFIX: &str = "Select page equivalent to source id ";

/// Placeholder page id that fails host validation until someone picks the
/// right page by hand.
pub fn unresolved_sentinel(source_id: &Value) -> Value {
    if is_unresolved_sentinel(source_id) {
        return source_id.clone();
    }
    let rendered = match source_id {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Value::String(format!("{SENTINEL_PREFIX}{rendered}"))
}

pub fn is_unresolved_sentinel(id: &Value) -> bool {
    id.as_str()
        .map(|text| text.starts_with(SENTINEL_PREFIX))
        .unwrap_or(false)
}

/// Titles decide when both are set; otherwise both SEO titles must be set
/// and equal.
pub fn pages_equivalent(source: &PageRecord, candidate: &PageRecord) -> bool {
    match (source.non_empty_title(), candidate.non_empty_title()) {
        (Some(left), Some(right)) => left == right,
        _ => match (source.non_empty_seo_title(), candidate.non_empty_seo_title()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        },
    }
}

pub fn find_equivalent_page<'p>(
    source: &PageRecord,
    destination: &'p [PageRecord],
) -> Option<&'p PageRecord> {
    destination
        .iter()
        .find(|candidate| pages_equivalent(source, candidate))
}

/// Fresh `page` sub-mapping pointing at a destination record.
pub fn page_reference(page: &PageRecord) -> Value {
    json!({
        "id": page.id,
        "title": page.title,
        "vuid": page.vuid,
        "versionNumber": page.version_number,
        "createdAt": page.created_at,
        "updatedAt": page.updated_at,
        "publishedAt": page.published_at,
        "isVisibleInListView": page.is_visible_in_list_view,
    })
}

pub struct RelationResolver<'a> {
    matching_enabled: bool,
    source: Option<&'a [PageRecord]>,
    destination: Option<&'a [PageRecord]>,
}

impl<'a> RelationResolver<'a> {
    pub fn new(
        matching_enabled: bool,
        source: Option<&'a [PageRecord]>,
        destination: Option<&'a [PageRecord]>,
    ) -> Self {
        Self {
            matching_enabled,
            source,
            destination,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, None, None)
    }

    fn inventories(&self) -> Option<(&'a [PageRecord], &'a [PageRecord])> {
        if !self.matching_enabled {
            return None;
        }
        match (self.source, self.destination) {
            (Some(source), Some(destination)) if !source.is_empty() && !destination.is_empty() => {
                Some((source, destination))
            }
            _ => None,
        }
    }

    /// Expects the link's icon to be resolved already.
    pub fn resolve_link(
        &self,
        link: Map<String, Value>,
        path: &[PathSegment],
    ) -> (Value, Option<UnresolvedRelation>) {
        let source_id = match link.get("page").and_then(|page| page.get("id")) {
            Some(id) if !id.is_null() => id.clone(),
            _ => return (Value::Object(link), None),
        };

        if let Some((source, destination)) = self.inventories() {
            match source.iter().find(|page| page.id == source_id) {
                Some(source_page) => match find_equivalent_page(source_page, destination) {
                    Some(matched) => {
                        info!(
                            path = %format_path(path),
                            source_id = %source_id,
                            destination_id = %matched.id,
                            title = source_page.display_title(),
                            "found equivalent page"
                        );
                        let mut resolved = link;
                        resolved.insert("page".to_string(), page_reference(matched));
                        return (Value::Object(resolved), None);
                    }
                    None => info!(
                        path = %format_path(path),
                        source_id = %source_id,
                        title = source_page.display_title(),
                        "no equivalent page in destination"
                    ),
                },
                None => warn!(
                    path = %format_path(path),
                    source_id = %source_id,
                    "source page missing from exported page list"
                ),
            }
        }

        let record = UnresolvedRelation {
            path: path.to_vec(),
            link: Value::Object(link.clone()),
        };
        let mut flagged = link;
        flagged.insert(
            "page".to_string(),
            json!({ "id": unresolved_sentinel(&source_id) }),
        );
        (Value::Object(flagged), Some(record))
    }
}
