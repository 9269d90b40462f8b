use futures::future::{join_all, FutureExt, LocalBoxFuture};
use serde_json::{Map, Value};

use crate::core::types::{child_path, FieldPath, PathSegment, UnresolvedRelation};
use crate::reconcile::{
    assets::AssetResolver,
    relations::RelationResolver,
    shape::{classify, NodeShape},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkOutcome {
    pub value: Value,
    pub unresolved: Vec<UnresolvedRelation>,
}

impl WalkOutcome {
    fn leaf(value: Value) -> Self {
        Self {
            value,
            unresolved: vec![],
        }
    }
}

/// Rewrites an entry's field tree for the destination environment.
///
/// The input is only borrowed; the returned tree is freshly built. Children
/// of a sequence or mapping are resolved concurrently on the current task and
/// reassembled in input order.
pub struct DocumentWalker<'a> {
    assets: AssetResolver<'a>,
    relations: RelationResolver<'a>,
}

impl<'a> DocumentWalker<'a> {
    pub fn new(assets: AssetResolver<'a>, relations: RelationResolver<'a>) -> Self {
        Self { assets, relations }
    }

    pub fn transform<'s>(&'s self, value: &'s Value, path: FieldPath) -> LocalBoxFuture<'s, WalkOutcome> {
        async move {
            match value {
                Value::Array(items) => self.transform_sequence(items, &path).await,
                Value::Object(node) => self.transform_mapping(node, &path).await,
                scalar => WalkOutcome::leaf(scalar.clone()),
            }
        }
        .boxed_local()
    }

    async fn transform_sequence(&self, items: &[Value], path: &[PathSegment]) -> WalkOutcome {
        let children = join_all(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| self.transform(item, child_path(path, sequence_segment(item, index)))),
        )
        .await;

        let mut unresolved = vec![];
        let mut values = Vec::with_capacity(children.len());
        for child in children {
            values.push(child.value);
            unresolved.extend(child.unresolved);
        }
        WalkOutcome {
            value: Value::Array(values),
            unresolved,
        }
    }

    async fn transform_mapping(&self, node: &Map<String, Value>, path: &[PathSegment]) -> WalkOutcome {
        match classify(node) {
            NodeShape::Media => {
                let media = Value::Object(without_id(node));
                WalkOutcome::leaf(self.assets.resolve_asset(&media, path).await)
            }
            NodeShape::Link => {
                let mut link = without_id(node);
                if let Some(icon) = link.get("icon") {
                    let icon = self.assets.resolve_asset(icon, path).await;
                    link.insert("icon".to_string(), icon);
                }
                let (value, unresolved) = self.relations.resolve_link(link, path);
                WalkOutcome {
                    value,
                    unresolved: unresolved.into_iter().collect(),
                }
            }
            NodeShape::Plain => {
                let entries = node.iter().filter(|(key, _)| key.as_str() != "id");
                let keys = entries.clone().map(|(key, _)| key.clone()).collect::<Vec<_>>();
                let children = join_all(entries.map(|(key, value)| {
                    self.transform(value, child_path(path, PathSegment::Key(key.clone())))
                }))
                .await;

                let mut unresolved = vec![];
                let mut rebuilt = Map::with_capacity(keys.len());
                for (key, child) in keys.into_iter().zip(children) {
                    rebuilt.insert(key, child.value);
                    unresolved.extend(child.unresolved);
                }
                WalkOutcome {
                    value: Value::Object(rebuilt),
                    unresolved,
                }
            }
        }
    }
}

fn sequence_segment(item: &Value, index: usize) -> PathSegment {
    match item.get("__component").and_then(Value::as_str) {
        Some(component) if !component.is_empty() => PathSegment::component(component, index),
        _ => PathSegment::Index(index),
    }
}

/// The destination assigns its own ids.
fn without_id(node: &Map<String, Value>) -> Map<String, Value> {
    node.iter()
        .filter(|(key, _)| key.as_str() != "id")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
