mod support;

use std::collections::HashMap;

use formport_lib::{
    core::types::{format_path, PathSegment},
    reconcile::{assets::AssetResolver, relations::RelationResolver, walker::DocumentWalker},
};
use serde_json::json;
use support::{link, media, FakeAssets};

fn root(key: &str) -> Vec<PathSegment> {
    vec![PathSegment::Key(key.to_string())]
}

#[tokio::test]
async fn plain_tree_loses_ids_and_keeps_key_order() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!({
        "id": 7,
        "zeta": { "id": 1, "text": "last" },
        "alpha": [{ "id": 2, "n": 1 }, { "id": 3, "n": 2 }],
        "count": 3,
        "flag": null
    });

    let outcome = walker.transform(&input, root("seo")).await;

    assert_eq!(
        outcome.value,
        json!({
            "zeta": { "text": "last" },
            "alpha": [{ "n": 1 }, { "n": 2 }],
            "count": 3,
            "flag": null
        })
    );
    let keys: Vec<&String> = outcome.value.as_object().expect("object").keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "count", "flag"]);
    assert!(outcome.unresolved.is_empty());
    assert_eq!(input["id"], json!(7), "input must not be mutated");
}

#[tokio::test]
async fn scalars_pass_through_unchanged() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    for value in [json!("title"), json!(12), json!(true), json!(null)] {
        let outcome = walker.transform(&value, root("title")).await;
        assert_eq!(outcome.value, value);
    }
}

#[tokio::test]
async fn dynamic_zone_entries_are_labelled_by_component() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!([
        { "id": 1, "__component": "blocks.hero", "title": "Hi" },
        { "id": 2, "__component": "blocks.card-list", "cards": [{ "id": 5, "cta": link(9, Some(42)) }] }
    ]);

    let outcome = walker.transform(&input, root("blocks")).await;

    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(
        format_path(&outcome.unresolved[0].path),
        "blocks.blocks_card-list#1.cards.0.cta"
    );
    assert_eq!(outcome.value[0], json!({ "__component": "blocks.hero", "title": "Hi" }));
}

#[tokio::test]
async fn second_walk_over_resolved_document_is_identity() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!({
        "title": "About",
        "blocks": [{ "id": 4, "__component": "blocks.text", "body": "Lorem", "items": [{ "id": 8 }] }]
    });

    let once = walker.transform(&input, vec![]).await;
    let twice = walker.transform(&once.value, vec![]).await;

    assert_eq!(once.value, twice.value);
    assert!(twice.unresolved.is_empty());
}

#[tokio::test]
async fn sequence_order_survives_out_of_order_completion() {
    let mut delays = HashMap::new();
    delays.insert("https://src.example.com/a.png".to_string(), 40);
    delays.insert("https://src.example.com/b.png".to_string(), 1);
    delays.insert("https://src.example.com/c.png".to_string(), 25);
    let assets = FakeAssets {
        download_delays_ms: delays,
        ..FakeAssets::default()
    };
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!([
        media(1, "a", "https://src.example.com/a.png"),
        media(2, "b", "https://src.example.com/b.png"),
        media(3, "c", "https://src.example.com/c.png")
    ]);

    let outcome = walker.transform(&input, root("gallery")).await;

    let names: Vec<&str> = outcome
        .value
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(
        assets.downloads().first().map(String::as_str),
        Some("https://src.example.com/b.png"),
        "b should finish first"
    );
}

#[tokio::test]
async fn legacy_numeric_icon_is_kept() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!({ "url": "https://example.com", "target": "_blank", "page": null, "icon": 31 });

    let outcome = walker.transform(&input, root("cta")).await;

    assert_eq!(
        outcome.value,
        json!({ "url": "https://example.com", "target": "_blank", "page": null, "icon": 31 })
    );
    assert!(assets.downloads().is_empty());
}

#[tokio::test]
async fn partial_marker_sets_are_walked_as_plain_mappings() {
    let assets = FakeAssets::default();
    let walker = DocumentWalker::new(AssetResolver::new(&assets, None), RelationResolver::disabled());
    let input = json!({ "id": 3, "url": "/x", "page": { "id": 4, "note": "kept" } });

    let outcome = walker.transform(&input, root("meta")).await;

    assert_eq!(outcome.value, json!({ "url": "/x", "page": { "note": "kept" } }));
    assert!(outcome.unresolved.is_empty());
}
