mod support;

use formport_lib::{
    core::types::PathSegment,
    reconcile::assets::{find_identical_asset, AssetResolver},
};
use serde_json::{json, Value};
use support::{media, FakeAssets};

fn path() -> Vec<PathSegment> {
    vec![PathSegment::Key("cover".to_string())]
}

fn destination_copy(id: i64, source: &Value) -> Value {
    let mut copy = source.clone();
    copy["id"] = json!(id);
    copy["url"] = json!(format!("/uploads/dest_{id}.png"));
    copy
}

#[tokio::test]
async fn identical_destination_asset_is_reused_without_transfer() {
    let source = media(3, "hero", "https://src.example.com/hero.png");
    let inventory = vec![
        destination_copy(50, &media(9, "other", "x")),
        destination_copy(77, &source),
        destination_copy(78, &source),
    ];
    let assets = FakeAssets::with_inventory(inventory.clone());
    let resolver = AssetResolver::new(&assets, Some(inventory.as_slice()));

    let resolved = resolver.resolve_asset(&source, &path()).await;

    assert_eq!(resolved["id"], json!(77), "first match wins");
    assert!(assets.downloads().is_empty());
    assert!(assets.uploads().is_empty());
}

#[tokio::test]
async fn reuse_disabled_uploads_with_descriptive_metadata() {
    let source = media(3, "hero", "https://src.example.com/hero.png");
    let assets = FakeAssets::default();
    let resolver = AssetResolver::new(&assets, None);

    let resolved = resolver.resolve_asset(&source, &path()).await;

    assert_eq!(assets.downloads(), vec!["https://src.example.com/hero.png".to_string()]);
    let uploads = assets.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].name, json!("hero"));
    assert_eq!(uploads[0].alternative_text, json!("hero alt"));
    assert_eq!(uploads[0].caption, Value::Null);
    assert_eq!(uploads[0].folder, None);
    assert_eq!(resolved["id"], json!(1001));
}

#[tokio::test]
async fn differing_size_forces_upload() {
    let source = media(3, "hero", "https://src.example.com/hero.png");
    let mut resized = destination_copy(77, &source);
    resized["size"] = json!(13.0);
    let inventory = vec![resized];
    let assets = FakeAssets::with_inventory(inventory.clone());
    let resolver = AssetResolver::new(&assets, Some(inventory.as_slice()));

    let resolved = resolver.resolve_asset(&source, &path()).await;

    assert_eq!(assets.uploads().len(), 1);
    assert_ne!(resolved["id"], json!(77));
}

#[test]
fn integer_and_float_encodings_of_a_dimension_match() {
    let source = json!({ "name": "a", "width": 640, "height": 480, "size": 12 });
    let candidate = json!({ "id": 9, "name": "a", "width": 640.0, "height": 480.0, "size": 12.0 });
    let inventory = [candidate];
    let found = find_identical_asset(&inventory, &source).expect("reused");
    assert_eq!(found["id"], json!(9));
}

#[test]
fn absent_attribute_does_not_equal_null() {
    let source = json!({ "name": "a", "caption": null });
    let candidate = json!({ "name": "a" });
    assert!(find_identical_asset(&[candidate], &source).is_none());
}

#[tokio::test]
async fn failed_download_clears_reference() {
    let source = media(3, "hero", "https://src.example.com/missing.png");
    let assets = FakeAssets {
        broken_urls: vec!["https://src.example.com/missing.png".to_string()],
        ..FakeAssets::default()
    };
    let resolver = AssetResolver::new(&assets, None);

    let resolved = resolver.resolve_asset(&source, &path()).await;

    assert_eq!(resolved, Value::Null);
    assert!(assets.uploads().is_empty());
}

#[tokio::test]
async fn media_without_url_clears_reference() {
    let mut source = media(3, "hero", "unused");
    source.as_object_mut().expect("object").remove("url");
    let assets = FakeAssets::default();
    let resolver = AssetResolver::new(&assets, None);

    assert_eq!(resolver.resolve_asset(&source, &path()).await, Value::Null);
    assert!(assets.downloads().is_empty());
}

#[tokio::test]
async fn null_and_bare_ids_pass_through() {
    let assets = FakeAssets::default();
    let resolver = AssetResolver::new(&assets, None);

    assert_eq!(resolver.resolve_asset(&Value::Null, &path()).await, Value::Null);
    assert_eq!(resolver.resolve_asset(&json!(14), &path()).await, json!(14));
    assert!(assets.downloads().is_empty());
}
