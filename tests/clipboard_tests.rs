use formport_lib::{
    core::errors::AppError,
    workflow::{clipboard::FileClipboard, host::Clipboard},
};

#[tokio::test]
async fn file_clipboard_round_trips_text() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clipboard = FileClipboard::new(dir.path().join("nested").join("clipboard.json"));

    clipboard
        .write_text("{\n  \"formData\": {}\n}")
        .await
        .expect("write");
    let text = clipboard.read_text().await.expect("read");

    assert_eq!(text, "{\n  \"formData\": {}\n}");
}

#[tokio::test]
async fn missing_transfer_slot_is_clipboard_unavailable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clipboard = FileClipboard::new(dir.path().join("absent.json"));

    let err = clipboard.read_text().await.expect_err("missing file");

    assert!(matches!(err, AppError::ClipboardUnavailable(_)));
}
