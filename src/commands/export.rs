use tracing::info;

use crate::{
    commands::TransferArgs,
    core::errors::AppResult,
    providers::strapi::StrapiClient,
    workflow::{clipboard::FileClipboard, entry_host::EntryHost, orchestrator::TransferOrchestrator},
};

pub async fn export_entry(args: TransferArgs) -> AppResult<()> {
    let config = args.connection.config()?;
    let token = args.connection.token()?;
    let clipboard = FileClipboard::new(args.clipboard_path(&config));
    let status_timeout = config.status_timeout;
    let client = StrapiClient::new(config, token)?;
    let host = EntryHost::new(&client, args.uid.as_str(), args.id.as_str());

    let orchestrator = TransferOrchestrator::new(&host, &clipboard, &client, &client)
        .with_options(args.options())
        .with_status_timeout(status_timeout);
    let report = orchestrator.export().await?;
    info!(path = %clipboard.path().display(), "payload written");

    println!(
        "Exported {}/{} to {} ({} bytes{})",
        args.uid,
        args.id,
        clipboard.path().display(),
        report.bytes_written,
        report
            .page_count
            .map(|count| format!(", {count} pages"))
            .unwrap_or_default()
    );
    Ok(())
}
