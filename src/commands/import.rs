use std::io::{BufRead, Write};

use crate::{
    commands::ImportArgs,
    core::{
        errors::{AppError, AppResult},
        types::{ImportPreview, ImportReport},
    },
    providers::strapi::StrapiClient,
    workflow::{clipboard::FileClipboard, entry_host::EntryHost, orchestrator::TransferOrchestrator},
};

const PREVIEW_LIMIT: usize = 2000;

fn confirm(prompt: &str) -> AppResult<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn preview_excerpt(raw: &str) -> &str {
    match raw.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => &raw[..cut],
        None => raw,
    }
}

fn print_report(report: &ImportReport) {
    println!("Imported {} field(s).", report.fields_written.len());
    for failure in &report.fields_failed {
        println!("  skipped {}: {}", failure.field, failure.message);
    }
    if !report.unresolved.is_empty() {
        println!(
            "There are {} page relations that require human intervention:",
            report.unresolved.len()
        );
        for relation in &report.unresolved {
            println!("  {}", relation.describe());
        }
    }
}

pub async fn import_entry(args: ImportArgs) -> AppResult<()> {
    let transfer = &args.transfer;
    let config = transfer.connection.config()?;
    let token = transfer.connection.token()?;
    let clipboard = FileClipboard::new(transfer.clipboard_path(&config));
    let status_timeout = config.status_timeout;
    let client = StrapiClient::new(config, token)?;
    let host = EntryHost::new(&client, transfer.uid.as_str(), transfer.id.as_str())
        .with_allowed_fields(args.fields.clone());

    let orchestrator = TransferOrchestrator::new(&host, &clipboard, &client, &client)
        .with_options(transfer.options())
        .with_status_timeout(status_timeout);

    match orchestrator.request_import().await? {
        ImportPreview::AccessNeeded { message } => {
            orchestrator.cancel_import()?;
            return Err(AppError::ClipboardUnavailable(message));
        }
        ImportPreview::Contents { raw } => {
            if !args.yes {
                println!("{}", preview_excerpt(&raw));
                if !confirm("Are you sure you want to import this?")? {
                    orchestrator.cancel_import()?;
                    println!("Import cancelled.");
                    return Ok(());
                }
            }
        }
    }

    let report = orchestrator.confirm_import().await?;
    host.save().await?;
    print_report(&report);

    if args.publish {
        orchestrator.publish().await?;
        println!("Entry published.");
    }
    if let Some(banner) = orchestrator.status()?.banner() {
        println!("{banner}");
    }
    Ok(())
}
