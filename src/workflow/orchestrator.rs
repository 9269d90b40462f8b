use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::{
    config::DEFAULT_STATUS_TIMEOUT_MS,
    errors::{AppError, AppResult},
    types::{
        ExportPayload, ExportReport, FieldFailure, ImportPreview, ImportReport, OperationStatus,
        PageRecord, PathSegment, TransferOptions, UnresolvedRelation,
    },
};
use crate::providers::{AssetBackend, PageDirectory};
use crate::reconcile::{
    assets::AssetResolver,
    relations::RelationResolver,
    walker::DocumentWalker,
};
use crate::workflow::{
    host::{updatable_top_level_keys, Clipboard, FormHost},
    status::StatusBoard,
};

const ACCESS_NEEDED: &str = "You must allow clipboard access first";

/// Drives export and import for one editor. At most one operation runs at a
/// time; a trigger arriving while one is in flight is refused with `Busy`.
pub struct TransferOrchestrator<'h> {
    host: &'h dyn FormHost,
    clipboard: &'h dyn Clipboard,
    pages: &'h dyn PageDirectory,
    assets: &'h dyn AssetBackend,
    options: Mutex<TransferOptions>,
    board: Mutex<StatusBoard>,
    pending: Mutex<Option<String>>,
    unresolved: Mutex<Vec<UnresolvedRelation>>,
}

fn locked<T>(mutex: &Mutex<T>) -> AppResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("orchestrator state lock poisoned".to_string()))
}

impl<'h> TransferOrchestrator<'h> {
    pub fn new(
        host: &'h dyn FormHost,
        clipboard: &'h dyn Clipboard,
        pages: &'h dyn PageDirectory,
        assets: &'h dyn AssetBackend,
    ) -> Self {
        Self {
            host,
            clipboard,
            pages,
            assets,
            options: Mutex::new(TransferOptions::default()),
            board: Mutex::new(StatusBoard::new(Duration::from_millis(
                DEFAULT_STATUS_TIMEOUT_MS,
            ))),
            pending: Mutex::new(None),
            unresolved: Mutex::new(vec![]),
        }
    }

    pub fn with_options(self, options: TransferOptions) -> Self {
        if let Ok(mut guard) = self.options.lock() {
            *guard = options;
        }
        self
    }

    pub fn with_status_timeout(self, timeout: Duration) -> Self {
        if let Ok(mut guard) = self.board.lock() {
            *guard = StatusBoard::new(timeout);
        }
        self
    }

    pub fn options(&self) -> AppResult<TransferOptions> {
        Ok(*locked(&self.options)?)
    }

    pub fn status(&self) -> AppResult<OperationStatus> {
        Ok(locked(&self.board)?.current())
    }

    /// Relations from the last import that still need a human decision.
    pub fn unresolved_relations(&self) -> AppResult<Vec<UnresolvedRelation>> {
        Ok(locked(&self.unresolved)?.clone())
    }

    fn begin(&self) -> AppResult<()> {
        if locked(&self.board)?.try_begin() {
            Ok(())
        } else {
            Err(AppError::Busy)
        }
    }

    fn finish<T>(&self, outcome: &AppResult<T>) -> AppResult<()> {
        let status = match outcome {
            Ok(_) => OperationStatus::Success,
            Err(err) => {
                error!(code = err.code(), error = %err, "operation failed");
                OperationStatus::Error
            }
        };
        locked(&self.board)?.set(status);
        Ok(())
    }

    pub async fn export(&self) -> AppResult<ExportReport> {
        self.begin()?;
        let outcome = self.run_export().await;
        self.finish(&outcome)?;
        outcome
    }

    async fn run_export(&self) -> AppResult<ExportReport> {
        info!("exporting to clipboard");
        let options = self.options()?;
        let form_data = self.host.snapshot().await?;
        let pages = if options.match_page_relations {
            self.fetch_pages_or_none(locale_of(&form_data)).await
        } else {
            None
        };
        let page_count = pages.as_ref().map(Vec::len);
        let payload = ExportPayload { form_data, pages };
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|err| AppError::Internal(err.to_string()))?;
        self.clipboard.write_text(&text).await?;
        info!(bytes = text.len(), "export successful");
        Ok(ExportReport {
            bytes_written: text.len(),
            page_count,
        })
    }

    /// Reads the clipboard for the confirmation step. Denied or empty access
    /// is reported in the preview rather than as an error.
    pub async fn request_import(&self) -> AppResult<ImportPreview> {
        if self.status()? == OperationStatus::InProgress {
            return Err(AppError::Busy);
        }
        let preview = match self.clipboard.read_text().await {
            Ok(text) if !text.trim().is_empty() => {
                *locked(&self.pending)? = Some(text.clone());
                ImportPreview::Contents { raw: text }
            }
            Ok(_) => {
                *locked(&self.pending)? = None;
                ImportPreview::AccessNeeded {
                    message: ACCESS_NEEDED.to_string(),
                }
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "clipboard read failed");
                *locked(&self.pending)? = None;
                ImportPreview::AccessNeeded {
                    message: ACCESS_NEEDED.to_string(),
                }
            }
        };
        locked(&self.board)?.set(OperationStatus::ConfirmPending);
        Ok(preview)
    }

    pub fn cancel_import(&self) -> AppResult<()> {
        *locked(&self.pending)? = None;
        let mut board = locked(&self.board)?;
        if board.current() == OperationStatus::ConfirmPending {
            board.set(OperationStatus::Idle);
        }
        Ok(())
    }

    pub async fn confirm_import(&self) -> AppResult<ImportReport> {
        if self.status()? != OperationStatus::ConfirmPending {
            return Err(AppError::InvalidInput(
                "no import is awaiting confirmation".to_string(),
            ));
        }
        let raw = locked(&self.pending)?.take().ok_or_else(|| {
            AppError::ClipboardUnavailable(ACCESS_NEEDED.to_string())
        })?;
        self.begin()?;
        let outcome = self.run_import(&raw).await;
        self.finish(&outcome)?;
        outcome
    }

    async fn run_import(&self, raw: &str) -> AppResult<ImportReport> {
        info!("importing from clipboard");
        let options = self.options()?;
        locked(&self.unresolved)?.clear();

        let payload: ExportPayload = serde_json::from_str(raw)?;
        let document = payload.form_data.as_object().ok_or_else(|| {
            AppError::InvalidPayload("formData must be an object".to_string())
        })?;

        let current = self.host.snapshot().await?;
        check_locale(&payload.form_data, &current)?;

        let inventory = if options.reuse_existing_assets {
            match self.assets.list_assets().await {
                Ok(assets) => {
                    info!(count = assets.len(), "fetched existing assets");
                    Some(assets)
                }
                Err(err) => {
                    warn!(code = err.code(), error = %err, "failed to fetch existing assets");
                    None
                }
            }
        } else {
            None
        };

        let (source_pages, destination_pages): (Option<Vec<PageRecord>>, Option<Vec<PageRecord>>) =
            if options.match_page_relations {
                let destination = self.fetch_pages_or_none(locale_of(&payload.form_data)).await;
                (payload.pages.clone(), destination)
            } else {
                (None, None)
            };

        let allowed = updatable_top_level_keys(&self.host.updatable_fields().await?);
        info!(keys = ?allowed, "updatable top level keys");

        let walker = DocumentWalker::new(
            AssetResolver::new(self.assets, inventory.as_deref()),
            RelationResolver::new(
                options.match_page_relations,
                source_pages.as_deref(),
                destination_pages.as_deref(),
            ),
        );

        // Each field is written as soon as its own walk settles, so a stalled
        // asset fetch only holds back the field that references it.
        let outcomes = join_all(
            document
                .iter()
                .filter(|(key, _)| allowed.iter().any(|allowed_key| allowed_key == *key))
                .map(|(key, value)| self.import_field(&walker, key, value)),
        )
        .await;

        let mut fields_written = vec![];
        let mut fields_failed = vec![];
        for outcome in outcomes {
            match outcome? {
                Ok(key) => fields_written.push(key),
                Err(failure) => fields_failed.push(failure),
            }
        }

        if let Err(err) = self.host.trigger_validation().await {
            warn!(code = err.code(), error = %err, "form validation could not be triggered");
        }

        let unresolved = self.unresolved_relations()?;
        if !unresolved.is_empty() {
            warn!(
                count = unresolved.len(),
                "page relations need to be set manually"
            );
        }
        info!("import done");
        Ok(ImportReport {
            fields_written,
            fields_failed,
            unresolved,
            finished_at: Utc::now(),
        })
    }

    async fn import_field(
        &self,
        walker: &DocumentWalker<'_>,
        key: &str,
        value: &Value,
    ) -> AppResult<Result<String, FieldFailure>> {
        let outcome = walker
            .transform(value, vec![PathSegment::Key(key.to_string())])
            .await;
        match self.host.write_field(key, outcome.value).await {
            Ok(()) => {
                info!(field = %key, "imported field");
                self.record_unresolved(outcome.unresolved)?;
                Ok(Ok(key.to_string()))
            }
            Err(err) => {
                warn!(field = %key, code = err.code(), error = %err, "import error");
                Ok(Err(FieldFailure {
                    field: key.to_string(),
                    code: err.code().to_string(),
                    message: err.to_string(),
                }))
            }
        }
    }

    /// Publishes through the host once no relation awaits manual resolution.
    pub async fn publish(&self) -> AppResult<()> {
        let pending = locked(&self.unresolved)?.len();
        if pending > 0 {
            return Err(AppError::InvalidInput(format!(
                "{pending} page relations require human intervention before publishing"
            )));
        }
        self.host.publish().await
    }

    fn record_unresolved(&self, found: Vec<UnresolvedRelation>) -> AppResult<()> {
        let mut list = locked(&self.unresolved)?;
        for relation in found {
            if !list.iter().any(|known| known.path == relation.path) {
                list.push(relation);
            }
        }
        Ok(())
    }

    async fn fetch_pages_or_none(&self, locale: Option<&str>) -> Option<Vec<PageRecord>> {
        match self.pages.fetch_pages(locale).await {
            Ok(pages) => Some(pages),
            Err(err) => {
                warn!(
                    code = err.code(),
                    error = %err,
                    "could not fetch the list of pages, link relation matching unavailable"
                );
                None
            }
        }
    }
}

fn locale_of(document: &Value) -> Option<&str> {
    document
        .get("locale")
        .and_then(Value::as_str)
        .filter(|locale| !locale.is_empty())
}

/// Both sides must name a locale for a mismatch to be reported.
pub fn check_locale(document: &Value, current: &Value) -> AppResult<()> {
    match (locale_of(document), locale_of(current)) {
        (Some(source), Some(destination)) if source != destination => {
            Err(AppError::LocaleMismatch {
                source_locale: source.to_string(),
                destination_locale: destination.to_string(),
            })
        }
        _ => Ok(()),
    }
}
