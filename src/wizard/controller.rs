use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use log::{error, info};
use tokio::{sync::Mutex, time};

use crate::db::Database;
use crate::error::{DecodeError, GenerationError, TemplateError};
use crate::mapping::{ProjectField, VoltageField};
use crate::mirror::{self, MirrorStore};
use crate::models::{DocStatus, GeneratedDocument, PhotoSlot, SourceRecord};
use crate::photos;
use crate::render;
use crate::templates::{Counterparty, Region, TemplateRef, TemplateStore};

use super::gate;
use super::state::{DocKind, WizardSession, WizardStep};

pub const ATP_STATUS_FIELD: &str = "atp_status";
pub const BAST_STATUS_FIELD: &str = "bast_status";

const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);

fn status_field(kind: DocKind) -> &'static str {
    match kind {
        DocKind::Atp => ATP_STATUS_FIELD,
        DocKind::Bast => BAST_STATUS_FIELD,
    }
}

/// Drives one wizard session. The session value itself stays pure; this is
/// where the record store, template store and mirror are wired in, and the
/// only place `generate` side effects happen.
#[derive(Clone)]
pub struct WizardController {
    state: Arc<Mutex<WizardSession>>,
    db: Database,
    templates: Arc<dyn TemplateStore>,
    mirror: Arc<dyn MirrorStore>,
    in_flight: Arc<Mutex<bool>>,
    render_timeout: Duration,
}

impl WizardController {
    pub fn new(
        kind: DocKind,
        db: Database,
        templates: Arc<dyn TemplateStore>,
        mirror: Arc<dyn MirrorStore>,
    ) -> Result<Self> {
        photos::validate_catalog().context("photo slot catalog failed validation")?;

        Ok(Self {
            state: Arc::new(Mutex::new(WizardSession::new(kind))),
            db,
            templates,
            mirror,
            in_flight: Arc::new(Mutex::new(false)),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        })
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub async fn snapshot(&self) -> WizardSession {
        self.state.lock().await.clone()
    }

    pub async fn current_step(&self) -> WizardStep {
        self.state.lock().await.current_step()
    }

    /// Candidate records for step 1: those whose document status for this
    /// wizard's kind is still pending.
    pub async fn list_candidates(&self) -> Result<Vec<SourceRecord>> {
        let kind = self.state.lock().await.kind;
        self.db
            .fetch_candidates(status_field(kind), DocStatus::Pending)
            .await
    }

    pub async fn select_record(&self, record_id: &str) -> Result<()> {
        let record = self
            .db
            .get_record(record_id)
            .await?
            .with_context(|| format!("record '{record_id}' not found"))?;

        self.state.lock().await.select_record(record);
        Ok(())
    }

    pub async fn set_project_field(&self, field: ProjectField, value: String) {
        self.state.lock().await.set_project_field(field, value);
    }

    pub async fn set_voltage_field(&self, field: VoltageField, value: String) {
        self.state.lock().await.set_voltage_field(field, value);
    }

    pub async fn set_counterparty(&self, counterparty: Counterparty) {
        self.state.lock().await.set_counterparty(counterparty);
    }

    pub async fn set_region(&self, region: Region) {
        self.state.lock().await.set_region(region);
    }

    /// Decode happens off-lock on a blocking worker, so other fields stay
    /// editable while a large upload is processed. Returns the preview data
    /// URL for the slot thumbnail.
    pub async fn attach_photo(
        &self,
        slot: PhotoSlot,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<String, DecodeError> {
        let asset = photos::ingest_photo(slot, bytes, extension).await?;
        let preview = asset.preview.clone();
        self.state.lock().await.set_photo(asset);
        Ok(preview)
    }

    pub async fn remove_photo(&self, slot: PhotoSlot) -> bool {
        self.state.lock().await.remove_photo(slot)
    }

    pub async fn next(&self) -> bool {
        self.state.lock().await.next()
    }

    pub async fn previous(&self) -> bool {
        self.state.lock().await.previous()
    }

    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }

    /// Per-step gate results, re-derived for the review display.
    pub async fn gate_summary(&self) -> Vec<(WizardStep, bool)> {
        let session = self.state.lock().await;
        session
            .kind
            .steps()
            .iter()
            .map(|step| (*step, gate::step_complete(&session, *step)))
            .collect()
    }

    /// The terminal operation. Renders under a bounded timeout, hands the
    /// artifact back, and (ATP only) advances the record's workflow status
    /// afterwards. A render failure leaves the session untouched so the user
    /// can retry without re-entering anything.
    pub async fn generate(&self) -> Result<GeneratedDocument, GenerationError> {
        {
            let mut flag = self.in_flight.lock().await;
            if *flag {
                return Err(GenerationError::InFlight);
            }
            *flag = true;
        }

        let result = self.generate_inner().await;
        *self.in_flight.lock().await = false;
        result
    }

    async fn generate_inner(&self) -> Result<GeneratedDocument, GenerationError> {
        let session = self.state.lock().await.clone();

        if let Some(step) = gate::first_incomplete(&session) {
            return Err(GenerationError::Incomplete { step: step.name() });
        }

        let template = match session.kind {
            DocKind::Atp => TemplateRef::Atp,
            DocKind::Bast => {
                let (Some(counterparty), Some(region)) = (session.counterparty, session.region)
                else {
                    return Err(GenerationError::Incomplete {
                        step: WizardStep::SelectSite.name(),
                    });
                };
                TemplateRef::Bast(counterparty, region)
            }
        };

        let templates = self.templates.clone();
        let started = std::time::Instant::now();

        let render_session = session.clone();
        let render_fut = async move {
            let template_bytes =
                templates.load(&template).await.map_err(|err| match err {
                    TemplateError::NotFound { template_id } => {
                        GenerationError::TemplateNotFound { template_id }
                    }
                    other => GenerationError::Render(other.to_string()),
                })?;

            tokio::task::spawn_blocking(move || match render_session.kind {
                DocKind::Atp => render::render_atp(&render_session, template_bytes),
                DocKind::Bast => render::render_bast(&render_session, template_bytes),
            })
            .await
            .map_err(|err| GenerationError::Render(format!("render worker failed: {err}")))?
        };

        let document = match time::timeout(self.render_timeout, render_fut).await {
            Ok(result) => result?,
            Err(_) => return Err(GenerationError::Timeout(self.render_timeout)),
        };

        info!(
            "generated {} ({} bytes) in {:?}",
            document.filename,
            document.bytes.len(),
            started.elapsed()
        );

        // Document bytes are final from here on; nothing below can affect
        // what the user downloads.
        if session.kind == DocKind::Atp {
            if let Some(record) = &session.record {
                self.apply_atp_side_effect(&record.id).await;
            }
        }

        self.state.lock().await.generated = true;
        Ok(document)
    }

    async fn apply_atp_side_effect(&self, record_id: &str) {
        match self
            .db
            .update_status_field(record_id, ATP_STATUS_FIELD, DocStatus::Done)
            .await
        {
            Ok(()) => {
                mirror::spawn_propagate(
                    self.mirror.clone(),
                    record_id.to_string(),
                    vec![(
                        ATP_STATUS_FIELD.to_string(),
                        DocStatus::Done.as_str().to_string(),
                    )],
                );
            }
            Err(err) => {
                // Mirror propagation is skipped when the primary update
                // fails, so the mirror never gets ahead of the store.
                error!("failed to mark record {record_id} ATP-done: {err:#}");
            }
        }
    }
}
