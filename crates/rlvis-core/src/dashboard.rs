//! Interaction-level orchestration: upload, open, remove, and render.
//!
//! A [`Session`] carries the per-user context (owner and the run currently on
//! screen) and is passed explicitly into every call.

use serde::Serialize;
use tracing::Instrument;

use rlvis_state::{OwnerId, RunId, RunListing, RunStore};

use crate::analysis::downsample::downsample;
use crate::analysis::kpi::{compute_kpis, FileKpis};
use crate::archive::RunArchive;
use crate::chart::{confidence_chart, reward_chart, ChartRenderer};
use crate::domain::error::{Result, ValidationError};
use crate::domain::params::ViewParams;
use crate::domain::run::{Run, SavedRun, UNTITLED_RUN};
use crate::ingest::{ingest_files, UploadedFile};
use crate::obs;

/// The run currently shown in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRun {
    pub run_id: RunId,
    pub run: Run,
}

/// Per-user interaction context.
#[derive(Debug, Clone)]
pub struct Session {
    pub owner: OwnerId,
    pub current: Option<ActiveRun>,
}

impl Session {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            current: None,
        }
    }

    /// Heading for the current view.
    pub fn current_name(&self) -> &str {
        self.current
            .as_ref()
            .map(|active| active.run.name.as_str())
            .unwrap_or(UNTITLED_RUN)
    }
}

/// Everything a rendered dashboard shows besides the charts themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub run_name: String,
    pub kpis: Vec<FileKpis>,
    pub displayed_points: usize,
    pub total_points: usize,
}

impl DashboardView {
    /// "Displaying N of M total data points" line.
    pub fn summary(&self) -> String {
        format!(
            "Displaying {} of {} total data points for charts.",
            self.displayed_points, self.total_points
        )
    }
}

pub struct Dashboard<S> {
    archive: RunArchive<S>,
}

impl<S> Dashboard<S>
where
    S: RunStore,
{
    pub fn new(store: S) -> Self {
        Self {
            archive: RunArchive::new(store),
        }
    }

    pub fn archive(&self) -> &RunArchive<S> {
        &self.archive
    }

    /// Ingest `files` as a new run named `name`, persist it, and make it current.
    ///
    /// Validation happens before anything is written: a bad file or a blank
    /// name leaves both the store and the session unchanged.
    pub async fn upload(
        &self,
        session: &mut Session,
        name: &str,
        files: &[UploadedFile],
    ) -> Result<RunId> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyRunName.into());
        }
        let records = ingest_files(files)?;
        let run = Run::new(name, records);
        let run_id = self.archive.save(&session.owner, &run).await?;

        session.current = Some(ActiveRun {
            run_id: run_id.clone(),
            run,
        });
        Ok(run_id)
    }

    pub async fn runs(&self, session: &Session) -> Result<Vec<RunListing>> {
        self.archive.list(&session.owner).await
    }

    /// Load a saved run and make it current.
    pub async fn open(&self, session: &mut Session, run_id: &RunId) -> Result<SavedRun> {
        let saved = self
            .archive
            .load(run_id)
            .instrument(obs::run_span(run_id.as_str()))
            .await?;
        session.current = Some(ActiveRun {
            run_id: saved.run_id.clone(),
            run: saved.run.clone(),
        });
        Ok(saved)
    }

    /// Delete a run; clears the session's current run if it was this one.
    pub async fn remove(&self, session: &mut Session, run_id: &RunId) -> Result<()> {
        self.archive
            .delete(run_id)
            .instrument(obs::run_span(run_id.as_str()))
            .await?;
        if session
            .current
            .as_ref()
            .is_some_and(|active| &active.run_id == run_id)
        {
            session.current = None;
        }
        Ok(())
    }
}

/// Build KPIs and both charts for `run` and hand the charts to `renderer`.
///
/// KPIs come from the full record set; the charts use the downsampled view.
/// The reward chart is skipped when the sample holds no rewards.
pub fn render_view(
    run: &Run,
    params: &ViewParams,
    renderer: &mut dyn ChartRenderer,
) -> Result<DashboardView> {
    let kpis = compute_kpis(&run.records);
    let sampled = downsample(&run.records, params.sample_rate);

    let rewards = reward_chart(&sampled, params.smoothing());
    if !rewards.is_empty() {
        renderer.render(&rewards)?;
    }
    renderer.render(&confidence_chart(&sampled))?;

    let view = DashboardView {
        run_name: run.name.clone(),
        kpis,
        displayed_points: sampled.len(),
        total_points: run.len(),
    };
    obs::emit_view_rendered(
        &view.run_name,
        view.displayed_points,
        view.total_points,
        params.smooth_rewards,
    );
    Ok(view)
}
