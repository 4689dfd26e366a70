//! Canonical in-memory collection of applications and the optimistic
//! synchronization protocol applied to every mutation.
//!
//! Discipline, uniform across operations: snapshot the affected
//! application, apply the mutation locally, await the remote call, then
//! either merge the server's authoritative fields or restore the
//! snapshot exactly and notify. Lock guards are never held across an
//! `.await`.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::api::RemoteApi;
use crate::error::EngineError;
use crate::followup;
use crate::interview;
use crate::model::{Application, Interview, InterviewOutcome, InterviewStatus, ResponseStatus};
use crate::notify::{Notifier, Severity};

/// Placeholder id of an optimistically created interview, replaced by
/// the server-assigned id on reconciliation.
const PROVISIONAL_ID: i64 = 0;

/// Aggregate view over the collection, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    /// Applications (not follow-ups) with at least one overdue pending
    /// follow-up.
    pub pending_follow_ups: usize,
    /// Completed follow-ups summed across all applications.
    pub done_follow_ups: usize,
}

/// The single shared mutable resource of the engine. Constructed once
/// at startup and handed to consumers as `Arc<Store>`; UI code reads
/// projections and calls the mutation entry points, never touching the
/// collection directly.
pub struct Store {
    api: Arc<dyn RemoteApi>,
    notifier: Arc<dyn Notifier>,
    apps: RwLock<Vec<Application>>,
}

impl Store {
    pub fn new(api: Arc<dyn RemoteApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            apps: RwLock::new(Vec::new()),
        }
    }

    // Poisoning can only come from a panicking reader/writer; the data
    // itself is still the last consistent snapshot, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Application>> {
        self.apps.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Application>> {
        self.apps.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Read-only projection of the current collection.
    pub fn applications(&self) -> Vec<Application> {
        self.read().clone()
    }

    pub fn get(&self, application_id: i64) -> Option<Application> {
        self.read().iter().find(|a| a.id == application_id).cloned()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        let apps = self.read();
        Stats {
            total: apps.len(),
            pending_follow_ups: followup::count_pending_overdue(&apps, now),
            done_follow_ups: followup::count_done(&apps),
        }
    }

    /// Apply a patch to the application matching `id`. Silently a no-op
    /// when the id is unknown: the entity may have been removed by a
    /// concurrent operation.
    pub fn patch_by_id<F>(&self, id: i64, patch: F) -> bool
    where
        F: FnOnce(&mut Application),
    {
        let mut apps = self.write();
        match apps.iter_mut().find(|a| a.id == id) {
            Some(app) => {
                patch(app);
                true
            }
            None => false,
        }
    }

    fn snapshot(&self, id: i64) -> Option<Application> {
        self.read().iter().find(|a| a.id == id).cloned()
    }

    /// Restore a pre-mutation snapshot exactly. Reinserts the record if
    /// it disappeared from the collection in the meantime.
    fn restore(&self, snapshot: Application) {
        let mut apps = self.write();
        match apps.iter_mut().find(|a| a.id == snapshot.id) {
            Some(slot) => *slot = snapshot,
            None => apps.push(snapshot),
        }
    }

    /// Replace the whole collection from the backend. On failure the
    /// previous state is left untouched.
    #[instrument(skip_all)]
    pub async fn load(&self) -> Result<(), EngineError> {
        match self.api.fetch_applications().await {
            Ok(list) => {
                *self.write() = list;
                Ok(())
            }
            Err(err) => {
                warn!(?err, "failed to load applications");
                self.notifier
                    .notify("Erreur lors du chargement des candidatures", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }

    /// Set the manual response status. Submitting the currently-active
    /// value reverts to `attente` (tri-state toggle). Unknown status
    /// strings are rejected before any local or remote effect.
    #[instrument(skip_all)]
    pub async fn set_response_status(
        &self,
        application_id: i64,
        requested: &str,
    ) -> Result<(), EngineError> {
        let requested: ResponseStatus = requested.parse()?;

        let Some(snapshot) = self.snapshot(application_id) else {
            warn!(application_id, "status change on unknown application; ignoring");
            return Ok(());
        };

        let next = if snapshot.response_status == requested {
            ResponseStatus::Pending
        } else {
            requested
        };

        self.patch_by_id(application_id, |a| a.response_status = next);

        let iri = snapshot.iri_or_default();
        match self.api.set_response_status(&iri, next).await {
            Ok(server) => {
                // The server's status is authoritative; everything else
                // stays as derived locally.
                self.patch_by_id(application_id, |a| {
                    a.response_status = server.response_status;
                });
                self.notifier.notify("Statut mis à jour", Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                self.notifier
                    .notify("Erreur lors de la mise à jour du statut", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }

    /// Toggle a follow-up's completion flag. Symmetric: `done = false`
    /// undoes a completion and clears the completion timestamp.
    #[instrument(skip_all)]
    pub async fn toggle_follow_up(
        &self,
        application_id: i64,
        follow_up_id: i64,
        done: bool,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let Some(snapshot) = self.snapshot(application_id) else {
            warn!(application_id, "follow-up toggle on unknown application; ignoring");
            return Ok(());
        };
        if !snapshot.follow_ups.iter().any(|r| r.id == follow_up_id) {
            warn!(follow_up_id, "unknown follow-up; ignoring");
            return Ok(());
        }

        let completed_at = done.then_some(now);
        self.patch_by_id(application_id, |a| {
            if let Some(r) = a.follow_ups.iter_mut().find(|r| r.id == follow_up_id) {
                r.done = done;
                r.completed_at = completed_at;
            }
        });

        match self
            .api
            .set_follow_up_completion(follow_up_id, done, completed_at)
            .await
        {
            Ok(server) => {
                self.patch_by_id(application_id, |a| {
                    if let Some(r) = a.follow_ups.iter_mut().find(|r| r.id == follow_up_id) {
                        *r = server;
                    }
                });
                let message = if done {
                    "Relance marquée comme effectuée"
                } else {
                    "Relance annulée"
                };
                self.notifier.notify(message, Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                self.notifier
                    .notify("Erreur lors de la mise à jour de la relance", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }

    /// Schedule a new interview. A provisional record is inserted
    /// optimistically and swapped for the server's on success.
    #[instrument(skip_all)]
    pub async fn create_interview(
        &self,
        application_id: i64,
        date: &str,
        time: &str,
    ) -> Result<(), EngineError> {
        let (date, time) = interview::validate_schedule(date, time)?;

        let Some(snapshot) = self.snapshot(application_id) else {
            warn!(application_id, "interview creation on unknown application; ignoring");
            return Ok(());
        };

        self.patch_by_id(application_id, |a| {
            a.interviews.push(Interview {
                iri: None,
                id: PROVISIONAL_ID,
                date,
                time: time.clone(),
                status: InterviewStatus::Scheduled,
                outcome: None,
            });
        });

        let iri = snapshot.iri_or_default();
        match self.api.create_interview(&iri, date, &time).await {
            Ok(created) => {
                self.patch_by_id(application_id, |a| {
                    if let Some(slot) =
                        a.interviews.iter_mut().find(|e| e.id == PROVISIONAL_ID)
                    {
                        *slot = created;
                    }
                });
                self.notifier.notify("Entretien créé", Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                self.notifier
                    .notify("Erreur lors de la création de l'entretien", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }

    /// Update an interview's status, optionally attaching an outcome.
    /// Status and outcome travel together so the transition is atomic;
    /// an outcome with a non-held status is rejected up front.
    #[instrument(skip_all)]
    pub async fn update_interview(
        &self,
        application_id: i64,
        interview_id: i64,
        status: InterviewStatus,
        outcome: Option<InterviewOutcome>,
    ) -> Result<(), EngineError> {
        interview::validate_outcome(status, outcome)?;

        let Some(snapshot) = self.snapshot(application_id) else {
            warn!(application_id, "interview update on unknown application; ignoring");
            return Ok(());
        };
        let Some(target) = snapshot.interviews.iter().find(|e| e.id == interview_id) else {
            warn!(interview_id, "unknown interview; ignoring");
            return Ok(());
        };
        let iri = target.iri_or_default();

        self.patch_by_id(application_id, |a| {
            if let Some(e) = a.interviews.iter_mut().find(|e| e.id == interview_id) {
                e.status = status;
                e.outcome = outcome;
            }
        });

        match self.api.update_interview(&iri, status, outcome).await {
            Ok(server) => {
                self.patch_by_id(application_id, |a| {
                    if let Some(e) = a.interviews.iter_mut().find(|e| e.id == interview_id) {
                        *e = server;
                    }
                });
                self.notifier.notify("Entretien mis à jour", Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                self.notifier
                    .notify("Erreur lors de la mise à jour de l'entretien", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }

    /// Delete an interview. Local matching is by numeric id only; the
    /// IRI is rebuilt for the wire when the backend omitted `@id`.
    #[instrument(skip_all)]
    pub async fn delete_interview(
        &self,
        application_id: i64,
        interview_id: i64,
    ) -> Result<(), EngineError> {
        let Some(snapshot) = self.snapshot(application_id) else {
            warn!(application_id, "interview deletion on unknown application; ignoring");
            return Ok(());
        };
        let Some(target) = snapshot.interviews.iter().find(|e| e.id == interview_id) else {
            // Already gone, likely removed by a concurrent operation.
            return Ok(());
        };
        let iri = target.iri_or_default();

        self.patch_by_id(application_id, |a| {
            a.interviews.retain(|e| e.id != interview_id);
        });

        match self.api.delete_interview(&iri).await {
            Ok(()) => {
                self.notifier.notify("Entretien supprimé", Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                self.notifier
                    .notify("Erreur lors de la suppression de l'entretien", Severity::Error);
                Err(EngineError::Sync(err))
            }
        }
    }
}
