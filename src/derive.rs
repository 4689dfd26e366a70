//! Composite display state of an application.
//!
//! Reconciles the manually-set response status with the interview
//! collection into one human-readable lifecycle state. Pure and
//! side-effect-free: consumers re-derive on every render instead of
//! caching the result.

use std::fmt;

use chrono::NaiveDate;

use crate::interview::next_scheduled;
use crate::model::{Application, InterviewOutcome, InterviewStatus, ResponseStatus};
use crate::temporal::{format_display_date, format_display_time};

/// The derived lifecycle state. `Display` renders the French UI strings
/// the backend's front-end contract expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// No interviews, manual status `negative`.
    Refused,
    /// No interviews, manual status `echanges`.
    InDiscussion,
    /// No interviews, manual status `engage`.
    Hired,
    /// No interviews, manual status `attente` (or unset).
    AwaitingReply,
    /// At least one interview still scheduled; earliest wins.
    InterviewScheduled { date: NaiveDate, time: String },
    /// No scheduled rounds left, a held interview succeeded.
    InterviewSuccessful,
    /// No scheduled rounds left, a held interview was rejected.
    InterviewRejected,
    /// Held interview(s) with no outcome recorded yet.
    InterviewAwaitingResult,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::Refused => write!(f, "Refusé"),
            DisplayState::InDiscussion => write!(f, "Échanges en cours"),
            DisplayState::Hired => write!(f, "Engagé"),
            DisplayState::AwaitingReply => write!(f, "En attente de retour"),
            DisplayState::InterviewScheduled { date, time } => write!(
                f,
                "Entretien prévu le {} à {}",
                format_display_date(Some(*date)),
                format_display_time(time)
            ),
            DisplayState::InterviewSuccessful => write!(f, "Entretien réussi"),
            DisplayState::InterviewRejected => write!(f, "Entretien refusé"),
            DisplayState::InterviewAwaitingResult => {
                write!(f, "Entretien passé – en attente de retour")
            }
        }
    }
}

/// Derive the display state of one application.
///
/// Precedence: a scheduled interview always wins (a new round
/// supersedes any past result), then held outcomes (success before
/// rejection), then held-awaiting-result. Cancelled interviews are
/// ignored entirely; with no interviews at all the manual response
/// status maps directly.
pub fn display_state(app: &Application) -> DisplayState {
    if app.interviews.is_empty() {
        return match app.response_status {
            ResponseStatus::Rejected => DisplayState::Refused,
            ResponseStatus::InDiscussion => DisplayState::InDiscussion,
            ResponseStatus::Hired => DisplayState::Hired,
            ResponseStatus::Pending => DisplayState::AwaitingReply,
        };
    }

    if let Some(next) = next_scheduled(app) {
        return DisplayState::InterviewScheduled {
            date: next.date,
            time: next.time.clone(),
        };
    }

    let held: Vec<_> = app
        .interviews
        .iter()
        .filter(|e| e.status == InterviewStatus::Held)
        .collect();

    if held.iter().any(|e| e.outcome == Some(InterviewOutcome::Hired)) {
        return DisplayState::InterviewSuccessful;
    }
    if held
        .iter()
        .any(|e| e.outcome == Some(InterviewOutcome::Rejected))
    {
        return DisplayState::InterviewRejected;
    }
    DisplayState::InterviewAwaitingResult
}
