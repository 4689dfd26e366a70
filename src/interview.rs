//! Interview ("entretien") lifecycle queries and call-site validation.
//!
//! Lifecycle: `Scheduled` → `Held` (outcome optional, attached later)
//! or `Scheduled` → `Cancelled`. The mutating operations live in
//! `store`; this module owns the pure rules they rely on.

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::model::{Application, Interview, InterviewOutcome, InterviewStatus};

/// Sort key matching the backend's ordering contract: lexicographic on
/// the `date`/`time` pair, time as sent by the backend.
fn schedule_key(interview: &Interview) -> String {
    format!("{}T{}", interview.date, interview.time)
}

/// Earliest upcoming interview among those still `Scheduled`. Ties are
/// broken by first occurrence, so repeated calls pick the same record.
pub fn next_scheduled(app: &Application) -> Option<&Interview> {
    app.interviews
        .iter()
        .filter(|e| e.status == InterviewStatus::Scheduled)
        .min_by_key(|e| schedule_key(e))
}

pub fn scheduled_count(app: &Application) -> usize {
    app.interviews
        .iter()
        .filter(|e| e.status == InterviewStatus::Scheduled)
        .count()
}

pub fn has_scheduled(app: &Application) -> bool {
    scheduled_count(app) > 0
}

pub fn has_successful_interview(app: &Application) -> bool {
    app.interviews
        .iter()
        .any(|e| e.status == InterviewStatus::Held && e.outcome == Some(InterviewOutcome::Hired))
}

pub fn has_failed_interview(app: &Application) -> bool {
    app.interviews
        .iter()
        .any(|e| e.status == InterviewStatus::Held && e.outcome == Some(InterviewOutcome::Rejected))
}

/// Validate raw scheduling input before any optimistic apply or network
/// call. Empty date or time is rejected; the time string is kept as-is
/// because the backend accepts both `HH:mm` and `HH:mm:ss`.
pub fn validate_schedule(date: &str, time: &str) -> Result<(NaiveDate, String), EngineError> {
    if date.trim().is_empty() {
        return Err(EngineError::validation("date d'entretien manquante"));
    }
    if time.trim().is_empty() {
        return Err(EngineError::validation("heure d'entretien manquante"));
    }
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::validation(format!("date d'entretien invalide: {date}")))?;
    Ok((parsed, time.trim().to_string()))
}

/// An outcome is only meaningful for a held interview; submitting one
/// with any other status is a caller error, rejected before dispatch
/// rather than silently dropped.
pub fn validate_outcome(
    status: InterviewStatus,
    outcome: Option<InterviewOutcome>,
) -> Result<(), EngineError> {
    if outcome.is_some() && status != InterviewStatus::Held {
        return Err(EngineError::validation(format!(
            "un résultat ne peut être attaché qu'à un entretien passé (statut soumis: {})",
            status.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Company, ResponseStatus};
    use chrono::{TimeZone, Utc};

    fn interview(id: i64, date: &str, time: &str, status: InterviewStatus) -> Interview {
        Interview {
            iri: None,
            id,
            date: date.parse().unwrap(),
            time: time.into(),
            status,
            outcome: None,
        }
    }

    fn app(interviews: Vec<Interview>) -> Application {
        Application {
            iri: None,
            id: 1,
            job_title: "Dev".into(),
            applied_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
            last_follow_up_at: None,
            listing_url: None,
            external_offer_id: "x".into(),
            company: Company { name: "ACME".into() },
            response_status: ResponseStatus::Pending,
            follow_ups: vec![],
            interviews,
        }
    }

    #[test]
    fn next_scheduled_picks_earliest_date_time() {
        let app = app(vec![
            interview(1, "2024-03-10", "15:00", InterviewStatus::Scheduled),
            interview(2, "2024-03-10", "09:30", InterviewStatus::Scheduled),
            interview(3, "2024-03-05", "16:00", InterviewStatus::Held),
        ]);
        assert_eq!(next_scheduled(&app).map(|e| e.id), Some(2));
    }

    #[test]
    fn next_scheduled_tie_is_stable() {
        let app = app(vec![
            interview(7, "2024-03-10", "09:30", InterviewStatus::Scheduled),
            interview(8, "2024-03-10", "09:30", InterviewStatus::Scheduled),
        ]);
        assert_eq!(next_scheduled(&app).map(|e| e.id), Some(7));
        assert_eq!(next_scheduled(&app).map(|e| e.id), Some(7));
    }

    #[test]
    fn next_scheduled_none_when_all_held_or_cancelled() {
        let app = app(vec![
            interview(1, "2024-03-05", "16:00", InterviewStatus::Held),
            interview(2, "2024-03-06", "16:00", InterviewStatus::Cancelled),
        ]);
        assert!(next_scheduled(&app).is_none());
        assert_eq!(scheduled_count(&app), 0);
        assert!(!has_scheduled(&app));
    }

    #[test]
    fn outcome_queries_require_held_status() {
        let mut scheduled_with_outcome =
            interview(1, "2024-03-05", "16:00", InterviewStatus::Scheduled);
        scheduled_with_outcome.outcome = Some(InterviewOutcome::Hired);
        let app = app(vec![scheduled_with_outcome]);
        assert!(!has_successful_interview(&app));
        assert!(!has_failed_interview(&app));
    }

    #[test]
    fn schedule_validation() {
        assert!(validate_schedule("", "14:00").unwrap_err().is_validation());
        assert!(validate_schedule("2024-03-10", " ")
            .unwrap_err()
            .is_validation());
        assert!(validate_schedule("10/03/2024", "14:00")
            .unwrap_err()
            .is_validation());

        let (date, time) = validate_schedule("2024-03-10", "14:00").unwrap();
        assert_eq!(date.to_string(), "2024-03-10");
        assert_eq!(time, "14:00");
    }

    #[test]
    fn outcome_validation() {
        assert!(validate_outcome(InterviewStatus::Held, Some(InterviewOutcome::Hired)).is_ok());
        assert!(validate_outcome(InterviewStatus::Held, None).is_ok());
        assert!(
            validate_outcome(InterviewStatus::Scheduled, Some(InterviewOutcome::Rejected))
                .unwrap_err()
                .is_validation()
        );
        assert!(
            validate_outcome(InterviewStatus::Cancelled, Some(InterviewOutcome::Hired))
                .unwrap_err()
                .is_validation()
        );
    }
}
