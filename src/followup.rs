//! Follow-up ("relance") progress and aggregate views.
//!
//! Everything here is a pure read over the in-memory collection; the
//! toggle operation itself lives in `store` because it goes through the
//! optimistic sync protocol.

use chrono::{DateTime, Utc};

use crate::model::{Application, FollowUp};
use crate::temporal::is_overdue;

/// Completion percentage of an application's follow-ups, rounded to the
/// nearest integer. Empty collection counts as 0.
pub fn progress(app: &Application) -> u8 {
    if app.follow_ups.is_empty() {
        return 0;
    }
    let done = app.follow_ups.iter().filter(|r| r.done).count();
    (100.0 * done as f64 / app.follow_ups.len() as f64).round() as u8
}

/// True when at least one follow-up is pending and past due.
pub fn has_pending_overdue(app: &Application, now: DateTime<Utc>) -> bool {
    app.follow_ups.iter().any(|r| !r.done && is_overdue(r, now))
}

/// Lookup by rank (1 = first follow-up). Rank is unique per
/// application but the storage order is not guaranteed chronological.
pub fn follow_up_by_rank(app: &Application, rank: u32) -> Option<&FollowUp> {
    app.follow_ups.iter().find(|r| r.rank == rank)
}

/// Total completed follow-ups across all applications.
pub fn count_done(apps: &[Application]) -> usize {
    apps.iter()
        .map(|c| c.follow_ups.iter().filter(|r| r.done).count())
        .sum()
}

/// Number of applications (not follow-ups) carrying at least one
/// pending-overdue follow-up.
pub fn count_pending_overdue(apps: &[Application], now: DateTime<Utc>) -> usize {
    apps.iter().filter(|c| has_pending_overdue(c, now)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Company, ResponseStatus};
    use chrono::{NaiveDate, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn app_with_follow_ups(follow_ups: Vec<FollowUp>) -> Application {
        Application {
            iri: None,
            id: 1,
            job_title: "Dev".into(),
            applied_at: fixed_now(),
            last_follow_up_at: None,
            listing_url: None,
            external_offer_id: "x".into(),
            company: Company { name: "ACME".into() },
            response_status: ResponseStatus::Pending,
            follow_ups,
            interviews: vec![],
        }
    }

    fn follow_up(id: i64, rank: u32, day: u32, done: bool) -> FollowUp {
        FollowUp {
            id,
            rank,
            scheduled_on: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            done,
            completed_at: None,
        }
    }

    #[test]
    fn progress_empty_is_zero() {
        assert_eq!(progress(&app_with_follow_ups(vec![])), 0);
    }

    #[test]
    fn progress_half_and_full() {
        let half = app_with_follow_ups(vec![follow_up(1, 1, 1, true), follow_up(2, 2, 8, false)]);
        assert_eq!(progress(&half), 50);

        let full = app_with_follow_ups(vec![follow_up(1, 1, 1, true), follow_up(2, 2, 8, true)]);
        assert_eq!(progress(&full), 100);
    }

    #[test]
    fn progress_monotonic_as_follow_ups_complete() {
        let mut app = app_with_follow_ups(vec![
            follow_up(1, 1, 1, false),
            follow_up(2, 2, 8, false),
            follow_up(3, 3, 22, false),
        ]);
        let mut last = progress(&app);
        for i in 0..app.follow_ups.len() {
            app.follow_ups[i].done = true;
            let next = progress(&app);
            assert!(next >= last);
            last = next;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn aggregates_count_apps_and_follow_ups() {
        let a = app_with_follow_ups(vec![follow_up(1, 1, 1, true), follow_up(2, 2, 1, false)]);
        let b = app_with_follow_ups(vec![follow_up(3, 1, 1, true)]);
        // Future follow-up only: pending but not overdue.
        let c = app_with_follow_ups(vec![follow_up(4, 1, 30, false)]);

        let apps = vec![a, b, c];
        assert_eq!(count_done(&apps), 2);
        assert_eq!(count_pending_overdue(&apps, fixed_now()), 1);
    }

    #[test]
    fn lookup_by_rank() {
        let app = app_with_follow_ups(vec![follow_up(9, 2, 8, false), follow_up(8, 1, 1, true)]);
        assert_eq!(follow_up_by_rank(&app, 1).map(|r| r.id), Some(8));
        assert_eq!(follow_up_by_rank(&app, 3).map(|r| r.id), None);
    }
}
