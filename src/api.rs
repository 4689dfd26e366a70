//! Remote backend client.
//!
//! The backend is an API Platform style JSON-LD service: collection
//! reads are plain JSON, partial updates go through
//! `application/merge-patch+json`, and entity references are IRIs.
//! The `RemoteApi` trait is the seam the store depends on; tests plug
//! in scripted implementations.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::fmt;
use tracing::{info, warn};

use crate::model::{Application, FollowUp, Interview, InterviewOutcome, InterviewStatus, ResponseStatus};

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_applications(&self) -> Result<Vec<Application>>;

    async fn set_response_status(
        &self,
        application_iri: &str,
        status: ResponseStatus,
    ) -> Result<Application>;

    /// Returns the server's representation, whose completion timestamp
    /// is authoritative.
    async fn set_follow_up_completion(
        &self,
        follow_up_id: i64,
        done: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<FollowUp>;

    async fn create_interview(
        &self,
        application_iri: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Interview>;

    async fn update_interview(
        &self,
        interview_iri: &str,
        status: InterviewStatus,
        outcome: Option<InterviewOutcome>,
    ) -> Result<Interview>;

    async fn delete_interview(&self, interview_iri: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    pub fn new(base_url: Url, token: Option<String>) -> Self {
        let http = Client::builder()
            .user_agent("candisync/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid backend path: {path}"))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn expect_success(res: reqwest::Response) -> Result<reqwest::Response> {
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!("backend API error - status: {}, body: {}", status, body);
            return Err(anyhow!("backend error {status}: {body}"));
        }
        Ok(res)
    }

    async fn merge_patch<T: serde::de::DeserializeOwned>(
        &self,
        iri: &str,
        body: &Value,
    ) -> Result<T> {
        let url = self.endpoint(iri)?;
        info!(%url, "PATCH");
        let res = self
            .authorize(self.http.patch(url))
            .header("Content-Type", "application/merge-patch+json")
            .json(body)
            .send()
            .await
            .context("failed to reach backend")?;
        let res = Self::expect_success(res).await?;
        res.json().await.context("invalid backend response JSON")
    }
}

/// Body of the response-status merge patch.
pub fn status_patch_body(status: ResponseStatus) -> Value {
    json!({ "statutReponse": status.as_str() })
}

/// Body of the follow-up completion merge patch. An explicit `null`
/// clears the completion timestamp on undo (merge-patch semantics).
pub fn follow_up_patch_body(done: bool, completed_at: Option<DateTime<Utc>>) -> Value {
    json!({
        "faite": done,
        "dateRealisation": completed_at.map(|t| t.to_rfc3339()),
    })
}

/// Body of the interview creation request. New interviews always start
/// out scheduled with no outcome.
pub fn interview_create_body(application_iri: &str, date: NaiveDate, time: &str) -> Value {
    json!({
        "candidature": application_iri,
        "dateEntretien": date.format("%Y-%m-%d").to_string(),
        "heureEntretien": time,
        "statut": InterviewStatus::Scheduled.as_str(),
    })
}

/// Body of the interview status/outcome merge patch. Status and outcome
/// travel together so the transition is atomic on the server side.
pub fn interview_patch_body(status: InterviewStatus, outcome: Option<InterviewOutcome>) -> Value {
    json!({
        "statut": status.as_str(),
        "resultat": outcome.map(|o| o.as_str()),
    })
}

#[async_trait]
impl RemoteApi for BackendClient {
    async fn fetch_applications(&self) -> Result<Vec<Application>> {
        let url = self.endpoint("/api/candidatures")?;
        info!(%url, "GET");
        let res = self
            .authorize(self.http.get(url))
            .send()
            .await
            .context("failed to reach backend")?;
        let res = Self::expect_success(res).await?;
        res.json().await.context("invalid backend response JSON")
    }

    async fn set_response_status(
        &self,
        application_iri: &str,
        status: ResponseStatus,
    ) -> Result<Application> {
        self.merge_patch(application_iri, &status_patch_body(status))
            .await
    }

    async fn set_follow_up_completion(
        &self,
        follow_up_id: i64,
        done: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<FollowUp> {
        let iri = format!("/api/relances/{follow_up_id}");
        self.merge_patch(&iri, &follow_up_patch_body(done, completed_at))
            .await
    }

    async fn create_interview(
        &self,
        application_iri: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Interview> {
        let url = self.endpoint("/api/entretiens")?;
        info!(%url, "POST");
        let res = self
            .authorize(self.http.post(url))
            .header("Content-Type", "application/ld+json")
            .json(&interview_create_body(application_iri, date, time))
            .send()
            .await
            .context("failed to reach backend")?;
        let res = Self::expect_success(res).await?;
        res.json().await.context("invalid backend response JSON")
    }

    async fn update_interview(
        &self,
        interview_iri: &str,
        status: InterviewStatus,
        outcome: Option<InterviewOutcome>,
    ) -> Result<Interview> {
        self.merge_patch(interview_iri, &interview_patch_body(status, outcome))
            .await
    }

    async fn delete_interview(&self, interview_iri: &str) -> Result<()> {
        let url = self.endpoint(interview_iri)?;
        info!(%url, "DELETE");
        let res = self
            .authorize(self.http.delete(url))
            .send()
            .await
            .context("failed to reach backend")?;
        Self::expect_success(res).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_patch_body_uses_wire_value() {
        let body = status_patch_body(ResponseStatus::InDiscussion);
        assert_eq!(body["statutReponse"], "echanges");
    }

    #[test]
    fn follow_up_patch_clears_timestamp_on_undo() {
        let now = Utc::now();
        let done = follow_up_patch_body(true, Some(now));
        assert_eq!(done["faite"], true);
        assert_eq!(done["dateRealisation"], now.to_rfc3339());

        let undone = follow_up_patch_body(false, None);
        assert_eq!(undone["faite"], false);
        assert!(undone["dateRealisation"].is_null());
    }

    #[test]
    fn interview_create_body_is_always_scheduled() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let body = interview_create_body("/api/candidatures/110", date, "14:00");
        assert_eq!(body["candidature"], "/api/candidatures/110");
        assert_eq!(body["dateEntretien"], "2024-03-10");
        assert_eq!(body["heureEntretien"], "14:00");
        assert_eq!(body["statut"], "prevu");
    }

    #[test]
    fn interview_patch_body_carries_status_and_outcome_atomically() {
        let body = interview_patch_body(InterviewStatus::Held, Some(InterviewOutcome::Hired));
        assert_eq!(body["statut"], "passe");
        assert_eq!(body["resultat"], "engage");

        let held_pending = interview_patch_body(InterviewStatus::Held, None);
        assert!(held_pending["resultat"].is_null());
    }

    #[test]
    fn endpoint_joins_iri_against_base() {
        let client = BackendClient::new(Url::parse("http://localhost:8080/").unwrap(), None);
        let url = client.endpoint("/api/candidatures/110").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/candidatures/110");
    }
}
