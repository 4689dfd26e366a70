use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Manual response status of an application, as set by the user or the
/// backend. Wire values are the French enumeration of the backend API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponseStatus {
    #[default]
    #[serde(rename = "attente")]
    Pending,
    #[serde(rename = "echanges")]
    InDiscussion,
    #[serde(rename = "negative")]
    Rejected,
    #[serde(rename = "engage")]
    Hired,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Pending => "attente",
            ResponseStatus::InDiscussion => "echanges",
            ResponseStatus::Rejected => "negative",
            ResponseStatus::Hired => "engage",
        }
    }
}

impl FromStr for ResponseStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attente" => Ok(ResponseStatus::Pending),
            "echanges" => Ok(ResponseStatus::InDiscussion),
            "negative" => Ok(ResponseStatus::Rejected),
            "engage" => Ok(ResponseStatus::Hired),
            other => Err(EngineError::validation(format!(
                "statut non autorisé: {other}. Autorisés: attente, echanges, negative, engage"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InterviewStatus {
    #[serde(rename = "prevu")]
    Scheduled,
    #[serde(rename = "passe")]
    Held,
    #[serde(rename = "annule")]
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "prevu",
            InterviewStatus::Held => "passe",
            InterviewStatus::Cancelled => "annule",
        }
    }
}

/// Outcome of a held interview. Older backend revisions emitted
/// `positive` where current ones emit `engage`; both deserialize to
/// `Hired` but only `engage` is ever written back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InterviewOutcome {
    #[serde(rename = "engage", alias = "positive")]
    Hired,
    #[serde(rename = "negative")]
    Rejected,
}

impl InterviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewOutcome::Hired => "engage",
            InterviewOutcome::Rejected => "negative",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    #[serde(rename = "nom")]
    pub name: String,
}

/// A scheduled or completed follow-up reminder ("relance").
///
/// Invariant: `completed_at` is `Some` iff `done` is true. The store
/// maintains this on toggle; the server's representation is taken as
/// authoritative on reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUp {
    pub id: i64,
    #[serde(rename = "rang")]
    pub rank: u32,
    #[serde(rename = "dateRelance")]
    pub scheduled_on: NaiveDate,
    #[serde(rename = "faite")]
    pub done: bool,
    #[serde(
        rename = "dateRealisation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

/// An interview round ("entretien") tied to one application.
///
/// `outcome` is only meaningful once `status` is `Held`; held with no
/// outcome yet means the result is still awaited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interview {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    pub id: i64,
    #[serde(rename = "dateEntretien")]
    pub date: NaiveDate,
    #[serde(rename = "heureEntretien")]
    pub time: String,
    #[serde(rename = "statut")]
    pub status: InterviewStatus,
    #[serde(rename = "resultat", default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<InterviewOutcome>,
}

impl Interview {
    /// Canonical IRI, rebuilt from the numeric id when the backend
    /// omitted `@id`. Matching of local records always goes through the
    /// numeric id; the IRI is only used on the wire.
    pub fn iri_or_default(&self) -> String {
        self.iri
            .clone()
            .unwrap_or_else(|| format!("/api/entretiens/{}", self.id))
    }
}

/// One job application ("candidature") with its follow-up and interview
/// sub-collections. The manual response status and the sub-collections
/// coexist; `derive::display_state` reconciles them for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    pub id: i64,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    #[serde(rename = "dateCandidature")]
    pub applied_at: DateTime<Utc>,
    #[serde(rename = "dateDerniereRelance", default)]
    pub last_follow_up_at: Option<DateTime<Utc>>,
    #[serde(rename = "lienAnnonce", default)]
    pub listing_url: Option<String>,
    #[serde(rename = "externalOfferId")]
    pub external_offer_id: String,
    #[serde(rename = "entreprise")]
    pub company: Company,
    #[serde(rename = "statutReponse", default)]
    pub response_status: ResponseStatus,
    #[serde(rename = "relances", default)]
    pub follow_ups: Vec<FollowUp>,
    #[serde(rename = "entretiens", default)]
    pub interviews: Vec<Interview>,
}

impl Application {
    pub fn iri_or_default(&self) -> String {
        self.iri
            .clone()
            .unwrap_or_else(|| format!("/api/candidatures/{}", self.id))
    }
}

/// Extract the numeric id from an IRI like `/api/candidatures/110`.
/// References arrive inconsistently (full resource path or bare id);
/// this normalizes them at the boundary so core logic only ever sees
/// numeric ids.
pub fn id_from_iri(iri: &str) -> Option<i64> {
    iri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|seg| seg.parse().ok())
}
