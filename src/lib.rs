//! Client-side engine for a job-application tracker: derives each
//! application's composite display state from its follow-up and
//! interview sub-records, and keeps the in-memory collection in sync
//! with the remote backend through optimistic apply with rollback.

pub mod api;
pub mod config;
pub mod derive;
pub mod error;
pub mod followup;
pub mod interview;
pub mod model;
pub mod notify;
pub mod store;
pub mod temporal;
