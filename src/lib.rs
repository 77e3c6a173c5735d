//! Paired-credential issuance and rotation service.
//!
//! Hands out a short-lived signed access token together with a single-use
//! opaque refresh secret, both bound to the requesting device's fingerprint
//! (origin IP + user-agent). The rotation protocol lives in [`service`];
//! everything else is glue around it.

pub mod domain;
pub mod error;
pub mod infra;
pub mod routes;
pub mod security;
pub mod service;
pub mod state;
