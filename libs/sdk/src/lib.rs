//! # photon-sdk
//!
//! REST client for the Photon controller API.
//!
//! The [`Client`] wraps a reqwest client with bearer-token auth and typed
//! decoding of the controller's structured error bodies. Mutating calls
//! return a [`photon_api::Task`]; callers track it to a terminal state
//! through the [`Tasks`] seam (the controller-side `GET /tasks/{id}` fetch
//! and the blocking `/tasks/{id}/wait` endpoint).

mod client;
mod error;
mod tasks;

pub use client::Client;
pub use error::ApiClientError;
pub use tasks::Tasks;
