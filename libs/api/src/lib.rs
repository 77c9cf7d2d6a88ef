//! # photon-api
//!
//! Wire data model for the Photon controller REST API.
//!
//! ## Design Principles
//!
//! - The controller owns every record; the client never mutates a resource,
//!   it only re-fetches it
//! - Task and step states are server-defined strings; unknown states must
//!   deserialize cleanly and are treated as non-terminal
//! - Mutating operations return a [`Task`] that the client tracks to a
//!   terminal state

mod model;
mod task;

pub use model::*;
pub use task::*;
