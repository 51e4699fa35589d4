//! Domain models read from the backend and the portal's own reply envelopes.

pub mod admin;
pub mod common;
pub mod customer;
pub mod replies;
pub mod scratch_card;
pub mod screenshot;

pub use admin::*;
pub use common::*;
pub use customer::*;
pub use replies::*;
pub use scratch_card::*;
pub use screenshot::*;
