//! Move-proposal service: wire types and HTTP client

mod client;
mod types;

pub use client::{MoveService, MoveServiceClient};
pub use types::*;
