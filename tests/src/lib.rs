//! Shared helpers for the harvester integration tests.

pub mod fixtures;
pub mod mocks;
