//! Shared test utilities for consul-search integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

#![allow(dead_code)]

pub mod assertions;
pub mod fake_consul_api;
pub mod fixtures;

pub use fake_consul_api::FakeConsulApi;
pub use fixtures::*;
