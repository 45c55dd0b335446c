//! Scenario-driven test selection, ordering, and fixture binding for a host
//! test runner.
//!
//! Tests are either declared inline on each test function or selected by a
//! named scenario document under `sut/scenarios/`. A [`session::Session`]
//! drives the host's life-cycle hooks; the host supplies discovery and
//! dependency injection through [`host::FixtureHost`].
pub mod bindings;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod local_host;
pub mod order;
pub mod paths;
pub mod scenarios;
pub mod session;

pub use error::ScenarioError;
