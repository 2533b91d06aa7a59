//! Integration tests for Marquee
//!
//! These tests drive the real OMDb client and HTTP poster validator against
//! mock upstream servers, plus workspace-wide style checks.

#[path = "style.rs"]
mod style;

#[path = "integration/pipeline_scenarios.rs"]
mod pipeline_scenarios;
