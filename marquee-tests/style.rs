//! Style Enforcement Tests
//!
//! These tests scan the workspace crates and fail if violations are found.
//!
//! - `dead_code_enforcement` - Prevents #[allow(dead_code)] and panicking
//!   unwraps in production code

#[path = "style/dead_code_enforcement.rs"]
mod dead_code_enforcement;
