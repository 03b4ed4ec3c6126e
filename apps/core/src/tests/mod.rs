//! Test Module
//!
//! Cross-module test suites for the NeuroGen backend.
//!
//! ## Test Categories
//! - `brain_tests`: Signal extraction, routing and prompt composition scenarios
//! - `supervisor_tests`: Request orchestration, fallbacks and session state
//! - `http_tests`: HTTP status codes and bodies through the axum router
//! - `chaos_test`: Concurrency and resilience under flaky providers
//! - `mocks`: Mock collaborators shared by the suites

pub mod chaos_test;
pub mod http_tests;
