//! Integration tests for the orchestrator
//!
//! These tests stand in for the real crawl engine with small shell scripts
//! and drive full runs end-to-end.

#![cfg(unix)]

mod orchestrator_tests;
mod pipeline_tests;
