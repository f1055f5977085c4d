//! API integration tests
//!
//! Integration tests for the HTTP endpoints

mod auth_test;
mod rooms_test;
