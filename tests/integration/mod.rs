//! Integration tests
//!
//! Tests that run the real router against an in-memory database

mod api;
mod database;
mod realtime;
