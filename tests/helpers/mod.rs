// ABOUTME: Test helper modules shared across integration tests

pub mod axum_test;
