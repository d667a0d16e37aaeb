//! Unit tests for vmctl
//!
//! These tests use hand-written port stubs and run fast without external I/O.

mod lifecycle_service;
mod mocks;
mod property_tests;
