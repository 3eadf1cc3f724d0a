//! Unit tests for the ipless CLI
//!
//! These tests use fake ports and temp directories and run fast without
//! touching the real proxy, hosts file, or network.

mod helpers;
mod launcher;
mod source_fetcher;
