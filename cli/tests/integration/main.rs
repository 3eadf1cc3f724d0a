//! Integration tests for the ipless CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every test points `IPLESS_CONFIG` at a temp sandbox so nothing touches
//! `~/.ipless`, the real proxy, or `/etc/hosts`.

mod routes_command;
