//! Integration tests for the identifier-addressed file store

mod cli_contracts;
mod concurrency;
mod filesystem_facade;
mod persistence_roundtrip;
mod support;
mod tree_operations;
