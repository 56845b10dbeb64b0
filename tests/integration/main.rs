//! Integration tests for graph resolution, retrieval and bootstrap

mod common;
mod lazy;
mod profiles;
