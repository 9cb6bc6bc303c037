//! Core types and the spaced-repetition engine for Lexis.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Persistence is reached through the [`store::TrainingStore`] trait and the
//! current date through [`clock::Clock`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod dictionary;
pub mod error;
pub mod schedule;
pub mod session;
pub mod store;
pub mod trainer;
pub mod training;

pub use error::{Error, Result};
