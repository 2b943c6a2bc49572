//! Core types and services for the Yatube feed backend.
//!
//! This crate has no HTTP or database dependencies. It defines the domain
//! model, the [`store::FeedStore`] contract, and the services built on it:
//! feed composition with pagination and page caching, the follow graph, and
//! comment aggregation.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod comments;
pub mod error;
pub mod feed;
pub mod follow;
pub mod model;
pub mod pagination;
pub mod store;

pub use error::{Error, Result};
