//! HTTP client for operators working through the review queue.
//!
//! [`HttpReviewClient`] implements the inventory crate's `ReviewClient`, so a
//! `ReviewSession` can be driven against a running API server.

pub mod review;

pub use review::{ClientError, HttpReviewClient};
