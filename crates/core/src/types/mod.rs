//! Core types for the Sol City Portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod rating;
pub mod role;

pub use id::*;
pub use rating::{Rating, RatingError};
pub use role::{AppRole, Privilege};
