//! Sol City Core - Shared domain types and page logic.
//!
//! This crate provides the types and pure logic used across all Sol City
//! Portal components:
//! - `portal` - Session tracking, backend adapters and page workflows
//! - `cli` - Command-line front end for the portal
//!
//! # Architecture
//!
//! The core crate contains only types and synchronous state machines - no
//! I/O, no network clients, no storage. Anything that talks to the hosted
//! backend lives in `sol-city-portal` and drives these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, application roles and review ratings
//! - [`records`] - Table row types (businesses, reviews, news, events, ...)
//! - [`listing`] - Category + free-text filtering for directory and board
//! - [`reviews`] - Rating aggregation and the review form
//! - [`editor`] - Ownership-gated view/edit state machine
//! - [`unlock`] - Click counter guarding the hidden route

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod editor;
pub mod listing;
pub mod records;
pub mod reviews;
pub mod types;
pub mod unlock;

pub use types::*;
