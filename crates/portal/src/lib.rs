//! Sol City Portal - Session, authorization and page workflows.
//!
//! This crate drives the page logic from `sol-city-core` against the hosted
//! backend. Everything external sits behind a trait so the same workflows run
//! against Supabase in production and in-memory doubles in tests.
//!
//! # Architecture
//!
//! - [`backend`] - `IdentityProvider` and `RecordStore` traits, the Supabase
//!   REST adapter and in-memory doubles
//! - [`storage`] - Durable client storage (unlock flag)
//! - [`navigation`] - Programmatic redirects
//! - [`session`] - Session store fed by the provider's push channel
//! - [`roles`] - Role resolution from `user_roles`
//! - [`pages`] - Business page, directory, admin panel, hidden route
//! - [`state`] - Shared handles to the configured collaborators
//!
//! # Ambient
//!
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Portal error taxonomy and Sentry helpers
//! - [`telemetry`] - Tracing subscriber and Sentry initialisation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod navigation;
pub mod pages;
pub mod roles;
pub mod session;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use config::PortalConfig;
pub use error::{AuthorizationError, PortalError, Result};
pub use state::PortalState;
