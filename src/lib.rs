//! # SQL Advisor Library
//!
//! Literal-agnostic fingerprints and heuristic advice for SQL statements.
//!
//! The pipeline for one statement:
//!
//! 1. [`lexer::strip_comments`] and trim; an empty result is a no-op
//! 2. [`fingerprint::normalize`] and [`fingerprint::identify`]
//! 3. [`query::parse`] builds the [`query::AuditContext`]
//! 4. [`engine::Engine`] runs the [`registry::Registry`] minus the
//!    [`suppression::SuppressionSet`]
//! 5. [`advisor::Advisor`] assembles the [`advisor::AdviseResponse`]

pub mod advisor;
pub mod app;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod lexer;
pub mod output;
pub mod query;
pub mod registry;
pub mod rules;
pub mod suppression;
