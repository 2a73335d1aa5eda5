// crates/cek-config/src/lib.rs
// ============================================================================
// Module: CEK Config Library
// Description: Canonical gateway config model and validation.
// Purpose: Single source of truth for cek-gateway.toml semantics.
// Dependencies: cek-core, serde, toml
// ============================================================================

//! ## Overview
//! `cek-config` defines the configuration model for a CEK extension gateway.
//! It provides strict, fail-closed validation and turns a validated config
//! into a ready [`cek_core::Gateway`].
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
