//! # Aegis - Regulation-aware text anonymization
//!
//! Aegis detects, classifies and anonymizes sensitive spans of free text
//! under GDPR, HIPAA and PCI DSS.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Merging** candidate entities from pattern and inference detectors
//! - **Classifying** entities and deriving one primary regulation per document
//! - **Planning** one anonymization technique per entity
//! - **Rewriting** text with offset-safe, deterministic substitutions
//! - **Validating** the output with a bounded retry loop
//!
//! ## Architecture
//!
//! Aegis follows a layered architecture:
//!
//! - [`workflow`] - The per-document state machine
//! - [`anonymization`] - Detection, merging, classification, planning, rewriting, quality
//! - [`adapters`] - External collaborator interfaces
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aegis::adapters::Collaborators;
//! use aegis::config::load_config;
//! use aegis::workflow::WorkflowOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("aegis.toml")?;
//!     let _guard = aegis::logging::init_logging(&config.application.log_level, &config.logging)?;
//!
//!     let orchestrator = WorkflowOrchestrator::from_config(&config, Collaborators::default())?;
//!     let result = orchestrator.process("Jane Doe, jane@example.com", None).await?;
//!
//!     println!("{}", result.anonymized_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Aegis uses the [`domain::AegisError`] type for all errors. Fatal errors
//! (`UnresolvedEntity`, `OffsetOutOfBounds`) abort a run; collaborator
//! failures degrade it and are recorded as notes.
//!
//! ## Logging
//!
//! Aegis uses structured logging with the `tracing` crate. Raw entity values
//! are never logged:
//!
//! ```rust,no_run
//! use tracing::info;
//!
//! info!(kind = "email", start = 12, end = 28, "Span masked");
//! ```

pub mod adapters;
pub mod anonymization;
pub mod config;
pub mod domain;
pub mod logging;
pub mod workflow;

pub use anonymization::ProcessingResult;
pub use domain::{AegisError, Result};
pub use workflow::WorkflowOrchestrator;
