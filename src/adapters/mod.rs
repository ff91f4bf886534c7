//! External collaborator integrations for Aegis.
//!
//! The core never performs inference or retrieval itself. It consumes four
//! collaborators through async traits:
//!
//! - [`ContextualDetector`] - inference-based entity detection
//! - [`KindClassifier`] - sensitivity/regulations for unknown entity kinds
//! - [`CitationSource`] - regulation text for justifications
//! - [`ResidualPiiChecker`] - final contextual scan of anonymized text
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. [`Unavailable`] implements every
//! trait and is the default for collaborators that are not deployed.
//!
//! ```rust
//! use aegis::adapters::{Collaborators, ContextualDetector, Unavailable};
//! use std::sync::Arc;
//!
//! let collaborators = Collaborators::default()
//!     .with_contextual(Arc::new(Unavailable) as Arc<dyn ContextualDetector>);
//! assert_eq!(collaborators.timeout.as_millis(), 10_000);
//! ```

pub mod collaborators;

pub use collaborators::{
    call_with_timeout, CitationSource, CitationText, Collaborators, ContextualDetector,
    KindClassifier, ResidualFinding, ResidualPiiChecker, Unavailable,
};
