//! Document processing workflow
//!
//! An explicit state machine over the anonymization pipeline. A
//! [`WorkflowState`] is created per document, moved through every
//! [`Stage`] by [`WorkflowOrchestrator::advance`], and turned into a
//! [`ProcessingResult`](crate::anonymization::report::ProcessingResult) at
//! `Done`.
//!
//! # Example
//!
//! ```rust
//! use aegis::adapters::Collaborators;
//! use aegis::anonymization::compliance::Regulation;
//! use aegis::workflow::WorkflowOrchestrator;
//!
//! # #[tokio::main]
//! # async fn main() -> aegis::Result<()> {
//! let orchestrator = WorkflowOrchestrator::with_defaults(Collaborators::default())?;
//! let result = orchestrator
//!     .process("Card 4111111111111111 exp 12/25, email a@b.com", Some(Regulation::PciDss))
//!     .await?;
//!
//! assert_eq!(result.primary_regulation, Regulation::PciDss);
//! assert!(result.anonymized_text.contains("<CREDIT_CARD_0>"));
//! assert!(result.quality_passed);
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod routing;
pub mod state;

pub use orchestrator::WorkflowOrchestrator;
pub use routing::{justify, Justification, RoutePath};
pub use state::{Stage, WorkflowState};
