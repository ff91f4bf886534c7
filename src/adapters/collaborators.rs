//! Collaborator traits
//!
//! The services the core consumes but does not implement: contextual
//! detection, classification of unknown kinds, citation retrieval and the
//! residual-PII check. Every call is awaited under a timeout, and any
//! failure is converted into [`AegisError::CollaboratorUnavailable`].

use crate::anonymization::compliance::Regulation;
use crate::anonymization::models::{Entity, EntityKind, Sensitivity};
use crate::domain::{AegisError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Regulation text returned by a citation source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationText {
    pub regulation: Regulation,
    /// Article or section identifier, if the source reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    pub text: String,
}

/// Finding reported by a residual-PII checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualFinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    pub description: String,
}

/// Contextual (inference-based) entity detector
///
/// Non-deterministic and usually network-backed. Offsets must be char
/// offsets into the text that was passed in.
#[async_trait]
pub trait ContextualDetector: Send + Sync {
    async fn detect_contextual(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Classification for kinds absent from the static table
#[async_trait]
pub trait KindClassifier: Send + Sync {
    async fn classify_unknown(&self, kind: &str) -> Result<(Sensitivity, BTreeSet<Regulation>)>;
}

/// Regulation text retrieval
#[async_trait]
pub trait CitationSource: Send + Sync {
    async fn fetch_citations(
        &self,
        regulation: Regulation,
        kinds: &[EntityKind],
    ) -> Result<Vec<CitationText>>;
}

/// Final contextual scan of anonymized text
#[async_trait]
pub trait ResidualPiiChecker: Send + Sync {
    async fn check_residual_pii(&self, text: &str) -> Result<Vec<ResidualFinding>>;
}

/// Stand-in for a collaborator that is not deployed
///
/// Every call fails with [`AegisError::CollaboratorUnavailable`], which the
/// pipeline absorbs the same way it absorbs a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl ContextualDetector for Unavailable {
    async fn detect_contextual(&self, _text: &str) -> Result<Vec<Entity>> {
        Err(AegisError::unavailable("detect_contextual", "not configured"))
    }
}

#[async_trait]
impl KindClassifier for Unavailable {
    async fn classify_unknown(&self, _kind: &str) -> Result<(Sensitivity, BTreeSet<Regulation>)> {
        Err(AegisError::unavailable("classify_unknown", "not configured"))
    }
}

#[async_trait]
impl CitationSource for Unavailable {
    async fn fetch_citations(
        &self,
        _regulation: Regulation,
        _kinds: &[EntityKind],
    ) -> Result<Vec<CitationText>> {
        Err(AegisError::unavailable("fetch_citations", "not configured"))
    }
}

#[async_trait]
impl ResidualPiiChecker for Unavailable {
    async fn check_residual_pii(&self, _text: &str) -> Result<Vec<ResidualFinding>> {
        Err(AegisError::unavailable("check_residual_pii", "not configured"))
    }
}

/// The full set of collaborators handed to the orchestrator
#[derive(Clone)]
pub struct Collaborators {
    pub contextual: Arc<dyn ContextualDetector>,
    pub classifier: Arc<dyn KindClassifier>,
    pub citations: Arc<dyn CitationSource>,
    pub residual: Arc<dyn ResidualPiiChecker>,
    /// Upper bound for every collaborator call
    pub timeout: Duration,
}

impl Collaborators {
    pub fn with_contextual(mut self, detector: Arc<dyn ContextualDetector>) -> Self {
        self.contextual = detector;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn KindClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_citations(mut self, source: Arc<dyn CitationSource>) -> Self {
        self.citations = source;
        self
    }

    pub fn with_residual(mut self, checker: Arc<dyn ResidualPiiChecker>) -> Self {
        self.residual = checker;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            contextual: Arc::new(Unavailable),
            classifier: Arc::new(Unavailable),
            citations: Arc::new(Unavailable),
            residual: Arc::new(Unavailable),
            timeout: Duration::from_millis(crate::config::DEFAULT_COLLABORATOR_TIMEOUT_MS),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Await a collaborator call, converting a timeout or failure into
/// [`AegisError::CollaboratorUnavailable`]
pub async fn call_with_timeout<T, F>(collaborator: &'static str, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err @ AegisError::CollaboratorUnavailable { .. })) => Err(err),
        Ok(Err(err)) => Err(AegisError::unavailable(collaborator, err.to_string())),
        Err(_) => Err(AegisError::unavailable(
            collaborator,
            format!("timed out after {}ms", timeout.as_millis()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    #[async_trait]
    impl ContextualDetector for Slow {
        async fn detect_contextual(&self, _text: &str) -> Result<Vec<Entity>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_unavailable_stand_in() {
        let err = Unavailable.detect_contextual("text").await.unwrap_err();
        assert!(matches!(
            err,
            AegisError::CollaboratorUnavailable {
                collaborator: "detect_contextual",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_timeout_becomes_unavailable() {
        let result = call_with_timeout(
            "detect_contextual",
            Duration::from_millis(10),
            Slow.detect_contextual("text"),
        )
        .await;
        match result {
            Err(AegisError::CollaboratorUnavailable { reason, .. }) => {
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collaborator_error_is_wrapped() {
        let result: Result<()> = call_with_timeout("fetch_citations", Duration::from_secs(1), async {
            Err(AegisError::Io("connection reset".to_string()))
        })
        .await;
        assert!(matches!(
            result,
            Err(AegisError::CollaboratorUnavailable {
                collaborator: "fetch_citations",
                ..
            })
        ));
    }
}
