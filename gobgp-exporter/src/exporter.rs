//! Process-wide exporter: router nodes plus access tokens.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::info;

use crate::config::{ANONYMOUS_TOKEN, ExporterConfig};
use crate::descriptors;
use crate::error::{ExporterError, Result};
use crate::metric::{self, Descriptor, Metric};
use crate::node::RouterNode;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthDenied {
    #[error("invalid token")]
    InvalidToken,
    #[error("lack of auth token")]
    MissingToken,
}

/// Shared exporter state.
#[derive(Debug)]
pub struct Exporter {
    nodes: Vec<Arc<RouterNode>>,
    tokens: RwLock<HashSet<String>>,
    poll_interval: Duration,
}

/// Shared reference to an exporter.
pub type SharedExporter = Arc<Exporter>;

impl Exporter {
    /// Connect to the configured router. Fails fast on an invalid address or
    /// an unreachable router.
    pub async fn new(config: &ExporterConfig) -> Result<Self> {
        let node = RouterNode::connect(&config.gobgp).await?;
        info!(
            address = %node.address(),
            poll_interval_secs = config.gobgp.poll_interval_secs,
            families = config.gobgp.address_families.len(),
            "Router node ready"
        );

        Self::with_nodes(
            vec![Arc::new(node)],
            config.gobgp.poll_interval(),
            config.auth.tokens.iter().cloned(),
        )
    }

    /// Build an exporter around existing nodes.
    pub fn with_nodes(
        nodes: Vec<Arc<RouterNode>>,
        poll_interval: Duration,
        tokens: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let exporter = Self {
            nodes,
            tokens: RwLock::new(HashSet::new()),
            poll_interval,
        };
        for token in tokens {
            exporter.add_token(&token)?;
        }
        Ok(exporter)
    }

    /// Accept an additional access token.
    pub fn add_token(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(ExporterError::EmptyToken);
        }
        self.tokens.write().insert(token.to_string());
        Ok(())
    }

    /// Check candidate tokens in order and return the first accepted one.
    ///
    /// With the anonymous token configured every request is accepted.
    pub fn authorize<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> std::result::Result<String, AuthDenied> {
        let tokens = self.tokens.read();
        if tokens.contains(ANONYMOUS_TOKEN) {
            return Ok(ANONYMOUS_TOKEN.to_string());
        }

        let mut denied = AuthDenied::MissingToken;
        for candidate in candidates.into_iter().filter(|c| !c.is_empty()) {
            if tokens.contains(candidate) {
                return Ok(candidate.to_string());
            }
            denied = AuthDenied::InvalidToken;
        }
        Err(denied)
    }

    pub fn nodes(&self) -> &[Arc<RouterNode>] {
        &self.nodes
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Every descriptor the exporter can emit.
    pub fn describe(&self) -> Vec<&'static Descriptor> {
        descriptors::describe()
    }

    /// Refresh every node if due and return their combined snapshots.
    pub async fn collect(&self) -> Vec<Metric> {
        let mut metrics = Vec::new();
        for node in &self.nodes {
            metrics.extend(node.collect().await);
        }
        metrics
    }

    /// Refresh every node if due and encode the result.
    pub async fn render(&self) -> String {
        match self.nodes.as_slice() {
            [node] => node.render().await,
            _ => metric::render(&self.collect().await),
        }
    }
}
