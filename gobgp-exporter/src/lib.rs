//! Prometheus exporter for the GoBGP routing daemon.
//!
//! The exporter polls the GoBGP gRPC API for router identity, routing table
//! counters and peer state, caches the result as a metric snapshot and serves
//! it over an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   GoBGP gRPC    │<────│   RouterNode    │<────│   HTTP Server   │
//! │   (apipb API)   │     │ (poll + cache)  │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! A scrape triggers a collection cycle only when the poll interval has
//! elapsed since the previous one; otherwise the cached snapshot is served.
//!
//! # Usage
//!
//! ```bash
//! gobgp-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod address;
pub mod api;
pub mod config;
pub mod descriptors;
pub mod docs;
pub mod error;
pub mod exporter;
pub mod family;
pub mod http;
pub mod metric;
pub mod mock;
pub mod node;
pub mod peers;
pub mod rib;
pub mod summary;

pub use address::RouterAddress;
pub use api::{GobgpClient, RouterApi};
pub use config::ExporterConfig;
pub use error::{ApiError, ExporterError, Result};
pub use exporter::{Exporter, SharedExporter};
pub use family::{AddressFamily, TableType};
pub use http::HttpServer;
pub use node::RouterNode;
