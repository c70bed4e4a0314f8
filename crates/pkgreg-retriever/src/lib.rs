//! Source registry access for pkgreg
//!
//! This crate fetches version listings and package tarballs from the
//! upstream NPM-style registry. A shared HTTP client provides connection
//! pooling and retry logic; retriever implementations encode the URL layout
//! of each registry type, and an optional decorator applies supply-chain
//! verification to downloaded archives.

pub mod api;
pub mod client;
pub mod factory;
pub mod retriever;
pub mod verify;

// Re-export main types
pub use api::{DistInfo, PackageOverview, VersionEntry};
pub use client::{RegistryClient, RetryConfig};
pub use factory::build_retriever;
pub use retriever::{
    ArtifactRegistryRetriever, FileTokenProvider, PackageRetriever, PublicRetriever,
    TokenProvider,
};
pub use verify::{SupplyChainVerifier, VerifyingRetriever};

use pkgreg_core::error::RegistryError;

/// Result type for retriever operations
pub type RetrieverResult<T> = Result<T, RegistryError>;
