//! Numeric sidecar boundary: 2D reduction and delegated clustering.
//!
//! UMAP/PCA/t-SNE and k-means/HDBSCAN internals live in an external service;
//! this module only defines the contract and the HTTP adapter. Both calls are
//! pure functions of their input: one output row per input vector, in input
//! order.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ClusterRequest, ClusterResponse, ReduceRequest, ReduceResponse};
use crate::models::Reduction;

/// Delegated clustering method plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterMethod {
    KMeans { n_clusters: usize },
    Hdbscan { min_cluster_size: usize },
}

#[async_trait]
pub trait NumericBackend: Send + Sync {
    /// Maps N vectors to N 2D coordinates, preserving input order.
    async fn reduce(
        &self,
        vectors: &[Vec<f32>],
        method: Reduction,
    ) -> anyhow::Result<Vec<[f32; 2]>>;

    /// Returns one label per input vector, in input order. `-1` marks noise.
    async fn cluster(&self, vectors: &[Vec<f32>], method: ClusterMethod)
        -> anyhow::Result<Vec<i64>>;
}

/// HTTP adapter for the numeric sidecar's `/reduce` and `/cluster` endpoints.
pub struct NumericServiceClient {
    client: Client,
    api_base: String,
}

impl NumericServiceClient {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        NumericServiceClient {
            client,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl NumericBackend for NumericServiceClient {
    async fn reduce(
        &self,
        vectors: &[Vec<f32>],
        method: Reduction,
    ) -> anyhow::Result<Vec<[f32; 2]>> {
        let url = format!("{}/reduce", self.api_base.trim_end_matches('/'));
        let start = std::time::Instant::now();
        debug!("Reduction call starting - method={}, vectors={}", method, vectors.len());

        let body = ReduceRequest {
            method: method.as_str(),
            n_components: 2,
            vectors,
        };
        let resp: ReduceResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(
            "Reduction call completed - method={}, duration={:.2}s, coordinates={}",
            method,
            start.elapsed().as_secs_f32(),
            resp.coordinates.len()
        );
        Ok(resp.coordinates)
    }

    async fn cluster(
        &self,
        vectors: &[Vec<f32>],
        method: ClusterMethod,
    ) -> anyhow::Result<Vec<i64>> {
        let url = format!("{}/cluster", self.api_base.trim_end_matches('/'));
        let start = std::time::Instant::now();

        let body = match method {
            ClusterMethod::KMeans { n_clusters } => ClusterRequest {
                method: "kmeans",
                n_clusters: Some(n_clusters),
                min_cluster_size: None,
                vectors,
            },
            ClusterMethod::Hdbscan { min_cluster_size } => ClusterRequest {
                method: "hdbscan",
                n_clusters: None,
                min_cluster_size: Some(min_cluster_size),
                vectors,
            },
        };
        debug!("Clustering call starting - method={}, vectors={}", body.method, vectors.len());

        let resp: ClusterResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(
            "Clustering call completed - method={}, duration={:.2}s, labels={}",
            body.method,
            start.elapsed().as_secs_f32(),
            resp.labels.len()
        );
        Ok(resp.labels)
    }
}
