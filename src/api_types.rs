//! Wire shapes of the three external collaborators. Only the fields the
//! pipeline reads are modeled; everything else is ignored on decode.

use serde::{Deserialize, Serialize};

/* ---------------------- discussion platform search API --------------------- */

/// Envelope of the platform's public `search.json` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiListing {
    pub data: ApiListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiListingData {
    #[serde(default)]
    pub children: Vec<ApiChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiChild {
    pub data: ApiSubmission,
}

/// One submission as the platform returns it. `selftext` is empty for
/// link-only posts, in which case the title carries the opinion.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub score: i64,
}

/* --------------------------- embedding model API --------------------------- */

/// Request body of the OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    pub data: Vec<EmbeddingsDatum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsDatum {
    pub index: usize,
    pub embedding: Vec<f32>,
}

/* --------------------------- numeric sidecar API --------------------------- */

/// Request body of the sidecar's `/reduce` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReduceRequest<'a> {
    pub method: &'a str,
    pub n_components: usize,
    pub vectors: &'a [Vec<f32>],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReduceResponse {
    pub coordinates: Vec<[f32; 2]>,
}

/// Request body of the sidecar's `/cluster` endpoint. Exactly one of the
/// parameter fields is set, depending on the method.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterRequest<'a> {
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_clusters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cluster_size: Option<usize>,
    pub vectors: &'a [Vec<f32>],
}

/// Labels, one per input vector. `-1` marks noise/unassigned points.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterResponse {
    pub labels: Vec<i64>,
}
