use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Bounds enforced on `AnalysisRequest::max_posts`.
pub const MIN_POSTS: u32 = 10;
pub const MAX_POSTS: u32 = 200;

/// Bounds enforced on the similarity-graph threshold.
pub const MIN_THRESHOLD: f32 = 0.1;
pub const MAX_THRESHOLD: f32 = 0.9;

/// One opinion record as it moves through the pipeline.
///
/// `id` is assigned once, after collection and dedup, in merged order; it never
/// changes. `vector` is immutable once the embedder fills it. `group_id` is
/// opaque (group 3 is not "closer" to group 2 than to group 7) and dense from 0.
/// `x`/`y` only mean anything relative to the other points of the same run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opinion {
    pub id: u32,
    pub source: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub score: i64,
    pub vector: Vec<f32>,
    pub group_id: Option<u32>,
    pub x: f32,
    pub y: f32,
    pub is_stance: bool,
    pub similarity_to_user: Option<f32>,
}

/// Raw record handed back by a platform search, before cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOpinion {
    pub text: String,
    pub source: String,
    pub score: i64,
}

/// A raw opinion that survived cleaning but has not been embedded yet.
#[derive(Debug, Clone)]
pub struct CleanedOpinion {
    pub source: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub score: i64,
}

/// 2D reduction method, delegated to the numeric sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Umap,
    Pca,
    Tsne,
}

impl Reduction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reduction::Umap => "umap",
            Reduction::Pca => "pca",
            Reduction::Tsne => "tsne",
        }
    }

    /// Neighborhood-based methods need enough points to build a neighbor
    /// graph; PCA only needs two.
    pub fn is_neighborhood_based(self) -> bool {
        matches!(self, Reduction::Umap | Reduction::Tsne)
    }
}

impl std::fmt::Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How opinions get their `group_id`, dispatched once per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum GroupingStrategy {
    /// Connected components of the cosine-similarity graph at `threshold`.
    ThresholdGraph { threshold: f32 },
    /// Delegated k-means with a fixed cluster count.
    #[serde(rename = "kmeans")]
    KMeans { n_clusters: usize },
    /// Delegated density clustering; points the backend marks as noise share
    /// one dedicated group.
    Hdbscan { min_cluster_size: usize },
}

impl GroupingStrategy {
    /// Threshold used for similarity statistics, when the strategy has one.
    pub fn threshold(&self) -> Option<f32> {
        match self {
            GroupingStrategy::ThresholdGraph { threshold } => Some(*threshold),
            _ => None,
        }
    }
}

/// Everything needed to run one fresh analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub topic: String,
    pub max_posts: u32,
    pub reduction: Reduction,
    pub grouping: GroupingStrategy,
}

impl AnalysisRequest {
    /// Rejects malformed parameters before any pipeline stage runs.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(PipelineError::Validation("topic must not be empty".into()));
        }
        if !(MIN_POSTS..=MAX_POSTS).contains(&self.max_posts) {
            return Err(PipelineError::Validation(format!(
                "max_posts must be within {}..={}, got {}",
                MIN_POSTS, MAX_POSTS, self.max_posts
            )));
        }
        match self.grouping {
            GroupingStrategy::ThresholdGraph { threshold } => {
                if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
                    return Err(PipelineError::Validation(format!(
                        "similarity_threshold must be within {}..={}, got {}",
                        MIN_THRESHOLD, MAX_THRESHOLD, threshold
                    )));
                }
            }
            GroupingStrategy::KMeans { n_clusters } => {
                if n_clusters == 0 {
                    return Err(PipelineError::Validation(
                        "n_clusters must be at least 1".into(),
                    ));
                }
            }
            GroupingStrategy::Hdbscan { min_cluster_size } => {
                if min_cluster_size < 2 {
                    return Err(PipelineError::Validation(
                        "min_cluster_size must be at least 2".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Positions one user statement against a previously computed opinion set.
///
/// `existing_points` is the `points` array of a prior analysis response,
/// round-tripped verbatim. Wire embeddings are truncated for payload size, so
/// the stance pass re-embeds the texts rather than trusting those vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceRequest {
    pub topic: String,
    pub statement: String,
    pub existing_points: Vec<crate::out_models::Point>,
    pub reduction: Reduction,
    /// Threshold the original analysis grouped at; `None` when the original
    /// run used a delegated clustering strategy, in which case the stance pass
    /// falls back to [`crate::stance::DEFAULT_SIMILARITY_THRESHOLD`].
    pub similarity_threshold: Option<f32>,
}

impl StanceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(PipelineError::Validation("topic must not be empty".into()));
        }
        if self.statement.trim().is_empty() {
            return Err(PipelineError::Validation(
                "statement must not be empty".into(),
            ));
        }
        if self.existing_points.is_empty() {
            return Err(PipelineError::Validation(
                "existing_points must not be empty".into(),
            ));
        }
        if let Some(t) = self.similarity_threshold {
            if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&t) {
                return Err(PipelineError::Validation(format!(
                    "similarity_threshold must be within {}..={}, got {}",
                    MIN_THRESHOLD, MAX_THRESHOLD, t
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            topic: "remote work".into(),
            max_posts: 50,
            reduction: Reduction::Umap,
            grouping: GroupingStrategy::ThresholdGraph { threshold: 0.7 },
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn empty_topic_rejected() {
        let mut req = request();
        req.topic = "   ".into();
        assert!(matches!(
            req.validate(),
            Err(PipelineError::Validation(msg)) if msg.contains("topic")
        ));
    }

    #[test]
    fn max_posts_bounds_enforced() {
        let mut req = request();
        req.max_posts = 9;
        assert!(req.validate().is_err());
        req.max_posts = 201;
        assert!(req.validate().is_err());
        req.max_posts = 10;
        assert!(req.validate().is_ok());
        req.max_posts = 200;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn threshold_bounds_enforced() {
        let mut req = request();
        req.grouping = GroupingStrategy::ThresholdGraph { threshold: 0.05 };
        assert!(req.validate().is_err());
        req.grouping = GroupingStrategy::ThresholdGraph { threshold: 0.95 };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_clusters_rejected() {
        let mut req = request();
        req.grouping = GroupingStrategy::KMeans { n_clusters: 0 };
        assert!(req.validate().is_err());
    }
}
