use serde::{Deserialize, Serialize};

use crate::models::{Opinion, Reduction};

/// How many embedding components the wire echoes per point. Full vectors are
/// hundreds of floats; the frontend only uses them for payload-side tooling,
/// so the echo is truncated. Anything that needs real similarity re-embeds.
pub const EMBEDDING_ECHO_LEN: usize = 50;

/// Wire shape of one opinion on the 2D map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub similarity_group: Option<u32>,
    pub score: i64,
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub is_user_stance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_to_user: Option<f32>,
}

impl Point {
    pub fn from_opinion(op: &Opinion) -> Self {
        let mut embedding = op.vector.clone();
        embedding.truncate(EMBEDDING_ECHO_LEN);
        Point {
            id: op.id,
            x: op.x,
            y: op.y,
            text: op.cleaned_text.clone(),
            similarity_group: op.group_id,
            score: op.score,
            source: op.source.clone(),
            embedding,
            is_user_stance: op.is_stance,
            similarity_to_user: op.similarity_to_user,
        }
    }

    /// Rebuilds the domain record from a round-tripped point. The truncated
    /// embedding echo is dropped; the stance pass refills vectors itself.
    pub fn into_opinion(self) -> Opinion {
        Opinion {
            id: self.id,
            source: self.source,
            raw_text: self.text.clone(),
            cleaned_text: self.text,
            score: self.score,
            vector: Vec::new(),
            group_id: self.similarity_group,
            x: self.x,
            y: self.y,
            is_stance: self.is_user_stance,
            similarity_to_user: self.similarity_to_user,
        }
    }
}

/// Response of one fresh analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub points: Vec<Point>,
    pub topic: String,
    pub reduction: Reduction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    pub total_opinions: usize,
    pub similarity_groups: usize,
    pub generated_at: String,
}

/// Response of one stance-positioning pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceResponse {
    pub points: Vec<Point>,
    pub topic: String,
    pub user_stance_similarity: f32,
    pub most_similar_opinion: String,
    pub similar_points_count: usize,
    pub generated_at: String,
}
