//! Positions one user statement relative to an existing opinion map.
//!
//! Existing points keep their group identity untouched; the stance point
//! never joins the similarity partition. The whole set (existing texts plus
//! the statement) is re-embedded and re-projected in one call so the stance
//! coordinates share the projection basis with the rest of the map. A
//! standalone projection of a single new vector would be meaningless for the
//! neighborhood-based methods.

use chrono::Utc;
use itertools::Itertools;
use tracing::{debug, info};

use crate::embed::{self, TextEmbedder};
use crate::error::Result;
use crate::models::{Opinion, StanceRequest};
use crate::numeric::NumericBackend;
use crate::out_models::{Point, StanceResponse};
use crate::project;
use crate::similarity::similarities_to;

/// Threshold used for the `similar_points_count` statistic when the original
/// analysis grouped with a delegated clustering method.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

pub async fn position_stance(
    embedder: &dyn TextEmbedder,
    numeric: &dyn NumericBackend,
    batch_size: usize,
    req: &StanceRequest,
) -> Result<StanceResponse> {
    req.validate()?;
    let start = std::time::Instant::now();
    let threshold = req
        .similarity_threshold
        .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
    info!(
        "Stance positioning starting - topic={}, existing_points={}, threshold={}",
        req.topic,
        req.existing_points.len(),
        threshold
    );

    let mut existing: Vec<Opinion> = req
        .existing_points
        .iter()
        .cloned()
        .map(Point::into_opinion)
        .collect();
    // A prior stance point in the round-tripped set would shadow the new one.
    existing.retain(|op| !op.is_stance);
    if existing.is_empty() {
        return Err(crate::error::PipelineError::Validation(
            "existing_points contains no non-stance opinions".into(),
        ));
    }

    // Re-embed everything in one ordered list, statement last.
    let mut texts: Vec<String> = existing.iter().map(|op| op.cleaned_text.clone()).collect();
    texts.push(req.statement.trim().to_string());
    let mut vectors = embed::embed_all(embedder, &texts, batch_size).await?;
    let stance_vector = vectors.pop().expect("statement vector present");

    let sims = similarities_to(&stance_vector, &vectors);
    let best_idx = sims
        .iter()
        .copied()
        .position_max_by(f32::total_cmp)
        .expect("existing_points validated non-empty");
    let best_sim = sims[best_idx];
    let similar_count = sims.iter().filter(|&&s| s >= threshold).count();
    debug!(
        "Stance similarity - best={:.3}, best_id={}, similar_count={}",
        best_sim, existing[best_idx].id, similar_count
    );

    // Project the augmented set together so every coordinate, stance
    // included, comes out of the same fit.
    let mut augmented = vectors.clone();
    augmented.push(stance_vector.clone());
    let coords = project::project(numeric, &augmented, req.reduction).await?;

    let stance_id = existing.iter().map(|op| op.id).max().unwrap_or(0) + 1;
    let most_similar_opinion = existing[best_idx].cleaned_text.clone();

    let mut points: Vec<Point> = Vec::with_capacity(existing.len() + 1);
    for (i, mut op) in existing.into_iter().enumerate() {
        op.vector = vectors[i].clone();
        op.x = coords[i][0];
        op.y = coords[i][1];
        op.similarity_to_user = Some(sims[i]);
        points.push(Point::from_opinion(&op));
    }

    let stance = Opinion {
        id: stance_id,
        source: "user".to_string(),
        raw_text: req.statement.clone(),
        cleaned_text: req.statement.trim().to_string(),
        score: 0,
        vector: stance_vector,
        group_id: None,
        x: coords[coords.len() - 1][0],
        y: coords[coords.len() - 1][1],
        is_stance: true,
        similarity_to_user: None,
    };
    points.push(Point::from_opinion(&stance));

    info!(
        "Stance positioning completed - duration={:.2}s, stance_similarity={:.3}, similar_points={}",
        start.elapsed().as_secs_f32(),
        best_sim,
        similar_count
    );

    Ok(StanceResponse {
        points,
        topic: req.topic.clone(),
        user_stance_similarity: best_sim,
        most_similar_opinion,
        similar_points_count: similar_count,
        generated_at: Utc::now().to_rfc3339(),
    })
}
