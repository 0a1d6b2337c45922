//! Wires the pipeline stages together for one request: collect → normalize →
//! embed → group → project. Stages run strictly in that order; the only
//! intra-request parallelism is the collector's per-source fan-out.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cluster;
use crate::config::Config;
use crate::embed::{self, TextEmbedder};
use crate::error::{PipelineError, Result};
use crate::fetch::{Collector, DiscussionPlatform};
use crate::models::{AnalysisRequest, Opinion, StanceRequest};
use crate::numeric::NumericBackend;
use crate::out_models::{AnalysisResponse, Point, StanceResponse};
use crate::project;
use crate::stance;

/// Explicitly owned collaborator handles, constructed once at startup and
/// shared read-only across requests.
pub struct Collaborators {
    pub platform: Arc<dyn DiscussionPlatform>,
    pub embedder: Arc<dyn TextEmbedder>,
    pub numeric: Arc<dyn NumericBackend>,
}

pub async fn run_analysis(
    collab: &Collaborators,
    cfg: &Config,
    req: &AnalysisRequest,
) -> Result<AnalysisResponse> {
    req.validate()?;
    let pipeline_start = std::time::Instant::now();
    info!(
        "Analysis starting - topic={}, max_posts={}, reduction={}",
        req.topic, req.max_posts, req.reduction
    );

    // 1) collect raw records, merged in source-completion order
    let collector = Collector::new(Arc::clone(&collab.platform), &cfg.collector);
    let raw = collector.collect(&req.topic, req.max_posts as usize).await;

    // 2) clean and dedup before anything consumes an embedding call or an id
    let cleaned = crate::normalize::clean_and_dedupe(raw);
    if cleaned.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    // 3) embed, one vector per opinion, order preserved
    let embed_start = std::time::Instant::now();
    let texts: Vec<String> = cleaned.iter().map(|c| c.cleaned_text.clone()).collect();
    let vectors = embed::embed_all(&*collab.embedder, &texts, cfg.embedding.batch_size).await?;
    info!(
        "Embedding completed - duration={:.2}s, vectors={}, dimension={}",
        embed_start.elapsed().as_secs_f32(),
        vectors.len(),
        vectors.first().map(|v| v.len()).unwrap_or(0)
    );

    // 4) group
    let groups = cluster::assign_groups(&req.grouping, &vectors, &*collab.numeric).await?;

    // 5) project
    let coords = project::project(&*collab.numeric, &vectors, req.reduction).await?;

    // assemble: ids in merged order, everything attached by index
    let opinions: Vec<Opinion> = cleaned
        .into_iter()
        .enumerate()
        .map(|(i, c)| Opinion {
            id: i as u32,
            source: c.source,
            raw_text: c.raw_text,
            cleaned_text: c.cleaned_text,
            score: c.score,
            vector: vectors[i].clone(),
            group_id: Some(groups[i]),
            x: coords[i][0],
            y: coords[i][1],
            is_stance: false,
            similarity_to_user: None,
        })
        .collect();

    let similarity_groups = cluster::group_count(&groups);
    let points: Vec<Point> = opinions.iter().map(Point::from_opinion).collect();
    debug!("Assembled {} points across {} groups", points.len(), similarity_groups);

    info!(
        "Analysis completed - topic={}, duration={:.2}s, opinions={}, groups={}",
        req.topic,
        pipeline_start.elapsed().as_secs_f32(),
        points.len(),
        similarity_groups
    );

    Ok(AnalysisResponse {
        total_opinions: points.len(),
        points,
        topic: req.topic.clone(),
        reduction: req.reduction,
        similarity_threshold: req.grouping.threshold(),
        similarity_groups,
        generated_at: Utc::now().to_rfc3339(),
    })
}

/// Stance pass over a previously computed opinion set. Group identity of the
/// existing points is never recomputed here.
pub async fn run_stance(
    collab: &Collaborators,
    cfg: &Config,
    req: &StanceRequest,
) -> Result<StanceResponse> {
    stance::position_stance(
        &*collab.embedder,
        &*collab.numeric,
        cfg.embedding.batch_size,
        req,
    )
    .await
}
