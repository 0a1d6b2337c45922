//! 2D projection via the numeric backend, with a documented fallback for
//! point counts the requested method cannot handle.
//!
//! Fallback policy:
//! - 0 vectors: error (the empty-input check upstream should make this
//!   unreachable, but the guard stays).
//! - 1 vector: the point goes to the origin without a backend call; no
//!   reduction method can orient a single point anyway.
//! - fewer than [`MIN_NEIGHBORHOOD_POINTS`] vectors with a neighborhood-based
//!   method (umap, tsne): the call is downgraded to pca, which only needs two
//!   points' worth of variance.
//!
//! Output order always matches input order, so coordinates attach to the
//! originating opinion by index.

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::models::Reduction;
use crate::numeric::NumericBackend;

/// Below this count, neighborhood-based methods have no meaningful neighbor
/// graph to build.
pub const MIN_NEIGHBORHOOD_POINTS: usize = 4;

pub async fn project(
    backend: &dyn NumericBackend,
    vectors: &[Vec<f32>],
    requested: Reduction,
) -> Result<Vec<[f32; 2]>> {
    match vectors.len() {
        0 => Err(PipelineError::Projection("no vectors to project".into())),
        1 => {
            debug!("Single point - placing at origin without reduction call");
            Ok(vec![[0.0, 0.0]])
        }
        n => {
            let method = if n < MIN_NEIGHBORHOOD_POINTS && requested.is_neighborhood_based() {
                warn!(
                    "Too few points for {} - falling back to pca, points={}",
                    requested, n
                );
                Reduction::Pca
            } else {
                requested
            };

            let coords = backend
                .reduce(vectors, method)
                .await
                .map_err(|e| PipelineError::Projection(e.to_string()))?;
            if coords.len() != n {
                return Err(PipelineError::Projection(format!(
                    "backend returned {} coordinates for {} vectors",
                    coords.len(),
                    n
                )));
            }
            Ok(coords)
        }
    }
}
