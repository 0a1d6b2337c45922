//! Similarity grouping: connected components of the cosine-similarity graph,
//! or labels delegated to the numeric clustering backend. Either way the
//! output is one dense group id per opinion, numbered from 0 in order of each
//! group's first member, so identical input always yields identical numbering.

use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::GroupingStrategy;
use crate::numeric::{ClusterMethod, NumericBackend};
use crate::similarity::cosine;

/// Arena-style union-find over dense indices 0..n.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            // Path halving keeps trees shallow without recursion.
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Renumbers arbitrary labels densely from 0 in order of first occurrence.
/// A noise sentinel (`-1`) is remapped like any other label, so all noise
/// points end up sharing one dedicated group rather than staying unassigned.
fn dense_relabel(labels: impl IntoIterator<Item = i64>) -> Vec<u32> {
    let mut mapping: Vec<(i64, u32)> = Vec::new();
    labels
        .into_iter()
        .map(|raw| {
            if let Some(&(_, dense)) = mapping.iter().find(|(k, _)| *k == raw) {
                dense
            } else {
                let dense = mapping.len() as u32;
                mapping.push((raw, dense));
                dense
            }
        })
        .collect()
}

/// Connected components of the graph whose edges are pairs with cosine
/// similarity at or above `threshold`. O(N²) over the pair set, which is fine
/// for the request-capped N. A threshold of 1.0 leaves everything but exact
/// vector duplicates in singleton groups; a threshold at or below the
/// smallest observed similarity collapses everything into one group.
pub fn threshold_groups(vectors: &[Vec<f32>], threshold: f32) -> Vec<u32> {
    let n = vectors.len();
    let mut uf = UnionFind::new(n);
    let mut edges = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if cosine(&vectors[i], &vectors[j]) >= threshold {
                uf.union(i, j);
                edges += 1;
            }
        }
    }
    let groups = dense_relabel((0..n).map(|i| uf.find(i) as i64));
    debug!(
        "Threshold grouping - points={}, threshold={}, edges={}, groups={}",
        n,
        threshold,
        edges,
        group_count(&groups)
    );
    groups
}

/// Number of distinct groups in a dense labeling.
pub fn group_count(groups: &[u32]) -> usize {
    groups.iter().map(|&g| g as i64).max().map_or(0, |m| m as usize + 1)
}

/// Assigns every opinion a dense group id using the requested strategy.
pub async fn assign_groups(
    strategy: &GroupingStrategy,
    vectors: &[Vec<f32>],
    backend: &dyn NumericBackend,
) -> Result<Vec<u32>> {
    let start = std::time::Instant::now();
    let groups = match *strategy {
        GroupingStrategy::ThresholdGraph { threshold } => threshold_groups(vectors, threshold),
        GroupingStrategy::KMeans { n_clusters } => {
            delegated_groups(backend, vectors, ClusterMethod::KMeans { n_clusters }).await?
        }
        GroupingStrategy::Hdbscan { min_cluster_size } => {
            delegated_groups(backend, vectors, ClusterMethod::Hdbscan { min_cluster_size }).await?
        }
    };
    info!(
        "Grouping completed - duration={:.2}s, points={}, groups={}",
        start.elapsed().as_secs_f32(),
        vectors.len(),
        group_count(&groups)
    );
    Ok(groups)
}

async fn delegated_groups(
    backend: &dyn NumericBackend,
    vectors: &[Vec<f32>],
    method: ClusterMethod,
) -> Result<Vec<u32>> {
    let labels = backend
        .cluster(vectors, method)
        .await
        .map_err(|e| PipelineError::Grouping(e.to_string()))?;
    if labels.len() != vectors.len() {
        return Err(PipelineError::Grouping(format!(
            "backend returned {} labels for {} vectors",
            labels.len(),
            vectors.len()
        )));
    }
    Ok(dense_relabel(labels))
}
