//! Shared in-memory collaborators for the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use opinion_map::config::{CollectorConfig, Config};
use opinion_map::embed::TextEmbedder;
use opinion_map::fetch::DiscussionPlatform;
use opinion_map::models::{RawOpinion, Reduction};
use opinion_map::numeric::{ClusterMethod, NumericBackend};
use opinion_map::orchestrator::Collaborators;

pub const EMBED_DIM: usize = 8;

/// What one scripted source does when searched.
pub enum SourceBehavior {
    /// Returns these texts with descending scores.
    Items(Vec<String>),
    /// Fails immediately.
    Fail,
    /// Never completes; only the collector's timeout ends it.
    Hang,
}

pub struct ScriptedPlatform {
    pub behaviors: HashMap<String, SourceBehavior>,
}

#[async_trait]
impl DiscussionPlatform for ScriptedPlatform {
    async fn search(
        &self,
        community: &str,
        _topic: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<RawOpinion>> {
        match self.behaviors.get(community) {
            Some(SourceBehavior::Items(texts)) => Ok(texts
                .iter()
                .take(limit)
                .enumerate()
                .map(|(i, text)| RawOpinion {
                    text: text.clone(),
                    source: community.to_string(),
                    score: 100 - i as i64,
                })
                .collect()),
            Some(SourceBehavior::Fail) => anyhow::bail!("simulated outage"),
            Some(SourceBehavior::Hang) | None => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Deterministic embedder: each component is a seeded hash of the text,
/// mapped into [-1, 1]. Identical texts get identical vectors.
pub struct HashEmbedder;

#[async_trait]
impl TextEmbedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        EMBED_DIM
    }
}

pub fn embed_one(text: &str) -> Vec<f32> {
    (0..EMBED_DIM)
        .map(|d| {
            let h = xxh3_64_with_seed(text.as_bytes(), d as u64);
            (h as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
        })
        .collect()
}

/// Numeric backend that echoes each vector's first two components as its 2D
/// coordinates (so coordinates are a pure function of the vector) and labels
/// clusters by the sign of the first component. Hdbscan marks everything as
/// noise to exercise the sentinel remap.
pub struct PlanarNumeric;

#[async_trait]
impl NumericBackend for PlanarNumeric {
    async fn reduce(
        &self,
        vectors: &[Vec<f32>],
        _method: Reduction,
    ) -> anyhow::Result<Vec<[f32; 2]>> {
        Ok(vectors.iter().map(|v| [v[0], v[1]]).collect())
    }

    async fn cluster(
        &self,
        vectors: &[Vec<f32>],
        method: ClusterMethod,
    ) -> anyhow::Result<Vec<i64>> {
        Ok(match method {
            ClusterMethod::KMeans { .. } => vectors
                .iter()
                .map(|v| if v[0] >= 0.0 { 4 } else { 9 })
                .collect(),
            ClusterMethod::Hdbscan { .. } => vec![-1; vectors.len()],
        })
    }
}

/// Config wired for tests: the given roster, a 1s source budget.
pub fn test_config(sources: &[&str]) -> Config {
    let mut cfg = Config::default();
    cfg.collector = CollectorConfig {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        per_source_timeout_secs: 1,
        ..CollectorConfig::default()
    };
    cfg
}

pub fn collaborators(platform: ScriptedPlatform) -> Collaborators {
    Collaborators {
        platform: Arc::new(platform),
        embedder: Arc::new(HashEmbedder),
        numeric: Arc::new(PlanarNumeric),
    }
}

/// Genuinely distinct opinion sentences. Templated texts that differ by one
/// word would trip the character-bigram near-duplicate filter, so each entry
/// here is worded independently.
pub const SENTENCES: [&str; 10] = [
    "My commute was two unpaid hours a day and nobody at the office noticed the difference.",
    "Deep focus died the day we adopted open floor plans, long before laptops went home.",
    "Office leases are sunk costs and executives hate admitting the building is empty.",
    "Team rituals like friday demos survive video calls just fine if anyone bothers to host them.",
    "Half my calendar is meetings that exist because writing a memo felt like too much work.",
    "New hires learn by overhearing senior people argue, and that channel simply vanished.",
    "Whiteboards beat screen sharing for design arguments and it is not even close.",
    "The quiet promotion penalty for staying remote is real, measured, and rarely discussed.",
    "Customer support teams were distributed for a decade before anyone called it a trend.",
    "Salary bands tied to zip codes are the loudest admission that pay was never about output.",
];

/// The `n` first sentences from the pool, owned.
pub fn sentences(n: usize) -> Vec<String> {
    SENTENCES.iter().take(n).map(|s| s.to_string()).collect()
}
