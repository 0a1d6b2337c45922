//! Opinion collection: one concurrent search task per configured community,
//! each under a fixed wall-clock budget, merged in completion order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api_types::ApiListing;
use crate::config::CollectorConfig;
use crate::corpus;
use crate::models::RawOpinion;

/// Fewest items asked of any single source, however small the request.
const MIN_PER_SOURCE: usize = 3;

/// Boundary to the discussion platform. One call searches one community; the
/// adapter owns request building and response decoding, nothing else.
#[async_trait]
pub trait DiscussionPlatform: Send + Sync {
    async fn search(
        &self,
        community: &str,
        topic: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<RawOpinion>>;
}

/// Adapter for the platform's public JSON search API
/// (`GET {base}/r/{community}/search.json`).
pub struct PlatformApiClient {
    client: Client,
    api_base: String,
    user_agent: String,
}

impl PlatformApiClient {
    pub fn new(client: Client, cfg: &CollectorConfig) -> Self {
        PlatformApiClient {
            client,
            api_base: cfg.api_base.clone(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

#[async_trait]
impl DiscussionPlatform for PlatformApiClient {
    async fn search(
        &self,
        community: &str,
        topic: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<RawOpinion>> {
        let url = format!(
            "{}/r/{}/search.json",
            self.api_base.trim_end_matches('/'),
            community
        );
        let start = std::time::Instant::now();
        debug!("Source search starting - community={}, topic={}", community, topic);

        let limit_param = limit.to_string();
        let listing: ApiListing = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", topic),
                ("limit", limit_param.as_str()),
                ("sort", "relevance"),
                ("restrict_sr", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let opinions: Vec<RawOpinion> = listing
            .data
            .children
            .into_iter()
            .map(|child| {
                let sub = child.data;
                // Link-only posts carry the opinion in the title.
                let text = if sub.selftext.trim().is_empty() {
                    sub.title
                } else {
                    sub.selftext
                };
                RawOpinion {
                    text,
                    source: community.to_string(),
                    score: sub.score,
                }
            })
            .collect();

        info!(
            "Source search completed - community={}, duration={:.2}s, items={}",
            community,
            start.elapsed().as_secs_f32(),
            opinions.len()
        );
        Ok(opinions)
    }
}

/// Fans a topic out to every configured source concurrently and merges the
/// survivors. Bounded parallelism is one task per source; the per-source
/// timeout is the only cancellation primitive. Returns the fallback corpus
/// only when every source fails or times out.
pub struct Collector {
    platform: Arc<dyn DiscussionPlatform>,
    sources: Vec<String>,
    per_source_timeout: Duration,
}

impl Collector {
    pub fn new(platform: Arc<dyn DiscussionPlatform>, cfg: &CollectorConfig) -> Self {
        Collector {
            platform,
            sources: cfg.sources.clone(),
            per_source_timeout: Duration::from_secs(cfg.per_source_timeout_secs),
        }
    }

    /// Merged raw records, at most `max_items`, in task completion order.
    /// Opinion ids are assigned downstream, after dedup, in this order.
    pub async fn collect(&self, topic: &str, max_items: usize) -> Vec<RawOpinion> {
        let start = std::time::Instant::now();
        let per_source = MIN_PER_SOURCE.max(max_items / self.sources.len().max(1));
        info!(
            "Collection starting - topic={}, sources={}, per_source={}, budget={}s",
            topic,
            self.sources.len(),
            per_source,
            self.per_source_timeout.as_secs()
        );

        let mut tasks = FuturesUnordered::new();
        for community in &self.sources {
            let platform = Arc::clone(&self.platform);
            let community = community.clone();
            let topic = topic.to_string();
            let budget = self.per_source_timeout;
            tasks.push(tokio::spawn(async move {
                match timeout(budget, platform.search(&community, &topic, per_source)).await {
                    Ok(Ok(items)) => Some((community, items)),
                    Ok(Err(e)) => {
                        warn!("Source failed - community={}, error={}", community, e);
                        None
                    }
                    Err(_) => {
                        warn!(
                            "Source timed out - community={}, budget={}s",
                            community,
                            budget.as_secs()
                        );
                        None
                    }
                }
            }));
        }

        let mut merged: Vec<RawOpinion> = Vec::new();
        let mut succeeded = 0usize;
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(Some((community, items))) => {
                    debug!("Source merged - community={}, items={}", community, items.len());
                    succeeded += 1;
                    merged.extend(items);
                }
                Ok(None) => {}
                Err(e) => warn!("Source task panicked - error={}", e),
            }
        }

        if merged.is_empty() {
            warn!(
                "All {} sources failed or timed out - substituting sample corpus",
                self.sources.len()
            );
            merged = corpus::fallback_opinions();
        }

        merged.truncate(max_items);
        info!(
            "Collection completed - duration={:.2}s, sources_ok={}/{}, items={}",
            start.elapsed().as_secs_f32(),
            succeeded,
            self.sources.len(),
            merged.len()
        );
        merged
    }
}
