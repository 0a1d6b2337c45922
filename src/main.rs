use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use opinion_map::config::Config;
use opinion_map::embed::HttpEmbedder;
use opinion_map::fetch::PlatformApiClient;
use opinion_map::models::{AnalysisRequest, GroupingStrategy, Reduction, StanceRequest};
use opinion_map::numeric::NumericServiceClient;
use opinion_map::orchestrator::{run_analysis, run_stance, Collaborators};
use opinion_map::out_models::AnalysisResponse;

/// Opinion Map - maps public opinion on a topic onto a 2D similarity chart
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (overrides OPINION_MAP_CONFIG environment variable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a fresh analysis for a topic and write the response JSON
    Analyze {
        /// Topic to search the discussion platform for
        #[arg(short, long)]
        topic: String,

        /// Target opinion count across all sources (10-200)
        #[arg(long, default_value_t = 50)]
        max_posts: u32,

        /// Similarity threshold for the connected-components grouping (0.1-0.9)
        #[arg(long, default_value_t = 0.7)]
        threshold: f32,

        /// 2D reduction method
        #[arg(long, value_enum, default_value_t = ReductionArg::Umap)]
        reduction: ReductionArg,

        /// Grouping strategy
        #[arg(long, value_enum, default_value_t = GroupingArg::ThresholdGraph)]
        grouping: GroupingArg,

        /// Cluster count (kmeans) or minimum cluster size (hdbscan)
        #[arg(long)]
        n_groups: Option<usize>,

        /// Output file for the analysis response
        #[arg(short, long, default_value = "out/analysis.json")]
        output: PathBuf,
    },
    /// Position a user statement against a prior analysis
    Stance {
        /// Topic the prior analysis was run for
        #[arg(short, long)]
        topic: String,

        /// The user's statement to position
        #[arg(short, long)]
        statement: String,

        /// Prior analysis response JSON (output of `analyze`)
        #[arg(short, long)]
        points: PathBuf,

        /// 2D reduction method
        #[arg(long, value_enum, default_value_t = ReductionArg::Umap)]
        reduction: ReductionArg,

        /// Output file for the stance response
        #[arg(short, long, default_value = "out/stance.json")]
        output: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ReductionArg {
    Umap,
    Pca,
    Tsne,
}

impl From<ReductionArg> for Reduction {
    fn from(value: ReductionArg) -> Self {
        match value {
            ReductionArg::Umap => Reduction::Umap,
            ReductionArg::Pca => Reduction::Pca,
            ReductionArg::Tsne => Reduction::Tsne,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum GroupingArg {
    ThresholdGraph,
    Kmeans,
    Hdbscan,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let cfg = Config::resolve(args.config.as_deref()).context("resolving config")?;
    let client = reqwest::Client::builder().build()?;

    let collab = Collaborators {
        platform: Arc::new(PlatformApiClient::new(client.clone(), &cfg.collector)),
        embedder: Arc::new(HttpEmbedder::new(client.clone(), &cfg.embedding)),
        numeric: Arc::new(NumericServiceClient::new(client, &cfg.numeric.api_base)),
    };

    match args.command {
        Command::Analyze {
            topic,
            max_posts,
            threshold,
            reduction,
            grouping,
            n_groups,
            output,
        } => {
            let grouping = match grouping {
                GroupingArg::ThresholdGraph => GroupingStrategy::ThresholdGraph { threshold },
                GroupingArg::Kmeans => GroupingStrategy::KMeans {
                    n_clusters: n_groups.unwrap_or(5),
                },
                GroupingArg::Hdbscan => GroupingStrategy::Hdbscan {
                    min_cluster_size: n_groups.unwrap_or(3),
                },
            };
            let req = AnalysisRequest {
                topic,
                max_posts,
                reduction: reduction.into(),
                grouping,
            };

            let resp = match run_analysis(&collab, &cfg, &req).await {
                Ok(resp) => resp,
                Err(e) => {
                    error!("Analysis failed - {}", e);
                    return Err(e.into());
                }
            };
            write_json(&output, &resp)?;
            info!(
                "Wrote {} - opinions={}, groups={}",
                output.display(),
                resp.total_opinions,
                resp.similarity_groups
            );
        }
        Command::Stance {
            topic,
            statement,
            points,
            reduction,
            output,
        } => {
            let prior: AnalysisResponse = serde_json::from_slice(
                &std::fs::read(&points)
                    .with_context(|| format!("reading prior analysis {}", points.display()))?,
            )
            .with_context(|| format!("decoding prior analysis {}", points.display()))?;

            let req = StanceRequest {
                topic,
                statement,
                existing_points: prior.points,
                reduction: reduction.into(),
                similarity_threshold: prior.similarity_threshold,
            };

            let resp = match run_stance(&collab, &cfg, &req).await {
                Ok(resp) => resp,
                Err(e) => {
                    error!("Stance positioning failed - {}", e);
                    return Err(e.into());
                }
            };
            write_json(&output, &resp)?;
            info!(
                "Wrote {} - stance_similarity={:.3}, similar_points={}",
                output.display(),
                resp.user_stance_similarity,
                resp.similar_points_count
            );
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
