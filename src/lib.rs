//! opinion_map - maps public opinion on a topic.
//!
//! Given a free-text topic, the pipeline searches a roster of discussion
//! communities concurrently, cleans and deduplicates what comes back, embeds
//! each opinion through an external model, groups opinions by cosine
//! similarity (connected components or delegated clustering), and projects
//! the vectors to 2D for visualization. A second pass positions one user
//! statement ("stance") against an existing map without disturbing it.
//!
//! The embedding model, the platform search API, and the numeric reduction/
//! clustering routines are external collaborators behind the
//! [`embed::TextEmbedder`], [`fetch::DiscussionPlatform`], and
//! [`numeric::NumericBackend`] traits; this crate owns the pipeline, not
//! their internals.

pub mod api_types;
pub mod cluster;
pub mod config;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod numeric;
pub mod orchestrator;
pub mod out_models;
pub mod project;
pub mod similarity;
pub mod stance;

pub use config::Config;
pub use error::PipelineError;
pub use models::{AnalysisRequest, GroupingStrategy, Opinion, RawOpinion, Reduction, StanceRequest};
pub use orchestrator::{run_analysis, run_stance, Collaborators};
pub use out_models::{AnalysisResponse, Point, StanceResponse};
