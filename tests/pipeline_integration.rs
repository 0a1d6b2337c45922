//! End-to-end pipeline runs against scripted collaborators.

mod common;

use common::{collaborators, sentences, test_config, ScriptedPlatform, SourceBehavior, SENTENCES};
use std::collections::HashMap;

use opinion_map::corpus;
use opinion_map::models::{AnalysisRequest, GroupingStrategy, Reduction};
use opinion_map::orchestrator::run_analysis;
use opinion_map::PipelineError;

const ROSTER: [&str; 10] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
];

fn request() -> AnalysisRequest {
    AnalysisRequest {
        topic: "remote work".into(),
        max_posts: 50,
        reduction: Reduction::Umap,
        grouping: GroupingStrategy::ThresholdGraph { threshold: 0.7 },
    }
}

#[derive(Clone, Copy)]
enum Rest {
    Fail,
    Hang,
}

fn platform_with(ok: &[(&str, Vec<String>)], rest: Rest) -> ScriptedPlatform {
    let mut behaviors: HashMap<String, SourceBehavior> = HashMap::new();
    for (name, texts) in ok {
        behaviors.insert(name.to_string(), SourceBehavior::Items(texts.clone()));
    }
    for name in ROSTER {
        behaviors.entry(name.to_string()).or_insert(match rest {
            Rest::Fail => SourceBehavior::Fail,
            Rest::Hang => SourceBehavior::Hang,
        });
    }
    ScriptedPlatform { behaviors }
}

#[tokio::test(start_paused = true)]
async fn seven_timeouts_still_succeed_with_three_survivors() {
    let shared = SENTENCES[6].to_string();
    let ok: Vec<(&str, Vec<String>)> = vec![
        (
            "alpha",
            vec![SENTENCES[0].into(), SENTENCES[1].into(), shared.clone()],
        ),
        (
            "echo",
            vec![SENTENCES[2].into(), SENTENCES[3].into(), shared.clone()],
        ),
        ("juliet", vec![SENTENCES[4].into(), SENTENCES[5].into()]),
    ];
    let collab = collaborators(platform_with(&ok, Rest::Hang));
    let cfg = test_config(&ROSTER);

    let resp = run_analysis(&collab, &cfg, &request()).await.unwrap();

    // 3 + 3 + 2 items minus the cross-source duplicate.
    assert_eq!(resp.total_opinions, 7);
    assert_eq!(resp.points.len(), 7);
    for p in &resp.points {
        assert!(matches!(p.source.as_str(), "alpha" | "echo" | "juliet"));
        assert!(p.similarity_group.is_some());
    }
    // The duplicate survived exactly once.
    let shared_count = resp.points.iter().filter(|p| p.text == shared).count();
    assert_eq!(shared_count, 1);
}

#[tokio::test(start_paused = true)]
async fn total_failure_falls_back_to_sample_corpus() {
    let collab = collaborators(platform_with(&[], Rest::Fail));
    let cfg = test_config(&ROSTER);

    let resp = run_analysis(&collab, &cfg, &request()).await.unwrap();

    assert_eq!(resp.total_opinions, corpus::fallback_opinions().len());
    assert!(resp
        .points
        .iter()
        .all(|p| p.source == corpus::FALLBACK_SOURCE));
    assert!(resp.similarity_groups >= 1);
}

#[tokio::test(start_paused = true)]
async fn nothing_survives_cleaning_is_a_request_error() {
    let ok: Vec<(&str, Vec<String>)> = vec![(
        "alpha",
        vec!["too short".into(), "also tiny".into(), "nope".into()],
    )];
    let collab = collaborators(platform_with(&ok, Rest::Fail));
    let cfg = test_config(&ROSTER);

    let err = run_analysis(&collab, &cfg, &request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput));
}

#[tokio::test(start_paused = true)]
async fn validation_runs_before_any_stage() {
    // A hanging roster would stall for the full budget if collection started.
    let collab = collaborators(platform_with(&[], Rest::Hang));
    let cfg = test_config(&ROSTER);
    let mut req = request();
    req.max_posts = 5;

    let err = run_analysis(&collab, &cfg, &req).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
}

#[tokio::test(start_paused = true)]
async fn coordinates_are_a_function_of_the_vector_not_the_position() {
    // Five texts: within the per-source ask, so both orderings return all.
    let texts = sentences(5);
    let forward: Vec<(&str, Vec<String>)> = vec![("alpha", texts.clone())];
    let reversed: Vec<(&str, Vec<String>)> =
        vec![("alpha", texts.iter().rev().cloned().collect())];

    let cfg = test_config(&ROSTER);
    let a = run_analysis(
        &collaborators(platform_with(&forward, Rest::Fail)),
        &cfg,
        &request(),
    )
    .await
    .unwrap();
    let b = run_analysis(
        &collaborators(platform_with(&reversed, Rest::Fail)),
        &cfg,
        &request(),
    )
    .await
    .unwrap();

    // The planar backend projects each vector to its own first components, so
    // a given text must land at the same spot regardless of input order.
    for p in &a.points {
        let twin = b
            .points
            .iter()
            .find(|q| q.text == p.text)
            .expect("same text present in both runs");
        assert_eq!((p.x, p.y), (twin.x, twin.y));
    }
}

#[tokio::test(start_paused = true)]
async fn delegated_kmeans_labels_are_dense() {
    let ok: Vec<(&str, Vec<String>)> = vec![("alpha", sentences(5))];
    let collab = collaborators(platform_with(&ok, Rest::Fail));
    let cfg = test_config(&ROSTER);
    let mut req = request();
    req.grouping = GroupingStrategy::KMeans { n_clusters: 2 };

    let resp = run_analysis(&collab, &cfg, &req).await.unwrap();

    // Raw labels 4/9 from the backend come out densely renumbered from 0.
    let mut seen: Vec<u32> = resp
        .points
        .iter()
        .map(|p| p.similarity_group.unwrap())
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert!(seen.len() <= 2);
    assert_eq!(seen[0], 0);
    assert_eq!(resp.similarity_groups, seen.len());
}

#[tokio::test(start_paused = true)]
async fn all_noise_points_share_one_dedicated_group() {
    let ok: Vec<(&str, Vec<String>)> = vec![("alpha", sentences(5))];
    let collab = collaborators(platform_with(&ok, Rest::Fail));
    let cfg = test_config(&ROSTER);
    let mut req = request();
    req.grouping = GroupingStrategy::Hdbscan { min_cluster_size: 3 };

    let resp = run_analysis(&collab, &cfg, &req).await.unwrap();

    // The backend labels everything -1; nothing may surface as unassigned.
    assert!(resp.points.iter().all(|p| p.similarity_group == Some(0)));
    assert_eq!(resp.similarity_groups, 1);
}

#[tokio::test(start_paused = true)]
async fn embedding_echo_is_present_and_truncated() {
    let ok: Vec<(&str, Vec<String>)> = vec![("alpha", sentences(1))];
    let collab = collaborators(platform_with(&ok, Rest::Fail));
    let cfg = test_config(&ROSTER);

    let resp = run_analysis(&collab, &cfg, &request()).await.unwrap();
    for p in &resp.points {
        assert!(!p.embedding.is_empty());
        assert!(p.embedding.len() <= opinion_map::out_models::EMBEDDING_ECHO_LEN);
    }
}
