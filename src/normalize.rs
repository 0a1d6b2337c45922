//! Text cleanup and near-duplicate removal, run once after collection so its
//! output size bounds the embedding batch work. Pure and single-threaded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{CleanedOpinion, RawOpinion};

/// Length gates applied after cleaning, in characters. Below the floor the
/// text is too trivial to embed; above the ceiling it is usually a pasted
/// article, not an opinion.
pub const MIN_CHARS: usize = 20;
pub const MAX_CHARS: usize = 500;

/// Character-bigram Jaccard overlap above which two cleaned texts count as the
/// same opinion.
pub const NEAR_DUP_OVERLAP: f32 = 0.90;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*>\s*").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips platform markup and normalizes whitespace. Returns `None` when the
/// cleaned text falls outside the length gates.
pub fn clean_text(raw: &str) -> Option<String> {
    // The platform's JSON escapes a handful of entities inside selftext.
    let s = raw
        .replace("&amp;", "&")
        .replace("&gt;", ">")
        .replace("&lt;", "<");
    let s = URL_RE.replace_all(&s, " ");
    let s = QUOTE_RE.replace_all(&s, " ");
    let s = s.replace(['*', '_', '`', '~'], "");
    let s: String = s.nfc().collect();
    let s = WS_RE.replace_all(&s, " ").trim().to_string();

    let chars = s.chars().count();
    if !(MIN_CHARS..=MAX_CHARS).contains(&chars) {
        return None;
    }
    Some(s)
}

/// Casefolded, whitespace-collapsed form used for duplicate comparison only.
fn fold(s: &str) -> String {
    let lowered = s.to_lowercase();
    WS_RE.replace_all(&lowered, " ").trim().to_string()
}

fn char_bigrams(s: &str) -> HashSet<[char; 2]> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| [w[0], w[1]]).collect()
}

fn bigram_overlap(a: &HashSet<[char; 2]>, b: &HashSet<[char; 2]>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let inter = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    if union == 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Cleans every raw record and drops near-duplicates. First occurrence wins,
/// so later duplicates never consume an embedding call or an id.
pub fn clean_and_dedupe(raw: Vec<RawOpinion>) -> Vec<CleanedOpinion> {
    let total = raw.len();
    let mut kept: Vec<CleanedOpinion> = Vec::with_capacity(total);
    let mut seen_hashes: HashSet<u64> = HashSet::with_capacity(total);
    let mut kept_bigrams: Vec<HashSet<[char; 2]>> = Vec::with_capacity(total);
    let mut too_short_or_long = 0usize;
    let mut duplicates = 0usize;

    for r in raw {
        let Some(cleaned) = clean_text(&r.text) else {
            too_short_or_long += 1;
            continue;
        };

        let folded = fold(&cleaned);
        let fingerprint = xxh3_64(folded.as_bytes());
        if !seen_hashes.insert(fingerprint) {
            duplicates += 1;
            continue;
        }

        let bigrams = char_bigrams(&folded);
        if kept_bigrams
            .iter()
            .any(|prior| bigram_overlap(prior, &bigrams) > NEAR_DUP_OVERLAP)
        {
            duplicates += 1;
            continue;
        }

        kept_bigrams.push(bigrams);
        kept.push(CleanedOpinion {
            source: r.source,
            raw_text: r.text,
            cleaned_text: cleaned,
            score: r.score,
        });
    }

    if duplicates > 0 || too_short_or_long > 0 {
        info!(
            "Normalization - kept={}, dropped_length={}, dropped_duplicate={}, input={}",
            kept.len(),
            too_short_or_long,
            duplicates,
            total
        );
    } else {
        debug!("Normalization - kept all {} records", kept.len());
    }

    kept
}
