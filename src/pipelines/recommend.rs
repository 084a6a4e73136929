//! Batch recomputation of the recommendation graph.
//!
//! Runs over the full published corpus, ranks every other fact by text
//! similarity and pushes the top n per fact. Each run fully replaces the
//! recommendations of the facts it processes.

use std::cmp::Ordering;

use log::{debug, error, info};

use crate::backend::ContentStore;
use crate::error::SyncError;
use crate::model::{RecommendationEdge, SnackRecord};
use crate::similarity::TextSimilarity;

/// Markers editors prefix claims and corrections with; they carry no
/// content and would dominate short comparison texts.
const EDITORIAL_MARKERS: &[&str] = &["Behauptung:", "Falsch:", "Claim:", "False:"];

/// Recompute recommendations for the whole corpus, pushing `top_n` related
/// facts per fact. Returns how many edges were pushed.
pub async fn run(
    store: &dyn ContentStore,
    engine: &dyn TextSimilarity,
    top_n: usize,
) -> Result<usize, SyncError> {
    let corpus = store.get_records(-1).await?;
    info!("Recomputing recommendations over {} facts", corpus.len());

    let texts: Vec<String> = corpus.iter().map(comparison_text).collect();
    let mut pushed = 0;

    for (index, fact) in corpus.iter().enumerate() {
        if fact.id.is_empty() {
            debug!("Skipping '{}': no backend id", fact.headline);
            continue;
        }

        let recommends: Vec<String> = top_related(index, &texts, engine, top_n)
            .into_iter()
            .map(|related| corpus[related].id.clone())
            .filter(|id| !id.is_empty())
            .collect();

        let edge = RecommendationEdge {
            fact: fact.id.clone(),
            recommends,
        };
        match store.create_recommendation(&edge).await {
            Ok(()) => pushed += 1,
            Err(err) => error!("Could not push recommendations for {}: {err}", edge.fact),
        }
    }

    Ok(pushed)
}

/// The text a fact is compared by: headline plus the first sentence of the
/// fact body, markers stripped, hyphens normalized to spaces.
pub(crate) fn comparison_text(record: &SnackRecord) -> String {
    let mut text = format!("{} {}", record.headline, first_sentence(&record.snack));
    for marker in EDITORIAL_MARKERS {
        text = text.replace(marker, "");
    }
    text.replace('-', " ")
}

fn first_sentence(text: &str) -> &str {
    match text.find(['.', '!', '?']) {
        Some(end) => &text[..=end],
        None => text,
    }
}

/// Indices of the `n` most similar other texts, most similar first. The
/// sort is stable, so equal scores keep corpus order; the text itself is
/// ranked along (it scores highest) and then discarded.
pub(crate) fn top_related(
    index: usize,
    texts: &[String],
    engine: &dyn TextSimilarity,
    n: usize,
) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = texts
        .iter()
        .enumerate()
        .map(|(other, text)| (other, engine.similarity(&texts[index], text)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(n + 1)
        .map(|(other, _)| other)
        .filter(|&other| other != index)
        .take(n)
        .collect()
}
