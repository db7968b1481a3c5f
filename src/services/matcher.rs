//! Preference matching: picks one candidate whose synopsis best fits a
//! free-text preference phrase.
//!
//! Candidates are ranked by TF-IDF cosine similarity against the phrase and
//! one of the `top_k` best is chosen uniformly at random, so asking again with
//! the same inputs can surface a different, equally good pick. When no
//! candidate has a synopsis any candidate may be returned.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tfidf::{cosine_similarity, TfidfVectorizer};

/// Default size of the group the final pick is drawn from
pub const DEFAULT_TOP_K: usize = 5;

/// Anything that can be matched by its descriptive text
pub trait Candidate {
    /// Descriptive text; empty when there is none
    fn synopsis(&self) -> &str;
}

/// How a candidate came to be selected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchBasis {
    /// Drawn from the top-ranked group; `score` is its cosine similarity
    Similarity { score: f64 },
    /// No candidate had a synopsis, so the pick was uniformly random
    RandomFallback,
}

/// A selected candidate, borrowed from the input slice
#[derive(Debug)]
pub struct Match<'a, T> {
    pub candidate: &'a T,
    /// Position of `candidate` in the input slice
    pub index: usize,
    pub basis: MatchBasis,
}

/// Scores every candidate that has a synopsis against `preference`
///
/// Returns `(candidate index, similarity)` pairs, best first. Candidates
/// without a synopsis are left out; an empty result means nothing could be
/// ranked.
pub fn rank<T: Candidate>(candidates: &[T], preference: &str) -> Vec<(usize, f64)> {
    let (positions, corpus): (Vec<usize>, Vec<&str>) = candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| (idx, candidate.synopsis()))
        .filter(|(_, synopsis)| !synopsis.trim().is_empty())
        .unzip();

    if corpus.is_empty() {
        return Vec::new();
    }

    let vectorizer = TfidfVectorizer::fit(&corpus);
    let query = vectorizer.transform(preference);

    let mut scored: Vec<(usize, f64)> = positions
        .into_iter()
        .zip(corpus.iter())
        .map(|(idx, document)| {
            let score = cosine_similarity(&query, &vectorizer.transform(document));
            (idx, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Picks one candidate for `preference`
///
/// - empty `candidates` → `None`
/// - no candidate has a synopsis → uniformly random candidate
/// - otherwise a uniformly random pick among the `top_k` most similar,
///   with `top_k` clamped to `1..=ranked candidates`
pub fn recommend<'a, T, R>(
    candidates: &'a [T],
    preference: &str,
    top_k: usize,
    rng: &mut R,
) -> Option<Match<'a, T>>
where
    T: Candidate,
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }

    let ranked = rank(candidates, preference);
    if ranked.is_empty() {
        let index = rng.random_range(0..candidates.len());
        tracing::debug!(
            candidates = candidates.len(),
            "No synopses to rank, picking at random"
        );
        return Some(Match {
            candidate: &candidates[index],
            index,
            basis: MatchBasis::RandomFallback,
        });
    }

    let pool_size = top_k.clamp(1, ranked.len());
    let &(index, score) = ranked[..pool_size].choose(rng)?;

    tracing::debug!(
        candidates = candidates.len(),
        ranked = ranked.len(),
        pool_size,
        index,
        score,
        "Candidate selected"
    );

    Some(Match {
        candidate: &candidates[index],
        index,
        basis: MatchBasis::Similarity { score },
    })
}
