//! TF-IDF vectorization and cosine similarity over short free-text documents.
//!
//! Tokens are lowercase runs of word characters at least two characters long,
//! with common English stop-words removed. Term weights are raw counts scaled
//! by a smoothed inverse document frequency, `ln((1 + n) / (1 + df)) + 1`, and
//! every vector is normalized to unit length.

use std::collections::{HashMap, HashSet};

/// English stop-words excluded from the vocabulary (sorted for binary search)
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot",
    "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do", "done",
    "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else", "elsewhere",
    "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything", "everywhere",
    "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five", "for", "former",
    "formerly", "forty", "found", "four", "from", "front", "full", "further", "get", "give", "go",
    "had", "has", "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred", "i", "ie",
    "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself", "keep", "last",
    "latter", "latterly", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile",
    "might", "mill", "mine", "more", "moreover", "most", "mostly", "move", "much", "must", "my",
    "myself", "name", "namely", "neither", "never", "nevertheless", "next", "nine", "no", "nobody",
    "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once",
    "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see",
    "seem", "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
    "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that",
    "the", "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Sparse term vector: vocabulary index → weight
pub type SparseVector = HashMap<usize, f64>;

/// Vocabulary and IDF weights learned from a corpus
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    /// term → dimension index
    vocabulary: HashMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and IDF weights of `documents`
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let n = documents.len() as f64;
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for document in documents {
            let unique: HashSet<String> = tokenize(document.as_ref()).into_iter().collect();
            for term in unique {
                let next = vocabulary.len();
                let idx = *vocabulary.entry(term).or_insert(next);
                if idx == doc_freq.len() {
                    doc_freq.push(0);
                }
                doc_freq[idx] += 1;
            }
        }

        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    #[cfg(test)]
    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Unit-length TF-IDF vector of `text`; terms outside the vocabulary are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *vector.entry(idx).or_insert(0.0) += self.idf[idx];
            }
        }

        let norm = norm(&vector);
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Cosine of the angle between two vectors; zero when either is empty
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(idx, weight)| large.get(idx).map(|other| weight * other))
        .sum();

    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

fn norm(vector: &SparseVector) -> f64 {
    vector.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Lowercases, splits on non-word characters, drops short tokens and stop-words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}
