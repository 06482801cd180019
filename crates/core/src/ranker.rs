use crate::models::{ExtractedDocument, RankedEntry};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Lowercased runs of two or more word characters; single characters and
    // punctuation carry no ranking signal.
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|matched| matched.as_str().to_string())
        .collect()
}

/// Vocabulary and inverse document frequencies for one corpus.
///
/// Built fresh per ranking call; the vocabulary is corpus-specific, so nothing
/// here survives across calls.
#[derive(Debug)]
pub struct TermWeightSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TermWeightSpace {
    /// Fit the vocabulary and smoothed IDF weights `ln((1+n)/(1+df)) + 1`
    /// over every entry of the corpus, query included.
    pub fn fit(corpus: &[Vec<String>]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for tokens in corpus {
            let distinct: BTreeSet<&String> = tokens.iter().collect();
            for term in distinct {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let corpus_size = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());

        // BTreeMap iteration yields sorted terms, so vector layout is
        // deterministic across calls.
        for (index, (term, frequency)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(((1.0 + corpus_size) / (1.0 + frequency as f64)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Term counts scaled by IDF, L2-normalized. Tokens outside the
    /// vocabulary are ignored.
    pub fn weight_vector(&self, tokens: &[String]) -> Vec<f64> {
        let mut weights = vec![0f64; self.idf.len()];
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                weights[index] += self.idf[index];
            }
        }

        let magnitude = weights.iter().map(|value| value * value).sum::<f64>().sqrt();
        if magnitude > 0.0 {
            for value in &mut weights {
                *value /= magnitude;
            }
        }

        weights
    }
}

/// Cosine similarity with the zero-norm rule made explicit: when either
/// vector has no magnitude the similarity is 0, never a division error.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> f64 {
    let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f64>();
    let left_norm = left.iter().map(|value| value * value).sum::<f64>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f64>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    (dot / (left_norm * right_norm)).clamp(0.0, 1.0)
}

/// Rank documents against the query by TF-IDF cosine similarity.
///
/// Unusable documents (empty trimmed text) are dropped before the corpus is
/// assembled and never receive a score. An empty trimmed query or an empty
/// filtered set yields an empty ranking. The sort is stable: equal scores
/// keep submission order, and ranks are dense starting at 1.
pub fn rank(query: &str, documents: &[ExtractedDocument]) -> Vec<RankedEntry> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let usable: Vec<&ExtractedDocument> = documents
        .iter()
        .filter(|document| document.is_usable())
        .collect();
    if usable.is_empty() {
        return Vec::new();
    }

    let mut corpus = Vec::with_capacity(usable.len() + 1);
    corpus.push(tokenize(query));
    for document in &usable {
        corpus.push(tokenize(&document.text));
    }

    let space = TermWeightSpace::fit(&corpus);
    let query_vector = space.weight_vector(&corpus[0]);

    let mut scored: Vec<(usize, f64)> = corpus[1..]
        .iter()
        .enumerate()
        .map(|(index, tokens)| {
            let vector = space.weight_vector(tokens);
            (index, cosine_similarity(&query_vector, &vector))
        })
        .collect();

    scored.sort_by(|left, right| right.1.total_cmp(&left.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(position, (index, score))| RankedEntry {
            rank: position + 1,
            name: usable[index].name.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(name: &str, text: &str) -> ExtractedDocument {
        ExtractedDocument {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn tokenizer_lowercases_and_drops_short_tokens() {
        let tokens = tokenize("Senior Backend-Engineer, Python 3 & C");
        assert_eq!(tokens, vec!["senior", "backend", "engineer", "python"]);
    }

    #[test]
    fn empty_query_yields_empty_ranking() {
        let documents = vec![extracted("r1.pdf", "python developer")];
        assert!(rank("   ", &documents).is_empty());
        assert!(rank("", &documents).is_empty());
    }

    #[test]
    fn empty_document_set_yields_empty_ranking() {
        assert!(rank("backend engineer", &[]).is_empty());
    }

    #[test]
    fn unusable_documents_are_absent_not_ranked_last() {
        let documents = vec![
            extracted("good.pdf", "python backend developer"),
            extracted("corrupt.jpg", "   "),
        ];

        let ranking = rank("python backend", &documents);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[0].name, "good.pdf");
    }

    #[test]
    fn identical_text_scores_one() {
        let documents = vec![extracted("twin.pdf", "senior backend engineer python")];
        let ranking = rank("senior backend engineer python", &documents);

        assert_eq!(ranking.len(), 1);
        assert!((ranking[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn relevant_resume_outranks_unrelated_one() {
        let documents = vec![
            extracted("r1.pdf", "python backend developer with 5 years experience"),
            extracted("r2.pdf", "frontend designer skilled in css"),
        ];

        let ranking = rank("senior backend engineer python", &documents);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].name, "r1.pdf");
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].name, "r2.pdf");
        assert_eq!(ranking[1].rank, 2);
        assert!(ranking[0].score > ranking[1].score);
    }

    #[test]
    fn all_scores_stay_in_unit_interval() {
        let documents = vec![
            extracted("a.pdf", "rust systems engineer tokio async"),
            extracted("b.pdf", "python python python backend backend"),
            extracted("c.pdf", "completely unrelated gardening text"),
            extracted("d.pdf", "backend engineer"),
        ];

        for entry in rank("backend engineer python", &documents) {
            assert!(entry.score >= 0.0, "{} below range", entry.name);
            assert!(entry.score <= 1.0, "{} above range", entry.name);
        }
    }

    #[test]
    fn tied_scores_keep_submission_order() {
        // Neither document shares a term with the query, so both score zero.
        let documents = vec![
            extracted("first.pdf", "rust developer"),
            extracted("second.pdf", "rust developer"),
        ];

        let ranking = rank("gardening", &documents);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].score, 0.0);
        assert_eq!(ranking[1].score, 0.0);
        assert_eq!(ranking[0].name, "first.pdf");
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].name, "second.pdf");
        assert_eq!(ranking[1].rank, 2);
    }

    #[test]
    fn ranking_is_idempotent() {
        let documents = vec![
            extracted("r1.pdf", "python backend developer"),
            extracted("r2.pdf", "java spring services"),
            extracted("r3.pdf", "frontend designer"),
        ];

        let first = rank("backend python services", &documents);
        let second = rank("backend python services", &documents);

        assert_eq!(first, second);
    }

    #[test]
    fn zero_norm_vectors_compare_as_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.5, 0.5]), 0.0);
        assert_eq!(cosine_similarity(&[0.5, 0.5], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn weight_space_is_deterministic_and_normalized() {
        let corpus = vec![
            tokenize("python backend developer"),
            tokenize("backend services in python"),
        ];

        let space = TermWeightSpace::fit(&corpus);
        assert_eq!(space.vocabulary_size(), 5);

        let vector = space.weight_vector(&corpus[0]);
        let magnitude = vector.iter().map(|value| value * value).sum::<f64>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-9);

        assert_eq!(vector, space.weight_vector(&corpus[0]));
    }
}
