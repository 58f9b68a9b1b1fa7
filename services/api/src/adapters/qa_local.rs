//! services/api/src/adapters/qa_local.rs
//!
//! An offline extractive model: the answer is the context sentence that best
//! covers the content words of the question.

use async_trait::async_trait;
use legal_qa_core::ports::{ExtractiveQaModel, PortResult, QaPrediction};
use std::collections::HashSet;
use tracing::debug;

const STOPWORDS: &[&str] = &[
    "a", "about", "am", "an", "and", "any", "are", "as", "at", "be", "by", "can", "could", "did",
    "do", "does", "for", "from", "had", "has", "have", "how", "i", "if", "in", "into", "is", "it",
    "its", "many", "me", "much", "my", "of", "on", "or", "our", "should", "so", "tell", "that", "the", "their",
    "there", "these", "this", "those", "to", "under", "us", "was", "we", "were", "what", "when",
    "where", "which", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Scores each sentence of the context by the inverse-frequency-weighted share
/// of question terms it contains.
#[derive(Debug, Clone)]
pub struct LexicalQaModel {
    min_score: f32,
}

impl LexicalQaModel {
    /// `min_score` is the share (0.0..=1.0) of weighted question terms a
    /// sentence must cover to count as an answer.
    pub fn new(min_score: f32) -> Self {
        Self {
            min_score: min_score.clamp(0.0, 1.0),
        }
    }

    pub fn predict(&self, context: &str, question: &str) -> Option<QaPrediction> {
        let question_terms = terms(question);
        if question_terms.is_empty() {
            debug!("Question has no content words: '{}'", question);
            return None;
        }

        let sentences = split_sentences(context);
        if sentences.is_empty() {
            return None;
        }
        let sentence_terms: Vec<HashSet<String>> = sentences.iter().map(|s| terms(s)).collect();

        let n = sentences.len() as f32;
        let weight = |term: &String| {
            let df = sentence_terms.iter().filter(|set| set.contains(term)).count() as f32;
            1.0 + ((n + 1.0) / (df + 1.0)).ln()
        };
        let weights: Vec<(&String, f32)> = question_terms.iter().map(|t| (t, weight(t))).collect();
        let total: f32 = weights.iter().map(|(_, w)| w).sum();

        let mut best: Option<(usize, f32)> = None;
        for (i, set) in sentence_terms.iter().enumerate() {
            let covered: f32 = weights
                .iter()
                .filter(|(t, _)| set.contains(*t))
                .map(|(_, w)| w)
                .sum();
            let score = covered / total;
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) if score >= self.min_score => Some(QaPrediction {
                answer: sentences[i].to_string(),
                score,
            }),
            _ => None,
        }
    }
}

impl Default for LexicalQaModel {
    fn default() -> Self {
        Self::new(0.2)
    }
}

#[async_trait]
impl ExtractiveQaModel for LexicalQaModel {
    async fn infer(&self, context: &str, question: &str) -> PortResult<Option<QaPrediction>> {
        Ok(self.predict(context, question))
    }
}

/// Splits text at sentence-ending punctuation followed by whitespace, and at
/// line breaks. Fragments without any letters or digits are dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' => true,
            '.' | '?' | '!' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if fragment.chars().any(char::is_alphanumeric) {
        sentences.push(fragment);
    }
}

/// Lowercased content words with a light plural strip.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

fn stem(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
