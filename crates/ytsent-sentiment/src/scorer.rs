//! Lexicon scorer for Indonesian and English political comments.

use async_trait::async_trait;

use crate::backend::{Prediction, SentimentBackend};
use crate::error::ClassificationError;

/// Word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive, Indonesian
    ("bagus", 0.4),
    ("baik", 0.3),
    ("mantap", 0.5),
    ("hebat", 0.5),
    ("setuju", 0.4),
    ("dukung", 0.4),
    ("mendukung", 0.4),
    ("jujur", 0.4),
    ("adil", 0.4),
    ("bersih", 0.3),
    ("maju", 0.3),
    ("sukses", 0.5),
    ("menang", 0.4),
    ("terbaik", 0.5),
    ("suka", 0.3),
    ("senang", 0.4),
    ("bangga", 0.5),
    ("semangat", 0.4),
    ("amanah", 0.5),
    ("tegas", 0.3),
    ("keren", 0.4),
    ("cerdas", 0.4),
    ("harapan", 0.3),
    ("terima", 0.2),
    ("kasih", 0.2),
    // Positive, English
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("agree", 0.4),
    ("support", 0.4),
    ("honest", 0.4),
    ("fair", 0.3),
    ("best", 0.5),
    ("love", 0.5),
    ("win", 0.4),
    ("proud", 0.4),
    // Negative, Indonesian
    ("buruk", -0.5),
    ("jelek", -0.4),
    ("bohong", -0.6),
    ("pembohong", -0.7),
    ("korupsi", -0.7),
    ("koruptor", -0.7),
    ("curang", -0.6),
    ("kecurangan", -0.6),
    ("gagal", -0.5),
    ("benci", -0.6),
    ("kecewa", -0.5),
    ("marah", -0.4),
    ("bodoh", -0.6),
    ("parah", -0.4),
    ("hoax", -0.5),
    ("fitnah", -0.6),
    ("busuk", -0.6),
    ("rusak", -0.4),
    ("tolak", -0.4),
    ("menolak", -0.4),
    ("dzalim", -0.6),
    ("zalim", -0.6),
    ("malu", -0.3),
    ("sedih", -0.3),
    ("takut", -0.3),
    // Negative, English
    ("bad", -0.4),
    ("terrible", -0.6),
    ("worst", -0.6),
    ("corrupt", -0.7),
    ("corruption", -0.7),
    ("liar", -0.6),
    ("lie", -0.5),
    ("fraud", -0.6),
    ("hate", -0.6),
    ("failed", -0.4),
    ("stupid", -0.6),
];

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// In-process backend over [`lexicon_score`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconBackend;

#[async_trait]
impl SentimentBackend for LexiconBackend {
    async fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>, ClassificationError> {
        Ok(texts
            .iter()
            .map(|t| Prediction::Score(lexicon_score(t)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("saya makan nasi goreng"), 0.0);
    }

    #[test]
    fn indonesian_positive_keyword_returns_positive() {
        let score = lexicon_score("debatnya mantap sekali");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn indonesian_negative_keyword_returns_negative() {
        let score = lexicon_score("pejabat korupsi lagi");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn mixed_languages_are_summed() {
        // bagus (+0.4) + liar (-0.6) = -0.2
        let score = lexicon_score("programnya bagus tapi dia liar");
        assert!((score + 0.2).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn score_clamps_to_bounds() {
        assert_eq!(lexicon_score("mantap hebat sukses terbaik bangga amanah"), 1.0);
        assert_eq!(lexicon_score("korupsi curang bohong fitnah busuk benci"), -1.0);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let score = lexicon_score("MANTAP!!!");
        assert!(score > 0.0, "expected positive score for 'MANTAP!!!', got {score}");
    }

    #[test]
    fn lexicon_words_are_lowercase_and_unique() {
        for (i, (word, weight)) in LEXICON.iter().enumerate() {
            assert_eq!(*word, word.to_lowercase(), "{word} must be lowercase");
            assert!(*weight != 0.0 && weight.abs() <= 1.0, "{word} has weight {weight}");
            assert!(
                !LEXICON[i + 1..].iter().any(|(other, _)| other == word),
                "{word} appears twice"
            );
        }
    }

    #[tokio::test]
    async fn backend_returns_one_score_per_text() {
        let texts = vec!["mantap".to_owned(), "biasa saja".to_owned()];
        let predictions = LexiconBackend.predict_batch(&texts).await.unwrap();
        assert_eq!(predictions.len(), 2);
        assert!(matches!(predictions[0], Prediction::Score(s) if s > 0.0));
        assert_eq!(predictions[1], Prediction::Score(0.0));
    }
}
