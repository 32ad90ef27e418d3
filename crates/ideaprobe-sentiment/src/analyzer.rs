//! Lexicon-and-rules sentiment scorer for product feedback.
//!
//! Two passes run over the same tokens: a plain lexicon sum and a
//! rule-adjusted sum (negation, intensifiers, exclamation). The adjusted
//! score decides the label; agreement between the two passes feeds the
//! confidence estimate.

use ideaprobe_core::SentimentLabel;

/// Word weights for product-feedback vocabulary.
///
/// Keys are lowercase single words, matched after stripping punctuation.
/// Positive weights in `(0, 1]`, negative in `[-1, 0)`.
const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("loves", 0.4),
    ("best", 0.5),
    ("perfect", 0.5),
    ("fantastic", 0.5),
    ("helpful", 0.4),
    ("useful", 0.4),
    ("easy", 0.4),
    ("intuitive", 0.4),
    ("smooth", 0.4),
    ("fast", 0.4),
    ("reliable", 0.4),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("nice", 0.3),
    ("solid", 0.3),
    ("beautiful", 0.4),
    ("happy", 0.4),
    ("enjoy", 0.4),
    ("worth", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("useless", -0.6),
    ("unusable", -0.6),
    ("broken", -0.5),
    ("crash", -0.6),
    ("crashes", -0.6),
    ("crashing", -0.6),
    ("crashed", -0.6),
    ("bug", -0.4),
    ("bugs", -0.4),
    ("buggy", -0.5),
    ("glitch", -0.4),
    ("glitchy", -0.4),
    ("slow", -0.4),
    ("laggy", -0.4),
    ("lag", -0.3),
    ("freeze", -0.5),
    ("freezes", -0.5),
    ("frustrating", -0.5),
    ("annoying", -0.4),
    ("confusing", -0.4),
    ("difficult", -0.3),
    ("complicated", -0.3),
    ("expensive", -0.4),
    ("overpriced", -0.5),
    ("scam", -0.7),
    ("problem", -0.3),
    ("problems", -0.3),
    ("issue", -0.3),
    ("issues", -0.3),
    ("error", -0.3),
    ("errors", -0.3),
    ("fail", -0.4),
    ("fails", -0.4),
    ("failed", -0.4),
    ("disappointing", -0.5),
    ("disappointed", -0.5),
    ("poor", -0.4),
    ("waste", -0.5),
    ("missing", -0.3),
    ("lack", -0.3),
    ("lacks", -0.3),
];

/// Tokens that flip the sign of the next sentiment-bearing word within a
/// 3-token window.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "neither", "nor", "cannot", "cant", "dont", "doesnt", "didnt",
    "wont", "isnt", "wasnt", "arent", "couldnt", "wouldnt", "shouldnt", "hardly", "barely",
];

/// Tokens that scale the immediately following weight by 1.5.
const INTENSIFIERS: &[&str] = &["very", "really", "extremely", "so", "totally", "absolutely", "incredibly"];

const POSITIVE_THRESHOLD: f64 = 0.1;
const NEGATIVE_THRESHOLD: f64 = -0.1;
const NEGATION_WINDOW: usize = 3;

/// One analyzed text: label, score in [-1, 1], confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
}

impl Sentiment {
    fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: 0.0,
        }
    }
}

/// Stateless, synchronous, side-effect-free sentiment analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify a text. Empty or whitespace-only input returns neutral with
    /// zero score and zero confidence, as does text with no sentiment-bearing
    /// tokens.
    #[must_use]
    pub fn analyze(&self, text: &str) -> Sentiment {
        let raw_tokens: Vec<&str> = text.split_whitespace().collect();
        if raw_tokens.is_empty() {
            return Sentiment::neutral();
        }

        let tokens: Vec<String> = raw_tokens.iter().map(|t| normalize_token(t)).collect();

        let mut plain = 0.0_f64;
        let mut adjusted = 0.0_f64;
        let mut hits = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(weight) = lookup(token) else { continue };
            hits += 1;
            plain += weight;

            let mut w = weight;
            if i > 0 && INTENSIFIERS.contains(&tokens[i - 1].as_str()) {
                w *= 1.5;
            }
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| NEGATIONS.contains(&t.as_str())) {
                w = -w;
            }
            if raw_tokens[i].ends_with('!') {
                w *= 1.25;
            }
            adjusted += w;
        }

        if hits == 0 {
            return Sentiment::neutral();
        }

        let plain_norm = squash(plain);
        let adjusted_norm = squash(adjusted);

        let label = if adjusted_norm > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if adjusted_norm < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        // Agreement between the two passes, signal strength, and lexicon
        // coverage of the text.
        let agreement = 1.0 - (plain_norm - adjusted_norm).abs() / 2.0;
        let strength = adjusted_norm.abs();
        #[allow(clippy::cast_precision_loss)]
        let coverage = ((hits as f64 / tokens.len() as f64) * 4.0).min(1.0);
        let confidence = (0.5 * agreement + 0.3 * strength + 0.2 * coverage).clamp(0.0, 1.0);

        Sentiment {
            label,
            score: adjusted_norm.clamp(-1.0, 1.0),
            confidence,
        }
    }

    /// Analyze a batch of texts in order.
    #[must_use]
    pub fn analyze_batch(&self, texts: &[&str]) -> Vec<Sentiment> {
        texts.iter().map(|t| self.analyze(t)).collect()
    }
}

fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn lookup(token: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, weight)| *weight)
}

/// Squash an unbounded weight sum into (-1, 1).
fn squash(sum: f64) -> f64 {
    sum / (sum.abs() + 1.0)
}
