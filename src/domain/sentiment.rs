//! Headline mood score. Display only; never feeds the signal rules.

const POSITIVE_KEYWORDS: [&str; 20] = [
    "beat", "surge", "record", "growth", "profit", "success", "breakthrough", "bullish", "rally",
    "gain", "soar", "exceed", "outperform", "strong", "positive", "upgrade", "buy", "rise",
    "jump", "optimis",
];

const NEGATIVE_KEYWORDS: [&str; 20] = [
    "miss", "drop", "fall", "decline", "loss", "fail", "crash", "bearish", "plunge", "cut",
    "layoff", "weak", "negative", "downgrade", "sell", "warning", "concern", "slump", "lawsuit",
    "pessimis",
];

/// Polarity of a single headline in [-1, 1]; 0 when no keyword matches.
pub fn headline_polarity(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let positive = POSITIVE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as f64;
    let negative = NEGATIVE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as f64;

    let total = positive + negative;
    if total == 0.0 {
        return 0.0;
    }
    ((positive - negative) / total).clamp(-1.0, 1.0)
}

/// Mean polarity over non-blank headlines; 0.0 when there are none.
pub fn mood_score(headlines: &[String]) -> f64 {
    let scores: Vec<f64> = headlines
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(headline_polarity)
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Coarse label for dashboards.
pub fn mood_label(score: f64) -> &'static str {
    if score >= 0.2 {
        "bullish"
    } else if score <= -0.2 {
        "bearish"
    } else {
        "neutral"
    }
}
