//! Local heuristic comparison engine.
//!
//! Entirely synchronous and offline: keyword frequency against a stop-word
//! list, sentence extraction, a small complexity measure, and a handful of
//! structural pattern checks, combined into the same five-section report
//! the remote backend asks the API for. Advisory output — the scoring is a
//! bag of heuristics, not a model.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;

use crate::app::{ChorusError, Result};
use crate::domain::TargetId;
use crate::summary::{Summarizer, NO_VALID_RESPONSES};

/// Returned when fewer than two responses are substantial enough to compare.
pub const NEED_TWO_RESPONSES: &str =
    "Need at least 2 model responses to generate comparative analysis.";

/// Responses at or below this length carry too little signal to analyze.
const MIN_ANALYZABLE_LEN: usize = 20;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "will", "would", "could",
    "should", "this", "that", "these", "those", "can", "may", "might", "must", "shall",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "who"];
const ACTION_WORDS: &[&str] = &["should", "can", "will", "must", "need", "important"];
const EMPHASIS_WORDS: &[&str] = &["should", "recommend", "suggest", "important", "key", "essential"];

pub struct LocalAnalyzer;

impl LocalAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for LocalAnalyzer {
    async fn summarize(&self, _prompt: &str, entries: &[(TargetId, String)]) -> Result<String> {
        if entries.is_empty() {
            return Err(ChorusError::Summary(NO_VALID_RESPONSES.to_string()));
        }

        let profiles: Vec<Profile> = entries
            .iter()
            .filter(|(_, content)| content.trim().len() > MIN_ANALYZABLE_LEN)
            .map(|(id, content)| Profile::build(id.as_str().to_uppercase(), content.trim()))
            .collect();

        if profiles.len() < 2 {
            return Ok(NEED_TWO_RESPONSES.to_string());
        }

        Ok(format_analysis(
            &find_similarities(&profiles),
            &find_differences(&profiles),
            &unique_insights(&profiles),
            &assess_quality(&profiles),
            &consolidated_answer(&profiles),
        ))
    }
}

/// One response, pre-digested for the heuristics.
struct Profile {
    label: String,
    content: String,
    sentences: Vec<String>,
    keywords: Vec<(String, usize)>,
    complexity: f64,
}

impl Profile {
    fn build(label: String, content: &str) -> Self {
        Self {
            label,
            content: content.to_string(),
            sentences: sentences(content),
            keywords: keywords(content),
            complexity: complexity_score(content),
        }
    }

    fn keyword_set(&self) -> HashSet<&str> {
        self.keywords.iter().map(|(w, _)| w.as_str()).collect()
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Sentence-ish pieces, trimmed, trivia dropped, capped for cost.
fn sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() > 10)
        .take(10)
        .map(String::from)
        .collect()
}

/// Top stop-word-filtered words by frequency, at most ten. Ties break
/// alphabetically so the report is deterministic.
fn keywords(text: &str) -> Vec<(String, usize)> {
    let mut freq: BTreeMap<String, usize> = BTreeMap::new();
    for word in words(text) {
        if word.len() > 3 && !is_stop_word(&word) {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(10);
    ranked
}

/// Average sentence length blended with lexical diversity.
fn complexity_score(text: &str) -> f64 {
    let pieces: Vec<&str> = text.split(['.', '!', '?']).collect();
    let avg_sentence_len = pieces
        .iter()
        .map(|p| p.split_whitespace().count())
        .sum::<usize>() as f64
        / pieces.len() as f64;

    let all = words(text);
    let unique: HashSet<&String> = all.iter().collect();
    let diversity = if all.is_empty() {
        0.0
    } else {
        unique.len() as f64 / all.len() as f64
    };

    avg_sentence_len * 0.3 + diversity * 0.7
}

fn find_similarities(profiles: &[Profile]) -> Vec<String> {
    let mut similarities = Vec::new();

    // Keywords every response shares, in the first response's rank order.
    let rest: Vec<HashSet<&str>> = profiles[1..].iter().map(Profile::keyword_set).collect();
    let common: Vec<&str> = profiles[0]
        .keywords
        .iter()
        .map(|(w, _)| w.as_str())
        .filter(|w| rest.iter().all(|set| set.contains(w)))
        .collect();
    if !common.is_empty() {
        let shown = common.iter().take(5).copied().collect::<Vec<_>>().join(", ");
        similarities.push(format!("All models discussed: {}", shown));
    }

    let mut themes = Vec::new();
    let all_sentences: Vec<&String> = profiles.iter().flat_map(|p| p.sentences.iter()).collect();
    let lowered: Vec<String> = all_sentences.iter().map(|s| s.to_lowercase()).collect();
    if lowered.iter().any(|s| QUESTION_WORDS.iter().any(|q| s.contains(q))) {
        themes.push("question-answering");
    }
    if lowered.iter().any(|s| ACTION_WORDS.iter().any(|a| s.contains(a))) {
        themes.push("recommendations");
    }
    if !themes.is_empty() {
        similarities.push(format!("Common themes: {}", themes.join(", ")));
    }

    // Shared vocabulary in the concluding sentences.
    let conclusions: Vec<&str> = profiles
        .iter()
        .map(|p| p.sentences.last().map(String::as_str).unwrap_or(""))
        .collect();
    let common_closing = common_words(&conclusions);
    if common_closing.len() > 2 {
        let shown = common_closing
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        similarities.push(format!(
            "Models agreed on: similar conclusions about {}",
            shown
        ));
    }

    if similarities.is_empty() {
        similarities.push("Models had different approaches to the topic".to_string());
    }
    similarities
}

/// Non-stop words present in every sentence, ordered by the first one.
fn common_words(texts: &[&str]) -> Vec<String> {
    if texts.len() < 2 {
        return Vec::new();
    }

    let sets: Vec<HashSet<String>> = texts
        .iter()
        .map(|t| words(t).into_iter().filter(|w| !is_stop_word(w)).collect())
        .collect();

    let mut seen = HashSet::new();
    words(texts[0])
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .filter(|w| seen.insert(w.clone()))
        .filter(|w| sets[1..].iter().all(|set| set.contains(w)))
        .collect()
}

fn find_differences(profiles: &[Profile]) -> Vec<String> {
    let mut differences = Vec::new();

    let min_len = profiles.iter().map(|p| p.content.len()).min().unwrap_or(0);
    let max_len = profiles.iter().map(|p| p.content.len()).max().unwrap_or(0);
    if max_len > min_len * 2 {
        let shortest = profiles.iter().find(|p| p.content.len() == min_len);
        let longest = profiles.iter().find(|p| p.content.len() == max_len);
        if let (Some(short), Some(long)) = (shortest, longest) {
            differences.push(format!(
                "{} provided much more detail than {}",
                long.label, short.label
            ));
        }
    }

    let mut by_complexity: Vec<&Profile> = profiles.iter().collect();
    by_complexity.sort_by(|a, b| {
        b.complexity
            .partial_cmp(&a.complexity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top = by_complexity[0];
    let bottom = by_complexity[by_complexity.len() - 1];
    if top.complexity > bottom.complexity * 1.3 {
        differences.push(format!("{} used more complex language than others", top.label));
    }

    for profile in profiles {
        let others: HashSet<&str> = profiles
            .iter()
            .filter(|p| p.label != profile.label)
            .flat_map(|p| p.keywords.iter().map(|(w, _)| w.as_str()))
            .collect();
        let unique: Vec<&str> = profile
            .keywords
            .iter()
            .map(|(w, _)| w.as_str())
            .filter(|w| !others.contains(w))
            .take(3)
            .collect();
        if !unique.is_empty() {
            differences.push(format!(
                "{} uniquely emphasized: {}",
                profile.label,
                unique.join(", ")
            ));
        }
    }

    if differences.is_empty() {
        differences.push("Models had similar approaches and coverage".to_string());
    }
    differences
}

fn unique_insights(profiles: &[Profile]) -> Vec<String> {
    let mut insights = Vec::new();

    for profile in profiles {
        if let Some(pattern) = distinctive_pattern(profile, profiles) {
            insights.push(format!("{}: {}", profile.label, pattern));
        }
    }

    if insights.is_empty() {
        return profiles
            .iter()
            .map(|p| format!("{}: Provided standard response coverage", p.label))
            .collect();
    }
    insights
}

/// The first stylistic trait this response has that no sibling shares.
fn distinctive_pattern(profile: &Profile, all: &[Profile]) -> Option<&'static str> {
    let others = all.iter().filter(|p| p.label != profile.label);

    let asks = |p: &Profile| p.content.contains('?');
    let exemplifies = |p: &Profile| {
        let lc = p.content.to_lowercase();
        lc.contains("example") || lc.contains("instance")
    };
    let structures =
        |p: &Profile| p.content.contains("1.") || p.content.contains("first") || p.content.contains('•');

    if asks(profile) && !others.clone().any(asks) {
        return Some("Asked clarifying questions");
    }
    if exemplifies(profile) && !others.clone().any(exemplifies) {
        return Some("Provided specific examples");
    }
    if structures(profile) && !others.clone().any(structures) {
        return Some("Used structured formatting");
    }
    None
}

fn quality_score(profile: &Profile) -> f64 {
    let length_score = (profile.content.len() as f64 / 500.0).min(1.0) * 0.3;
    let complexity_score = profile.complexity * 0.4;
    let keyword_score = (profile.keywords.len() as f64 / 10.0).min(1.0) * 0.3;
    length_score + complexity_score + keyword_score
}

fn assess_quality(profiles: &[Profile]) -> String {
    let best = profiles
        .iter()
        .max_by(|a, b| {
            quality_score(a)
                .partial_cmp(&quality_score(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .expect("at least two profiles");

    let mut reasons = Vec::new();
    if best.content.len() > 200 {
        reasons.push("comprehensive coverage");
    }
    if best.complexity > 0.5 {
        reasons.push("detailed analysis");
    }
    if best.keywords.len() > 5 {
        reasons.push("broad topic coverage");
    }

    let reasons = if reasons.is_empty() {
        "good overall quality".to_string()
    } else {
        reasons.join(", ")
    };
    format!("{} provided the highest quality response ({})", best.label, reasons)
}

/// Length plus keyword frequency plus a bonus for actionable wording.
fn sentence_score(sentence: &str, keywords: &[(String, usize)]) -> f64 {
    let lc = sentence.to_lowercase();
    let mut score = sentence.len() as f64 * 0.1;

    for (word, freq) in keywords {
        if lc.contains(word.as_str()) {
            score += *freq as f64;
        }
    }
    for word in EMPHASIS_WORDS {
        if lc.contains(word) {
            score += 2.0;
        }
    }
    score
}

/// The best sentence from each response, deduplicated, at most three.
fn consolidated_answer(profiles: &[Profile]) -> String {
    let mut best_sentences = Vec::new();
    for profile in profiles {
        let best = profile.sentences.iter().max_by(|a, b| {
            sentence_score(a, &profile.keywords)
                .partial_cmp(&sentence_score(b, &profile.keywords))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(sentence) = best {
            best_sentences.push(sentence.clone());
        }
    }

    let mut seen = HashSet::new();
    let unique: Vec<String> = best_sentences
        .into_iter()
        .filter(|s| s.len() > 15)
        .filter(|s| {
            let normalized: String = s
                .to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .collect();
            seen.insert(normalized)
        })
        .collect();

    let consolidated = format!("{}.", unique.iter().take(3).cloned().collect::<Vec<_>>().join(". "));
    if consolidated.len() > 20 {
        consolidated
    } else {
        "All models provided valuable perspectives on the topic.".to_string()
    }
}

fn format_analysis(
    similarities: &[String],
    differences: &[String],
    insights: &[String],
    quality: &str,
    consolidated: &str,
) -> String {
    let bullets = |items: &[String]| {
        items
            .iter()
            .map(|item| format!("• {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "**Key Similarities:**\n{}\n\n**Key Differences:**\n{}\n\n**Unique Insights:**\n{}\n\n**Quality Assessment:**\n{}\n\n**Consolidated Answer:**\n{}",
        bullets(similarities),
        bullets(differences),
        bullets(insights),
        quality,
        consolidated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: TargetId, content: &str) -> (TargetId, String) {
        (id, content.to_string())
    }

    #[tokio::test]
    async fn test_empty_entries_is_an_error() {
        let err = LocalAnalyzer::new().summarize("p", &[]).await.unwrap_err();
        assert!(err.to_string().contains("No valid responses to summarize"));
    }

    #[tokio::test]
    async fn test_single_response_is_not_comparable() {
        let entries = vec![entry(
            TargetId::Chatgpt,
            "A single reasonably long answer about compilers and parsing.",
        )];
        let out = LocalAnalyzer::new().summarize("p", &entries).await.unwrap();
        assert_eq!(out, NEED_TWO_RESPONSES);
    }

    #[tokio::test]
    async fn test_short_responses_do_not_count() {
        let entries = vec![
            entry(TargetId::Chatgpt, "tiny answer"),
            entry(TargetId::Claude, "also quite tiny"),
        ];
        let out = LocalAnalyzer::new().summarize("p", &entries).await.unwrap();
        assert_eq!(out, NEED_TWO_RESPONSES);
    }

    #[tokio::test]
    async fn test_report_carries_all_sections() {
        let entries = vec![
            entry(
                TargetId::Chatgpt,
                "Rust ownership prevents data races. The borrow checker enforces aliasing rules at compile time, which is important for concurrent programs.",
            ),
            entry(
                TargetId::Claude,
                "Ownership in Rust means each value has a single owner. For example, moving a value invalidates the previous binding, and the compiler should reject later uses.",
            ),
        ];
        let out = LocalAnalyzer::new().summarize("p", &entries).await.unwrap();

        for section in [
            "**Key Similarities:**",
            "**Key Differences:**",
            "**Unique Insights:**",
            "**Quality Assessment:**",
            "**Consolidated Answer:**",
        ] {
            assert!(out.contains(section), "missing section {}", section);
        }
        assert!(out.contains("provided the highest quality response"));
    }

    #[tokio::test]
    async fn test_length_gap_is_reported() {
        let long = "Sorting algorithms trade time for space in interesting ways. \
                    Quicksort partitions in place and averages n log n comparisons. \
                    Mergesort guarantees n log n but allocates a scratch buffer. \
                    Heapsort avoids allocation entirely at the price of cache behavior."
            .to_string();
        let entries = vec![
            entry(TargetId::Chatgpt, &long),
            entry(TargetId::Claude, "Quicksort is usually the fastest choice."),
        ];
        let out = LocalAnalyzer::new().summarize("p", &entries).await.unwrap();
        assert!(out.contains("CHATGPT provided much more detail than CLAUDE"));
    }

    #[test]
    fn test_keywords_filter_stop_and_short_words() {
        let ranked = keywords("the cache and the cache but a cpu");
        let words: Vec<&str> = ranked.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["cache"]);
        assert_eq!(ranked[0].1, 2);
    }

    #[test]
    fn test_common_words_requires_presence_in_all() {
        let common = common_words(&[
            "latency matters for throughput",
            "throughput and latency tradeoffs",
            "reducing latency improves throughput",
        ]);
        assert!(common.contains(&"latency".to_string()));
        assert!(common.contains(&"throughput".to_string()));
        assert!(!common.contains(&"tradeoffs".to_string()));
    }

    #[test]
    fn test_consolidated_answer_deduplicates() {
        let a = Profile::build(
            "A".into(),
            "Memory safety is the central benefit of Rust for systems work.",
        );
        let b = Profile::build(
            "B".into(),
            "Memory safety is the central benefit of Rust for systems work.",
        );
        let out = consolidated_answer(&[a, b]);
        assert_eq!(out.matches("central benefit").count(), 1);
    }
}
