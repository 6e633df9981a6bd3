use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::TermDictionary;
use crate::error::HeatwireError;
use crate::model::Article;

const DEFAULT_EXCLUDE_THRESHOLD: f64 = 0.05;
/// Score floor for metadata-only articles whose title carries a heat term.
const TITLE_MATCH_FLOOR: f64 = 0.3;

#[derive(Deserialize)]
struct PatternFile {
    patterns: Vec<String>,
}

/// Dictionary-driven relevance scoring plus an exclusion-pattern gate.
///
/// The pipeline favors recall: an article is dropped only when it both
/// scores under the threshold and matches an exclusion pattern.
pub struct RelevanceFilter {
    exclusions: Vec<Regex>,
    exclude_threshold: f64,
}

impl RelevanceFilter {
    /// Compiled once from the embedded pattern list.
    pub fn builtin() -> RelevanceFilter {
        Self::from_json_str(
            include_str!("../../data/exclusion_patterns.json"),
            DEFAULT_EXCLUDE_THRESHOLD,
        )
        .expect("embedded exclusion_patterns.json is valid")
    }

    pub fn from_json_str(raw: &str, exclude_threshold: f64) -> Result<RelevanceFilter, HeatwireError> {
        let parsed: PatternFile = serde_json::from_str(raw)?;
        let exclusions = parsed
            .patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| HeatwireError::Other(format!("bad exclusion pattern: {e}")))?;
        Ok(RelevanceFilter {
            exclusions,
            exclude_threshold,
        })
    }

    /// Score every article and keep the relevant ones. Scored articles are
    /// rebuilt, never mutated in place.
    pub fn apply(&self, dictionary: &TermDictionary, articles: Vec<Article>) -> Vec<Article> {
        let before = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter_map(|article| {
                let combined = combined_text(&article);
                let score = relevance_score(dictionary, &article, &combined);
                let article = article.with_score(score);
                if article.relevance_score >= self.exclude_threshold
                    || !self.matches_exclusion(&combined)
                {
                    Some(article)
                } else {
                    None
                }
            })
            .collect();
        debug!(before, kept = kept.len(), "relevance filter complete");
        kept
    }

    fn matches_exclusion(&self, combined: &str) -> bool {
        self.exclusions.iter().any(|p| p.is_match(combined))
    }
}

fn combined_text(article: &Article) -> String {
    let mut combined = article.envelope.title.to_lowercase();
    if let Some(text) = &article.full_text {
        combined.push(' ');
        combined.push_str(&text.to_lowercase());
    }
    combined
}

/// Weighted term/category coverage with a title bonus.
fn relevance_score(dictionary: &TermDictionary, article: &Article, combined: &str) -> f64 {
    let title = article.envelope.title.to_lowercase();
    let mut matched_terms = 0usize;
    let mut matched_categories = 0usize;
    let mut title_match = false;

    for category in dictionary.categories_for(article.envelope.language) {
        let mut category_matched = false;
        for heat_term in dictionary.by_language_and_category(article.envelope.language, category) {
            let needle = heat_term.term.to_lowercase();
            if combined.contains(&needle) {
                matched_terms += 1;
                category_matched = true;
                if title.contains(&needle) {
                    title_match = true;
                }
            }
        }
        if category_matched {
            matched_categories += 1;
        }
    }

    let term_score = (matched_terms as f64 / 3.0).min(1.0);
    let category_score = (matched_categories as f64 / 2.0).min(1.0);
    let title_bonus = if title_match { 0.2 } else { 0.0 };
    let mut score = (term_score * 0.5 + category_score * 0.3 + title_bonus).clamp(0.0, 1.0);

    if article.full_text.is_none() && title_match {
        score = score.max(TITLE_MATCH_FLOOR);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::now_ist;
    use crate::model::{ArticleRef, Language};

    fn dictionary() -> TermDictionary {
        TermDictionary::from_json_str(
            r#"{"terms": {"en": {
                "heatwave": ["heatwave", "heat wave"],
                "death_stroke": ["heat stroke"],
                "water_crisis": ["water crisis"]
            }}}"#,
        )
        .unwrap()
    }

    fn article(title: &str, full_text: Option<&str>) -> Article {
        let envelope = ArticleRef::new(
            title,
            "https://x.example/a",
            "Example",
            now_ist(),
            Language::English,
            "Rajasthan",
            "heatwave",
        );
        Article::from_ref(envelope, full_text.map(|t| t.to_string()))
    }

    #[test]
    fn dense_match_saturates_the_score() {
        let dict = dictionary();
        let a = article(
            "Heatwave deepens water crisis",
            Some("A heat wave and heat stroke cases amid the water crisis."),
        );
        let combined = combined_text(&a);
        // 4 terms across 3 categories with a title match:
        // 1.0*0.5 + 1.0*0.3 + 0.2 = 1.0
        let score = relevance_score(&dict, &a, &combined);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_match_uses_the_weighted_formula() {
        let dict = dictionary();
        let a = article("Ordinary city news", Some("one heatwave mention in the body"));
        let combined = combined_text(&a);
        // 1 term, 1 category, no title match: 1/3*0.5 + 1/2*0.3 = 0.3166..
        let score = relevance_score(&dict, &a, &combined);
        assert!((score - (0.5 / 3.0 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn no_match_scores_zero() {
        let dict = dictionary();
        let a = article("Monsoon likely next week", Some("rain expected"));
        let combined = combined_text(&a);
        assert_eq!(relevance_score(&dict, &a, &combined), 0.0);
    }

    #[test]
    fn metadata_only_title_match_gets_the_floor() {
        let dict = dictionary();
        let a = article("Heatwave grips Rajasthan", None);
        let combined = combined_text(&a);
        let score = relevance_score(&dict, &a, &combined);
        assert!(score >= 0.3);

        // with body text present the floor does not apply
        let b = article("Heatwave grips Rajasthan", Some("unrelated body"));
        let combined = combined_text(&b);
        let with_text = relevance_score(&dict, &b, &combined);
        assert!(with_text > 0.0);
    }

    #[test]
    fn exclusion_gates_only_low_scorers() {
        let dict = dictionary();
        let filter = RelevanceFilter::builtin();

        // irrelevant horoscope content: score 0, pattern match, dropped
        let horoscope = article("Daily horoscope for Aries", Some("your zodiac forecast"));
        // relevant despite a sports word: heat terms push it over the bar
        let relevant = article(
            "Heatwave halts cricket score updates",
            Some("heat wave disrupts the match"),
        );
        // no heat terms but no exclusion match either: recall keeps it
        let neutral = article("District administration on alert", None);

        let kept = filter.apply(&dict, vec![horoscope, relevant, neutral]);
        let titles: Vec<&str> = kept.iter().map(|a| a.envelope.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.iter().any(|t| t.contains("Heatwave halts")));
        assert!(titles.iter().any(|t| t.contains("District administration")));
    }

    #[test]
    fn scores_are_assigned_on_the_kept_articles() {
        let dict = dictionary();
        let filter = RelevanceFilter::builtin();
        let kept = filter.apply(
            &dict,
            vec![article("Heatwave grips Rajasthan", Some("heat wave body"))],
        );
        assert_eq!(kept.len(), 1);
        assert!(kept[0].relevance_score > 0.0);
        assert!(kept[0].relevance_score <= 1.0);
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(RelevanceFilter::from_json_str(r#"{"patterns": ["("]}"#, 0.05).is_err());
    }
}
