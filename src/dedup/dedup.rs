use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::url_norm::normalize_url;
use crate::model::{Article, Language};

const TITLE_SIMILARITY_THRESHOLD: f64 = 0.85;
/// Titles longer than this are assumed to carry a ` - Publisher` suffix.
const SUFFIX_STRIP_MIN_LEN: usize = 40;

/// Quality ranking used to pick the survivor among duplicates: body text
/// dominates, district attribution and a known outlet break ties.
pub fn quality_score(article: &Article) -> i64 {
    let mut score = 0i64;
    if let Some(text) = &article.full_text {
        score += 100 + text.chars().count() as i64;
    }
    if article.envelope.district.is_some() {
        score += 10;
    }
    if article.envelope.source != "Unknown" {
        score += 5;
    }
    score
}

/// Comparison form of a title: trimmed, lowercased, publisher-attribution
/// suffix removed when the title is long enough to plausibly carry one.
fn comparison_title(title: &str) -> String {
    let trimmed = title.trim();
    let lowered = trimmed.to_lowercase();
    if trimmed.chars().count() > SUFFIX_STRIP_MIN_LEN
        && let Some((head, _)) = lowered.rsplit_once(" - ")
    {
        return head.trim().to_string();
    }
    lowered
}

/// Stage 1: collapse articles sharing a normalized URL, keeping the highest
/// quality member of each group. First-seen group order is preserved.
fn dedup_by_url(articles: Vec<Article>) -> Vec<Article> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, Article> = HashMap::new();
    for article in articles {
        let key = normalize_url(&article.envelope.url);
        match best.get(&key) {
            Some(kept) if quality_score(kept) >= quality_score(&article) => {}
            Some(_) => {
                best.insert(key, article);
            }
            None => {
                order.push(key.clone());
                best.insert(key, article);
            }
        }
    }
    order
        .into_iter()
        .filter_map(|key| best.remove(&key))
        .collect()
}

/// Stage 2: within each language bucket, drop articles whose comparison
/// title is near-identical to one already kept. Cross-language titles are
/// never compared.
fn dedup_by_title(articles: Vec<Article>) -> Vec<Article> {
    let mut buckets: BTreeMap<Language, Vec<(String, Article)>> = BTreeMap::new();
    for article in articles {
        let title = comparison_title(&article.envelope.title);
        let bucket = buckets.entry(article.envelope.language).or_default();
        let duplicate_of = bucket.iter().position(|(kept_title, _)| {
            strsim::normalized_levenshtein(kept_title, &title) >= TITLE_SIMILARITY_THRESHOLD
        });
        match duplicate_of {
            Some(i) if quality_score(&bucket[i].1) < quality_score(&article) => {
                bucket[i] = (title, article);
            }
            Some(_) => {}
            None => bucket.push((title, article)),
        }
    }
    buckets
        .into_values()
        .flat_map(|bucket| bucket.into_iter().map(|(_, a)| a))
        .collect()
}

/// URL dedup, then title dedup within language buckets.
pub fn dedup_articles(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let after_url = dedup_by_url(articles);
    let url_removed = before - after_url.len();
    let deduped = dedup_by_title(after_url);
    debug!(
        before,
        url_removed,
        title_removed = before - url_removed - deduped.len(),
        kept = deduped.len(),
        "deduplication complete"
    );
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::now_ist;
    use crate::model::ArticleRef;

    fn article(title: &str, url: &str, language: Language, full_text: Option<&str>) -> Article {
        let envelope = ArticleRef::new(
            title,
            url,
            "Example Daily",
            now_ist(),
            language,
            "Maharashtra",
            "heatwave",
        );
        Article::from_ref(envelope, full_text.map(|t| t.to_string()))
    }

    #[test]
    fn quality_prefers_body_text_then_district_then_source() {
        let bare = article("t", "https://x.example/a", Language::English, None);
        let with_text = article("t", "https://x.example/a", Language::English, Some("body"));
        assert!(quality_score(&with_text) > quality_score(&bare));

        let with_district = Article::from_ref(
            bare.envelope.clone().with_district("Nagpur"),
            None,
        );
        assert_eq!(quality_score(&with_district), quality_score(&bare) + 10);

        let unknown_source = Article::from_ref(
            ArticleRef::new(
                "t",
                "https://x.example/a",
                "",
                now_ist(),
                Language::English,
                "Maharashtra",
                "heatwave",
            ),
            None,
        );
        assert_eq!(quality_score(&unknown_source), quality_score(&bare) - 5);
    }

    #[test]
    fn url_collisions_keep_the_longer_body() {
        let short = article(
            "Heatwave kills crops",
            "https://x.example/a?utm_source=fb&id=1",
            Language::English,
            Some("short"),
        );
        let long = article(
            "Heatwave kills crops across Vidarbha region",
            "https://X.Example/a?id=1&utm_campaign=y",
            Language::English,
            Some("a much longer extracted body text"),
        );
        let kept = dedup_articles(vec![short, long]);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].full_text.as_deref().unwrap().starts_with("a much longer"));
    }

    #[test]
    fn near_identical_titles_collapse_within_a_language() {
        let a = article(
            "Severe heatwave warning issued for Marathwada region today",
            "https://one.example/a",
            Language::English,
            Some("body text one"),
        );
        let b = article(
            "Severe heatwave warning issued for Marathwada region today.",
            "https://two.example/b",
            Language::English,
            None,
        );
        let kept = dedup_articles(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].envelope.url, "https://one.example/a");
    }

    #[test]
    fn publisher_suffix_is_ignored_in_comparison() {
        let a = article(
            "Severe heatwave warning issued for Marathwada region - The Hindu",
            "https://one.example/a",
            Language::English,
            Some("body"),
        );
        let b = article(
            "Severe heatwave warning issued for Marathwada region - Indian Express",
            "https://two.example/b",
            Language::English,
            None,
        );
        let kept = dedup_articles(vec![a, b]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn short_titles_keep_their_suffix() {
        // under the 40-char threshold the " - " tail is part of the title
        assert_eq!(comparison_title("Heat - wave"), "heat - wave");
        assert_eq!(
            comparison_title(
                "A long enough title about the ongoing heatwave - The Hindu"
            ),
            "a long enough title about the ongoing heatwave"
        );
    }

    #[test]
    fn same_title_different_language_is_not_a_duplicate() {
        let a = article("Heatwave alert issued", "https://one.example/a", Language::English, None);
        let b = article("Heatwave alert issued", "https://two.example/b", Language::Hindi, None);
        let kept = dedup_articles(vec![a, b]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn distinct_articles_all_survive() {
        let kept = dedup_articles(vec![
            article("Power cuts cripple Nagpur industry", "https://one.example/a", Language::English, None),
            article("Reservoir levels at decade low in Marathwada", "https://two.example/b", Language::English, None),
            article("IMD issues red alert for Vidarbha", "https://three.example/c", Language::English, None),
        ]);
        assert_eq!(kept.len(), 3);
    }
}
