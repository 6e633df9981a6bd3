use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::catalog::{Catalog, District, TermDictionary};
use crate::model::{Language, Query, QueryLevel, SourceKind};
use crate::sources::SourceConfig;

/// How many of a category's terms go into one fanout query before
/// char-limit fitting starts dropping from the tail.
const CATEGORY_TOP_TERMS: usize = 4;

/// Turns the catalogs into per-source ordered query lists.
///
/// Generation is deterministic: regions iterate in catalog order, languages
/// in region order, categories in code order. The scheduler consumes each
/// source's list sequentially, so this order is also the execution order.
pub struct QueryGenerator<'a> {
    catalog: &'a Catalog,
    terms: &'a TermDictionary,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(catalog: &'a Catalog, terms: &'a TermDictionary) -> Self {
        Self { catalog, terms }
    }

    /// The full state-phase plan: one ordered query list per source.
    pub fn plan(&self, configs: &[SourceConfig]) -> BTreeMap<SourceKind, Vec<Query>> {
        configs
            .iter()
            .map(|c| (c.kind, self.state_queries(c)))
            .collect()
    }

    /// State-level queries for one source.
    pub fn state_queries(&self, config: &SourceConfig) -> Vec<Query> {
        let mut out = Vec::new();
        for region in self.catalog.regions() {
            for &language in &region.languages {
                if !config.supports_language(language) {
                    continue;
                }
                if config.category_fanout {
                    self.push_category_queries(config, region.name.as_str(), &region.slug, language, &mut out);
                } else {
                    self.push_broad_query(config, region.name.as_str(), &region.slug, language, &mut out);
                }
            }
        }
        out
    }

    /// District-level queries, restricted to regions that produced results
    /// in the state phase.
    pub fn district_queries(
        &self,
        config: &SourceConfig,
        active_slugs: &BTreeSet<String>,
    ) -> Vec<Query> {
        let mut out = Vec::new();
        for region in self.catalog.regions() {
            if !active_slugs.contains(&region.slug) {
                continue;
            }
            for &language in &region.languages {
                if !config.supports_language(language) {
                    continue;
                }
                let Some(term) = self.lead_term(language) else {
                    continue;
                };
                for batch in batch_districts(&region.districts, term, config.query_char_limit) {
                    let query_string = district_query_string(term, &batch);
                    out.push(Query {
                        query_string,
                        source_hint: config.kind,
                        language,
                        state_slug: region.slug.clone(),
                        level: QueryLevel::District,
                        // Batch head identifies the batch; articles are not
                        // attributed to a single district from here.
                        district_slug: Some(batch[0].slug.clone()),
                        search_term: term.to_string(),
                        state_name: region.name.clone(),
                    });
                }
            }
        }
        out
    }

    /// One query per category with the category's top terms (google).
    fn push_category_queries(
        &self,
        config: &SourceConfig,
        state_name: &str,
        state_slug: &str,
        language: Language,
        out: &mut Vec<Query>,
    ) {
        for category in self.terms.categories_for(language) {
            let top: Vec<&str> = self
                .terms
                .by_language_and_category(language, category)
                .iter()
                .take(CATEGORY_TOP_TERMS)
                .map(|t| t.term.as_str())
                .collect();
            let Some(query_string) = fit_query(&top, state_name, config.query_char_limit) else {
                warn!(
                    state = state_slug,
                    language = %language,
                    category = %category,
                    "no category query fits the char limit"
                );
                continue;
            };
            out.push(Query {
                query_string,
                source_hint: config.kind,
                language,
                state_slug: state_slug.to_string(),
                level: QueryLevel::State,
                district_slug: None,
                search_term: top[0].to_string(),
                state_name: state_name.to_string(),
            });
        }
    }

    /// One broad query combining the lead term of every category
    /// (newsdata, gnews).
    fn push_broad_query(
        &self,
        config: &SourceConfig,
        state_name: &str,
        state_slug: &str,
        language: Language,
        out: &mut Vec<Query>,
    ) {
        let broad: Vec<&str> = self
            .terms
            .categories_for(language)
            .into_iter()
            .filter_map(|c| self.terms.by_language_and_category(language, c).first())
            .map(|t| t.term.as_str())
            .collect();
        if broad.is_empty() {
            return;
        }
        let Some(query_string) = fit_query(&broad, state_name, config.query_char_limit) else {
            warn!(
                state = state_slug,
                language = %language,
                "no broad query fits the char limit"
            );
            return;
        };
        out.push(Query {
            query_string,
            source_hint: config.kind,
            language,
            state_slug: state_slug.to_string(),
            level: QueryLevel::State,
            district_slug: None,
            search_term: broad[0].to_string(),
            state_name: state_name.to_string(),
        });
    }

    /// Highest-signal term for district query prefixes: the first heatwave
    /// term, falling back to the first term of any category.
    fn lead_term(&self, language: Language) -> Option<&str> {
        use crate::catalog::TermCategory;
        self.terms
            .by_language_and_category(language, TermCategory::Heatwave)
            .first()
            .or_else(|| self.terms.by_language(language).into_iter().next())
            .map(|t| t.term.as_str())
    }
}

/// `(t1 OR "two words" OR t3)` — multi-word members are double-quoted.
fn or_group(members: &[&str]) -> String {
    let parts: Vec<String> = members
        .iter()
        .map(|m| {
            if m.contains(' ') {
                format!("\"{m}\"")
            } else {
                (*m).to_string()
            }
        })
        .collect();
    format!("({})", parts.join(" OR "))
}

/// OR-group plus location suffix, dropping terms from the tail (lowest
/// priority first) until the string fits. None when nothing fits.
fn fit_query(terms: &[&str], location: &str, char_limit: usize) -> Option<String> {
    let mut kept = terms.to_vec();
    while !kept.is_empty() {
        let candidate = format!("{} {}", or_group(&kept), location);
        if candidate.chars().count() <= char_limit {
            return Some(candidate);
        }
        kept.pop();
    }
    None
}

fn district_query_string(term: &str, batch: &[&District]) -> String {
    let names: Vec<&str> = batch.iter().map(|d| d.name.as_str()).collect();
    format!("{term} {}", or_group(&names))
}

/// Greedy batching in catalog order: each batch takes the largest district
/// run whose full query string stays within the char limit. Districts whose
/// name alone overflows the limit are dropped.
fn batch_districts<'d>(
    districts: &'d [District],
    term: &str,
    char_limit: usize,
) -> Vec<Vec<&'d District>> {
    let mut batches: Vec<Vec<&District>> = Vec::new();
    let mut current: Vec<&District> = Vec::new();
    for district in districts {
        let mut candidate = current.clone();
        candidate.push(district);
        if district_query_string(term, &candidate).chars().count() <= char_limit {
            current = candidate;
            continue;
        }
        if current.is_empty() {
            warn!(district = %district.name, "district name alone overflows the query limit");
            continue;
        }
        batches.push(std::mem::take(&mut current));
        if district_query_string(term, &[district]).chars().count() <= char_limit {
            current.push(district);
        } else {
            warn!(district = %district.name, "district name alone overflows the query limit");
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
