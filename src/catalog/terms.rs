use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::HeatwireError;
use crate::model::Language;

/// The 8 heat-impact categories the term dictionary is organized by.
///
/// `ALL` is ordered alphabetically by code so every iteration over
/// categories is deterministic across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermCategory {
    CropDamage,
    DeathStroke,
    GovernmentResponse,
    Heatwave,
    HumanImpact,
    PowerCuts,
    Temperature,
    WaterCrisis,
}

impl TermCategory {
    pub const ALL: [TermCategory; 8] = [
        TermCategory::CropDamage,
        TermCategory::DeathStroke,
        TermCategory::GovernmentResponse,
        TermCategory::Heatwave,
        TermCategory::HumanImpact,
        TermCategory::PowerCuts,
        TermCategory::Temperature,
        TermCategory::WaterCrisis,
    ];

    pub fn as_code(&self) -> &'static str {
        match self {
            TermCategory::CropDamage => "crop_damage",
            TermCategory::DeathStroke => "death_stroke",
            TermCategory::GovernmentResponse => "government_response",
            TermCategory::Heatwave => "heatwave",
            TermCategory::HumanImpact => "human_impact",
            TermCategory::PowerCuts => "power_cuts",
            TermCategory::Temperature => "temperature",
            TermCategory::WaterCrisis => "water_crisis",
        }
    }

    pub fn from_code(code: &str) -> Result<TermCategory, HeatwireError> {
        TermCategory::ALL
            .into_iter()
            .find(|c| c.as_code() == code)
            .ok_or_else(|| HeatwireError::Catalog(format!("unknown term category '{code}'")))
    }
}

impl std::fmt::Display for TermCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// A word or phrase denoting a heat impact in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatTerm {
    pub term: String,
    pub category: TermCategory,
    pub language: Language,
}

/// Read-only heat-term dictionary for all 14 languages.
///
/// Within a category, terms keep their dataset order, which is the priority
/// order the query generator consumes (first = highest signal).
#[derive(Debug, Clone)]
pub struct TermDictionary {
    by_lang: BTreeMap<Language, BTreeMap<TermCategory, Vec<HeatTerm>>>,
}

#[derive(Deserialize)]
struct RawDictionary {
    terms: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl TermDictionary {
    pub fn builtin() -> TermDictionary {
        Self::from_json_str(include_str!("../../data/heat_terms.json"))
            .expect("embedded heat_terms.json is valid")
    }

    pub fn from_json_str(raw: &str) -> Result<TermDictionary, HeatwireError> {
        let parsed: RawDictionary = serde_json::from_str(raw)?;
        let mut by_lang: BTreeMap<Language, BTreeMap<TermCategory, Vec<HeatTerm>>> = BTreeMap::new();
        for (lang_code, categories) in parsed.terms {
            let language = Language::from_code(&lang_code)?;
            let mut by_cat: BTreeMap<TermCategory, Vec<HeatTerm>> = BTreeMap::new();
            for (cat_code, terms) in categories {
                let category = TermCategory::from_code(&cat_code)?;
                let terms = terms
                    .into_iter()
                    .filter(|t| !t.trim().is_empty())
                    .map(|term| HeatTerm {
                        term,
                        category,
                        language,
                    })
                    .collect::<Vec<_>>();
                if !terms.is_empty() {
                    by_cat.insert(category, terms);
                }
            }
            by_lang.insert(language, by_cat);
        }
        Ok(TermDictionary { by_lang })
    }

    /// All terms for a language, iterated in category-code order.
    pub fn by_language(&self, language: Language) -> Vec<&HeatTerm> {
        let Some(by_cat) = self.by_lang.get(&language) else {
            return Vec::new();
        };
        TermCategory::ALL
            .iter()
            .filter_map(|c| by_cat.get(c))
            .flat_map(|terms| terms.iter())
            .collect()
    }

    pub fn by_language_and_category(
        &self,
        language: Language,
        category: TermCategory,
    ) -> &[HeatTerm] {
        self.by_lang
            .get(&language)
            .and_then(|by_cat| by_cat.get(&category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories that have at least one term in this language, code order.
    pub fn categories_for(&self, language: Language) -> Vec<TermCategory> {
        let Some(by_cat) = self.by_lang.get(&language) else {
            return Vec::new();
        };
        TermCategory::ALL
            .into_iter()
            .filter(|c| by_cat.contains_key(c))
            .collect()
    }
}
