use serde::Deserialize;

use super::slug::slugify;
use crate::error::HeatwireError;
use crate::model::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    State,
    UnionTerritory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub name: String,
    pub slug: String,
}

/// One of India's 36 states or union territories.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub slug: String,
    pub kind: RegionKind,
    /// Languages news is published in for this region, catalog order.
    pub languages: Vec<Language>,
    /// Districts in catalog order; district queries batch in this order.
    pub districts: Vec<District>,
}

/// The read-only geography master data.
#[derive(Debug, Clone)]
pub struct Catalog {
    regions: Vec<Region>,
}

#[derive(Deserialize)]
struct RawCatalog {
    regions: Vec<RawRegion>,
}

#[derive(Deserialize)]
struct RawRegion {
    name: String,
    kind: String,
    languages: Vec<String>,
    districts: Vec<String>,
}

impl Catalog {
    /// The embedded India dataset the daily run uses.
    pub fn builtin() -> Catalog {
        // The embedded dataset is validated by tests, so a parse failure here
        // is a build defect, not a runtime condition.
        Self::from_json_str(include_str!("../../data/regions.json"))
            .expect("embedded regions.json is valid")
    }

    pub fn from_json_str(raw: &str) -> Result<Catalog, HeatwireError> {
        let parsed: RawCatalog = serde_json::from_str(raw)?;
        let mut regions = Vec::with_capacity(parsed.regions.len());
        for r in parsed.regions {
            let kind = match r.kind.as_str() {
                "state" => RegionKind::State,
                "union-territory" => RegionKind::UnionTerritory,
                other => {
                    return Err(HeatwireError::Catalog(format!(
                        "unknown region kind '{other}' for {}",
                        r.name
                    )));
                }
            };
            if r.languages.is_empty() {
                return Err(HeatwireError::Catalog(format!(
                    "region {} has no languages",
                    r.name
                )));
            }
            let languages = r
                .languages
                .iter()
                .map(|c| Language::from_code(c))
                .collect::<Result<Vec<_>, _>>()?;
            let districts = r
                .districts
                .iter()
                .map(|d| District {
                    name: d.clone(),
                    slug: slugify(d),
                })
                .collect();
            regions.push(Region {
                slug: slugify(&r.name),
                name: r.name,
                kind,
                languages,
                districts,
            });
        }
        Ok(Catalog { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, slug: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.slug == slug)
    }

    /// Subset view for partial runs; unknown slugs are an error so typos in
    /// `--regions` fail fast instead of silently collecting nothing.
    pub fn restricted_to(&self, slugs: &[String]) -> Result<Catalog, HeatwireError> {
        let mut regions = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match self.get(slug) {
                Some(r) => regions.push(r.clone()),
                None => {
                    return Err(HeatwireError::Catalog(format!("unknown region slug '{slug}'")));
                }
            }
        }
        Ok(Catalog { regions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_all_36_regions() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.regions().len(), 36);
        let states = catalog
            .regions()
            .iter()
            .filter(|r| r.kind == RegionKind::State)
            .count();
        assert_eq!(states, 28);
    }

    #[test]
    fn builtin_slugs_are_kebab_case() {
        let catalog = Catalog::builtin();
        let jk = catalog.get("jammu-and-kashmir").expect("J&K present");
        assert_eq!(jk.kind, RegionKind::UnionTerritory);
        assert!(jk.districts.iter().any(|d| d.slug == "srinagar"));
    }

    #[test]
    fn builtin_languages_validate() {
        let catalog = Catalog::builtin();
        let tn = catalog.get("tamil-nadu").unwrap();
        assert!(tn.languages.contains(&Language::Tamil));
        for region in catalog.regions() {
            assert!(!region.languages.is_empty(), "{} has languages", region.name);
            assert!(!region.districts.is_empty(), "{} has districts", region.name);
        }
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let raw = r#"{"regions":[{"name":"X","kind":"province","languages":["en"],"districts":["Y"]}]}"#;
        assert!(Catalog::from_json_str(raw).is_err());
    }

    #[test]
    fn unknown_language_is_an_error() {
        let raw = r#"{"regions":[{"name":"X","kind":"state","languages":["zz"],"districts":["Y"]}]}"#;
        assert!(Catalog::from_json_str(raw).is_err());
    }

    #[test]
    fn restricted_to_keeps_order_and_rejects_typos() {
        let catalog = Catalog::builtin();
        let subset = catalog
            .restricted_to(&["bihar".to_string(), "delhi".to_string()])
            .unwrap();
        let names: Vec<&str> = subset.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bihar", "Delhi"]);
        assert!(catalog.restricted_to(&["biharr".to_string()]).is_err());
    }
}
