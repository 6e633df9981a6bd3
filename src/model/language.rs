use serde::{Deserialize, Serialize};

use crate::error::HeatwireError;

/// The 14 Indian-language codes the pipeline collects in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "gu")]
    Gujarati,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "or")]
    Odia,
    #[serde(rename = "pa")]
    Punjabi,
    #[serde(rename = "as")]
    Assamese,
    #[serde(rename = "ur")]
    Urdu,
    #[serde(rename = "ne")]
    Nepali,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Bengali,
        Language::Marathi,
        Language::Gujarati,
        Language::Kannada,
        Language::Malayalam,
        Language::Odia,
        Language::Punjabi,
        Language::Assamese,
        Language::Urdu,
        Language::Nepali,
    ];

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Bengali => "bn",
            Language::Marathi => "mr",
            Language::Gujarati => "gu",
            Language::Kannada => "kn",
            Language::Malayalam => "ml",
            Language::Odia => "or",
            Language::Punjabi => "pa",
            Language::Assamese => "as",
            Language::Urdu => "ur",
            Language::Nepali => "ne",
        }
    }

    pub fn from_code(code: &str) -> Result<Language, HeatwireError> {
        match code {
            "en" => Ok(Language::English),
            "hi" => Ok(Language::Hindi),
            "ta" => Ok(Language::Tamil),
            "te" => Ok(Language::Telugu),
            "bn" => Ok(Language::Bengali),
            "mr" => Ok(Language::Marathi),
            "gu" => Ok(Language::Gujarati),
            "kn" => Ok(Language::Kannada),
            "ml" => Ok(Language::Malayalam),
            "or" => Ok(Language::Odia),
            "pa" => Ok(Language::Punjabi),
            "as" => Ok(Language::Assamese),
            "ur" => Ok(Language::Urdu),
            "ne" => Ok(Language::Nepali),
            other => Err(HeatwireError::InvalidLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_code_exactly_once() {
        let mut codes: Vec<&str> = Language::ALL.iter().map(|l| l.as_code()).collect();
        assert_eq!(codes.len(), 14);
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 14);
    }

    #[test]
    fn from_code_round_trips() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.as_code()).unwrap(), lang);
        }
    }

    #[test]
    fn from_code_rejects_unknown() {
        assert!(Language::from_code("xx").is_err());
        assert!(Language::from_code("").is_err());
        assert!(Language::from_code("EN").is_err());
    }

    #[test]
    fn serde_uses_two_letter_codes() {
        let json = serde_json::to_string(&Language::Hindi).unwrap();
        assert_eq!(json, "\"hi\"");
        let back: Language = serde_json::from_str("\"ta\"").unwrap();
        assert_eq!(back, Language::Tamil);
    }
}
