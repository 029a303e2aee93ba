use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anniversary::Anniversary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
    Ja,
    De,
    Sv,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Ko,
        Language::Ja,
        Language::De,
        Language::Sv,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
            Language::Ja => "ja",
            Language::De => "de",
            Language::Sv => "sv",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported language `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| UnknownLanguage(s.to_owned()))
    }
}

/// Everything restored from storage at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub birth_date: Option<DateTime<Utc>>,
    pub anniversaries: Vec<Anniversary>,
    pub language: Language,
    pub hidden_ad_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("ko".parse::<Language>(), Ok(Language::Ko));
        assert_eq!(" SV ".parse::<Language>(), Ok(Language::Sv));
        assert_eq!(
            "fr".parse::<Language>(),
            Err(UnknownLanguage("fr".to_owned()))
        );
    }

    #[test]
    fn serializes_as_bare_code() {
        assert_eq!(serde_json::to_string(&Language::De).unwrap(), "\"de\"");
        assert_eq!(
            serde_json::from_str::<Language>("\"ja\"").unwrap(),
            Language::Ja
        );
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(Profile::default().language, Language::En);
    }
}
