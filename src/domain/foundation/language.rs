//! Reply language of a turn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Languages the catalog carries templates and keywords for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    #[default]
    En,
    Ja,
    Th,
    Tl,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Zh,
        Language::En,
        Language::Ja,
        Language::Th,
        Language::Tl,
    ];

    /// Returns the wire code (`zh`, `en`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
            Language::Ja => "ja",
            Language::Th => "th",
            Language::Tl => "tl",
        }
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    /// Parses a language tag. Region suffixes such as `zh-CN` or `en_US` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            "th" => Ok(Language::Th),
            "tl" => Ok(Language::Tl),
            _ => Err(ValidationError::invalid_format(
                "language",
                format!("unsupported language tag '{}'", s),
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_codes() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn parses_region_tagged_codes() {
        assert_eq!("zh-CN".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("EN_us".parse::<Language>().unwrap(), Language::En);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!("fr".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Th).unwrap(), "\"th\"");
    }
}
