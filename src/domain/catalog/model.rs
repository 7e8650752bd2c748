//! Strongly typed workflow catalog.
//!
//! The catalog is the business configuration of the engine: per business type
//! keyword tables, localized reply templates and guide images, plus category
//! routes, direct answers and classification thresholds. It is immutable once
//! loaded; reloads build a new catalog and swap it in whole.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::CatalogError;
use crate::domain::foundation::{BusinessType, Language};
use crate::domain::outcome::{ActivityRef, MessageKey};

/// Text keyed by language.
pub type LocalizedText = BTreeMap<Language, String>;

/// Per-language phrase lists.
pub type PhraseTable = BTreeMap<Language, Vec<String>>;

/// Configuration of one business type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_type: BusinessType,
    #[serde(default)]
    pub keywords: PhraseTable,
    #[serde(default)]
    pub guide_images: Vec<String>,
    #[serde(default)]
    pub templates: BTreeMap<MessageKey, LocalizedText>,
}

/// What a caller-supplied category hint resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    BusinessType(BusinessType),
    DirectAnswer(String),
}

/// Maps a `{main: sub}` category hint to a target. A route without `sub`
/// matches every sub-category of `main`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRoute {
    pub main: String,
    #[serde(default)]
    pub sub: Option<String>,
    /// Written as a one-key map: `{business_type: S001}` or `{direct_answer: name}`.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub target: RouteTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentifierSettings {
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default = "default_attempt_min_digits")]
    pub attempt_min_digits: usize,
}

fn default_history_window() -> usize {
    3
}

fn default_attempt_min_digits() -> usize {
    12
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            attempt_min_digits: default_attempt_min_digits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSettings {
    /// Semantic results below this confidence defer to the human default.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_min_confidence() -> f64 {
    0.6
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalPhrases {
    /// Phrases meaning "I don't know where to find my order number".
    #[serde(default)]
    pub dont_know: PhraseTable,
}

fn default_reserved_state_codes() -> Vec<i64> {
    vec![1001]
}

/// The full business configuration of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCatalog {
    #[serde(default)]
    pub default_language: Language,
    #[serde(default)]
    pub identifier: IdentifierSettings,
    #[serde(default)]
    pub classification: ClassificationSettings,
    #[serde(default = "default_reserved_state_codes")]
    pub reserved_state_codes: Vec<i64>,
    #[serde(default)]
    pub signals: SignalPhrases,
    pub business_types: Vec<BusinessProfile>,
    #[serde(default)]
    pub common_templates: BTreeMap<MessageKey, LocalizedText>,
    #[serde(default)]
    pub category_routes: Vec<CategoryRoute>,
    #[serde(default)]
    pub direct_answers: BTreeMap<String, LocalizedText>,
    /// Activity name to extra phrases users refer to it by.
    #[serde(default)]
    pub activity_aliases: BTreeMap<String, Vec<String>>,
}

impl WorkflowCatalog {
    /// Parses and validates a catalog from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: WorkflowCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Semantic checks a schema cannot express.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for profile in &self.business_types {
            if profile.business_type == BusinessType::Unset {
                return Err(CatalogError::invalid("'unset' cannot have a profile"));
            }
            if !seen.insert(profile.business_type) {
                return Err(CatalogError::invalid(format!(
                    "duplicate profile for business type {}",
                    profile.business_type
                )));
            }
        }

        let handoff_ok = self
            .common_templates
            .get(&MessageKey::Handoff)
            .map(|text| text.contains_key(&self.default_language))
            .unwrap_or(false);
        if !handoff_ok {
            return Err(CatalogError::invalid(format!(
                "common template 'handoff' must exist in default language '{}'",
                self.default_language
            )));
        }

        for route in &self.category_routes {
            if let RouteTarget::DirectAnswer(name) = &route.target {
                if !self.direct_answers.contains_key(name) {
                    return Err(CatalogError::invalid(format!(
                        "route '{}' references unknown direct answer '{}'",
                        route.main, name
                    )));
                }
            }
            if let RouteTarget::BusinessType(BusinessType::Unset) = route.target {
                return Err(CatalogError::invalid(format!(
                    "route '{}' targets 'unset'",
                    route.main
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.classification.min_confidence) {
            return Err(CatalogError::invalid("min_confidence must be within [0, 1]"));
        }
        if self.identifier.attempt_min_digits == 0 {
            return Err(CatalogError::invalid("attempt_min_digits must be positive"));
        }

        Ok(())
    }

    pub fn profile(&self, business_type: BusinessType) -> Option<&BusinessProfile> {
        self.business_types
            .iter()
            .find(|p| p.business_type == business_type)
    }

    /// Resolves a reply template.
    ///
    /// Lookup order: the business profile in `lang`, then in the default
    /// language, then the common templates in the same two languages, then the
    /// handoff notice. The key name is the last resort.
    pub fn template(&self, business_type: BusinessType, key: MessageKey, lang: Language) -> String {
        let profile_text = self
            .profile(business_type)
            .and_then(|p| p.templates.get(&key))
            .and_then(|text| self.localize(text, lang));

        profile_text
            .or_else(|| {
                self.common_templates
                    .get(&key)
                    .and_then(|text| self.localize(text, lang))
            })
            .or_else(|| {
                self.common_templates
                    .get(&MessageKey::Handoff)
                    .and_then(|text| self.localize(text, lang))
            })
            .map(str::to_string)
            .unwrap_or_else(|| key.as_str().to_string())
    }

    /// Resolves a template and substitutes `{name}` placeholders.
    pub fn render(
        &self,
        business_type: BusinessType,
        key: MessageKey,
        lang: Language,
        args: &[(String, String)],
    ) -> String {
        let mut text = self.template(business_type, key, lang);
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    fn localize<'a>(&self, text: &'a LocalizedText, lang: Language) -> Option<&'a str> {
        text.get(&lang)
            .or_else(|| text.get(&self.default_language))
            .map(String::as_str)
    }

    fn phrases<'a>(&self, table: &'a PhraseTable, lang: Language) -> &'a [String] {
        table
            .get(&lang)
            .or_else(|| table.get(&self.default_language))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First business type, in declaration order, with a keyword contained in `message`.
    pub fn keyword_match(&self, message: &str, lang: Language) -> Option<BusinessType> {
        let lowered = message.to_lowercase();
        self.business_types
            .iter()
            .find(|profile| contains_any(&lowered, self.phrases(&profile.keywords, lang)))
            .map(|profile| profile.business_type)
    }

    /// True when the message asks for a human agent.
    pub fn wants_human(&self, message: &str, lang: Language) -> bool {
        let lowered = message.to_lowercase();
        self.profile(BusinessType::HumanService)
            .map(|p| contains_any(&lowered, self.phrases(&p.keywords, lang)))
            .unwrap_or(false)
    }

    /// True when the message says the user cannot find their order number.
    pub fn is_dont_know(&self, message: &str, lang: Language) -> bool {
        let lowered = message.to_lowercase();
        contains_any(&lowered, self.phrases(&self.signals.dont_know, lang))
    }

    /// Resolves a `{main: sub}` category hint. Exact sub-category routes beat wildcards.
    pub fn route(&self, main: &str, sub: Option<&str>) -> Option<&RouteTarget> {
        let main_matches = |route: &&CategoryRoute| route.main.eq_ignore_ascii_case(main.trim());

        let exact = sub.and_then(|sub| {
            self.category_routes.iter().filter(main_matches).find(|route| {
                route
                    .sub
                    .as_deref()
                    .map(|s| s.eq_ignore_ascii_case(sub.trim()))
                    .unwrap_or(false)
            })
        });

        exact
            .or_else(|| {
                self.category_routes
                    .iter()
                    .filter(main_matches)
                    .find(|route| route.sub.is_none())
            })
            .map(|route| &route.target)
    }

    pub fn direct_answer(&self, name: &str, lang: Language) -> Option<String> {
        self.direct_answers
            .get(name)
            .and_then(|text| self.localize(text, lang))
            .map(str::to_string)
    }

    pub fn guide_images(&self, business_type: BusinessType) -> Vec<String> {
        self.profile(business_type)
            .map(|p| p.guide_images.clone())
            .unwrap_or_default()
    }

    /// Matches the message against activity names and configured aliases.
    ///
    /// The first activity in list order whose name or alias occurs in the
    /// message wins.
    pub fn match_activity(&self, message: &str, activities: &[ActivityRef]) -> Option<ActivityRef> {
        let lowered = message.to_lowercase();
        activities
            .iter()
            .find(|activity| {
                let name_hit = lowered.contains(&activity.name.to_lowercase());
                let alias_hit = self
                    .activity_aliases
                    .get(&activity.name)
                    .map(|aliases| contains_any(&lowered, aliases))
                    .unwrap_or(false);
                name_hit || alias_hit
            })
            .cloned()
    }
}

fn contains_any(lowered_message: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| {
        let phrase = phrase.trim().to_lowercase();
        !phrase.is_empty() && lowered_message.contains(&phrase)
    })
}
