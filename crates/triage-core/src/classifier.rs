//! Keyword classifier mapping request text to priority, department and
//! category.
//!
//! The classifier is driven by an ordered [`RuleTable`].  Each [`Rule`] owns
//! one or more keywords and sets any subset of the three output fields.
//! Resolution is per field: the first rule in table order that sets the
//! field and has a keyword present in the text wins.  Fields no rule claims
//! fall back to the table's [`Defaults`].
//!
//! All keywords are compiled into one [`aho_corasick`] automaton and searched
//! with overlapping matching, so `street` and `streetlight` both register in
//! "streetlight out".  Matching is case-insensitive substring containment;
//! nothing else about the text is interpreted.
//!
//! # Example
//!
//! ```rust
//! # use triage_core::{Classifier, Department, Priority};
//! let classifier = Classifier::builtin().unwrap();
//! let c = classifier.classify("Urgent streetlight outage", "");
//! assert_eq!(c.priority, Priority::High);
//! assert_eq!(c.department, Department::PublicWorks);
//! assert_eq!(c.category, "Infrastructure");
//! ```

use std::collections::{BTreeSet, HashMap};

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TriageError};
use crate::request::{Department, Priority};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single classification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Keywords; any one of them present in the text triggers the rule.
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Explanation reported when this rule decides the department or
    /// priority.  Generated from the matched keywords when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Rule {
    /// Create a rule that triggers on any of `keywords` and sets nothing yet.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            priority: None,
            department: None,
            category: None,
            reason: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn sets_anything(&self) -> bool {
        self.priority.is_some() || self.department.is_some() || self.category.is_some()
    }
}

/// Values assigned to fields that no rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub priority: Priority,
    pub department: Department,
    pub category: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            priority: Priority::Low,
            department: Department::GeneralServices,
            category: "General".into(),
        }
    }
}

/// The rules shipped with the classifier, in precedence order.
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new(["urgent", "emergency", "hazard", "safety", "dangerous"])
            .with_priority(Priority::High),
        Rule::new(["broken", "not working", "issue", "problem", "fault"])
            .with_priority(Priority::Medium),
        Rule::new([
            "pothole",
            "streetlight",
            "sidewalk",
            "trash",
            "infrastructure",
            "road",
            "street",
        ])
        .with_department(Department::PublicWorks)
        .with_category("Infrastructure")
        .with_reason("Infrastructure and public works keywords detected"),
        Rule::new(["permit", "license", "zoning", "business permit", "application"])
            .with_department(Department::Licensing)
            .with_category("Permits & Licenses")
            .with_reason("Permit and licensing keywords detected"),
        Rule::new([
            "email", "vpn", "laptop", "password", "computer", "network", "software",
        ])
        .with_department(Department::It)
        .with_category("Technology")
        .with_reason("Technology and IT support keywords detected"),
        Rule::new(["payroll", "benefits", "vacation", "insurance", "employee", "hr"])
            .with_department(Department::Hr)
            .with_category("Human Resources")
            .with_reason("Human resources and employee services keywords detected"),
    ]
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// A validated, compiled, immutable rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    defaults: Defaults,
    /// Distinct keywords; index is the automaton pattern id.
    keywords: Vec<String>,
    /// Pattern ids belonging to each rule, parallel to `rules`.
    rule_patterns: Vec<Vec<usize>>,
    /// `None` when the table has no rules.
    automaton: Option<AhoCorasick>,
}

impl RuleTable {
    /// Validate `rules` and compile their keywords.
    ///
    /// Keywords are trimmed and lowercased.  Fails with
    /// [`TriageError::InvalidRule`] for a rule without keywords, with an
    /// empty keyword, with an empty category, or that sets no field.
    pub fn new(rules: Vec<Rule>, defaults: Defaults) -> Result<Self> {
        if defaults.category.trim().is_empty() {
            return Err(TriageError::RuleTableBuild {
                reason: "default category is empty".into(),
            });
        }

        let mut normalized = Vec::with_capacity(rules.len());
        let mut keywords: Vec<String> = Vec::new();
        let mut pattern_ids: HashMap<String, usize> = HashMap::new();
        let mut rule_patterns = Vec::with_capacity(rules.len());

        for (index, mut rule) in rules.into_iter().enumerate() {
            if rule.keywords.is_empty() {
                return Err(invalid_rule(index, "rule has no keywords"));
            }
            if !rule.sets_anything() {
                return Err(invalid_rule(
                    index,
                    "rule sets no priority, department or category",
                ));
            }
            if let Some(category) = &rule.category
                && category.trim().is_empty()
            {
                return Err(invalid_rule(index, "category is empty"));
            }

            let mut ids = Vec::with_capacity(rule.keywords.len());
            for keyword in &mut rule.keywords {
                *keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    return Err(invalid_rule(index, "keyword is empty"));
                }
                let id = *pattern_ids.entry(keyword.clone()).or_insert_with(|| {
                    keywords.push(keyword.clone());
                    keywords.len() - 1
                });
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }

            rule_patterns.push(ids);
            normalized.push(rule);
        }

        let automaton = if keywords.is_empty() {
            None
        } else {
            let ac = AhoCorasick::new(&keywords).map_err(|e| TriageError::RuleTableBuild {
                reason: e.to_string(),
            })?;
            tracing::trace!(count = keywords.len(), "keyword automaton built");
            Some(ac)
        };

        Ok(Self {
            rules: normalized,
            defaults,
            keywords,
            rule_patterns,
            automaton,
        })
    }

    /// The built-in table with the standard defaults.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_rules(), Defaults::default())
    }

    /// Rules in precedence order, with normalized keywords.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Per-keyword hit flags for already-lowercased `text`.
    fn hits(&self, text: &str) -> Vec<bool> {
        let mut hits = vec![false; self.keywords.len()];
        if let Some(ac) = &self.automaton {
            for mat in ac.find_overlapping_iter(text) {
                hits[mat.pattern().as_usize()] = true;
            }
        }
        hits
    }

    /// Keywords of rule `index` that are flagged in `hits`, in rule order.
    fn matched_keywords(&self, index: usize, hits: &[bool]) -> Vec<&str> {
        self.rule_patterns[index]
            .iter()
            .filter(|&&id| hits[id])
            .map(|&id| self.keywords[id].as_str())
            .collect()
    }
}

fn invalid_rule(index: usize, reason: &str) -> TriageError {
    TriageError::InvalidRule {
        index,
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Output of [`Classifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub priority: Priority,
    pub department: Department,
    pub category: String,
    /// Score from 60 (nothing matched) to 95, growing with the number of
    /// detected keywords.
    pub confidence: u8,
    /// Sorted, de-duplicated keywords of the winning rules.
    pub keywords_detected: Vec<String>,
    pub priority_reason: String,
    pub department_reason: String,
}

/// Confidence percentage for `detected` distinct keywords.
pub fn confidence_for(detected: usize) -> u8 {
    match detected {
        0 => 60,
        1 => 65,
        2 => 75,
        n => (85 + 2 * (n - 3)).min(95) as u8,
    }
}

/// A field value together with the rule that decided it.
struct Winner<'a, T> {
    value: T,
    rule: &'a Rule,
    keywords: Vec<&'a str>,
}

/// Rule-driven request classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: RuleTable,
}

impl Classifier {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// A classifier over [`RuleTable::builtin`].
    pub fn builtin() -> Result<Self> {
        RuleTable::builtin().map(Self::new)
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Classify a request from its summary and description.
    pub fn classify(&self, summary: &str, description: &str) -> Classification {
        self.classify_text(&format!("{summary} {description}"))
    }

    /// Classify arbitrary text.  Never fails; text matching no rule yields
    /// the table defaults.
    pub fn classify_text(&self, text: &str) -> Classification {
        let text = text.to_lowercase();
        let hits = self.table.hits(&text);

        let mut priority: Option<Winner<'_, Priority>> = None;
        let mut department: Option<Winner<'_, Department>> = None;
        let mut category: Option<Winner<'_, &str>> = None;

        for (index, rule) in self.table.rules.iter().enumerate() {
            if priority.is_some() && department.is_some() && category.is_some() {
                break;
            }
            let found = self.table.matched_keywords(index, &hits);
            if found.is_empty() {
                continue;
            }
            if priority.is_none()
                && let Some(value) = rule.priority
            {
                priority = Some(Winner { value, rule, keywords: found.clone() });
            }
            if department.is_none()
                && let Some(value) = rule.department
            {
                department = Some(Winner { value, rule, keywords: found.clone() });
            }
            if category.is_none()
                && let Some(value) = rule.category.as_deref()
            {
                category = Some(Winner { value, rule, keywords: found });
            }
        }

        let defaults = &self.table.defaults;

        let keywords_detected: Vec<String> = priority
            .iter()
            .flat_map(|w| w.keywords.iter())
            .chain(department.iter().flat_map(|w| w.keywords.iter()))
            .chain(category.iter().flat_map(|w| w.keywords.iter()))
            .map(|k| k.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let priority_reason = match &priority {
            Some(w) => w.rule.reason.clone().unwrap_or_else(|| {
                format!(
                    "Detected {} priority keywords: {}",
                    w.value.as_str().to_lowercase(),
                    w.keywords.iter().take(3).copied().collect::<Vec<_>>().join(", ")
                )
            }),
            None => format!(
                "No high-priority indicators found. Classified as {} priority.",
                defaults.priority
            ),
        };

        let department_reason = match &department {
            Some(w) => w.rule.reason.clone().unwrap_or_else(|| {
                format!(
                    "{} keywords detected: {}",
                    w.value,
                    w.keywords.iter().take(3).copied().collect::<Vec<_>>().join(", ")
                )
            }),
            None => format!(
                "No specific department keywords found. Routed to {}.",
                defaults.department
            ),
        };

        let classification = Classification {
            priority: priority.map_or(defaults.priority, |w| w.value),
            department: department.map_or(defaults.department, |w| w.value),
            category: category.map_or_else(|| defaults.category.clone(), |w| w.value.to_string()),
            confidence: confidence_for(keywords_detected.len()),
            keywords_detected,
            priority_reason,
            department_reason,
        };

        debug!(
            priority = %classification.priority,
            department = %classification.department,
            category = %classification.category,
            confidence = classification.confidence,
            "request classified"
        );
        classification
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
