use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::candidate::ABSENCE_MARKER;

/// Skill names recognized when no `SKILL_VOCABULARY` is configured.
pub const DEFAULT_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "SQL",
    "AWS",
    "Data Analysis",
    "C++",
    "Excel",
    "Machine Learning",
    "Docker",
    "Kubernetes",
];

/// Number of leading vocabulary entries highlighted by default.
pub const DEFAULT_HIGHLIGHT_COUNT: usize = 5;

/// The configured skill vocabulary plus the subset highlighted when a client
/// does not choose its own. Read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillVocabulary {
    skills: Vec<String>,
    default_highlight: Vec<String>,
}

impl SkillVocabulary {
    /// Builds a vocabulary from canonical names, dropping blanks and repeats
    /// while keeping first-seen order. Highlight entries not in the vocabulary
    /// are ignored; `None` highlights the first few entries.
    pub fn new<I, S>(skills: I, default_highlight: Option<Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let skills: Vec<String> = skills
            .into_iter()
            .map(|s| Into::<String>::into(s).trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        let default_highlight = match default_highlight {
            Some(requested) => select_known(&skills, &requested),
            None => skills.iter().take(DEFAULT_HIGHLIGHT_COUNT).cloned().collect(),
        };

        Self {
            skills,
            default_highlight,
        }
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn default_highlight(&self) -> &[String] {
        &self.default_highlight
    }

    /// Resolves a client's highlight selection: known entries only, falling
    /// back to the default subset when the client sent none.
    pub fn resolve_highlight(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            self.default_highlight.clone()
        } else {
            select_known(&self.skills, requested)
        }
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied(), None)
    }
}

fn select_known(skills: &[String], requested: &[String]) -> Vec<String> {
    skills
        .iter()
        .filter(|skill| requested.iter().any(|r| r.trim() == skill.as_str()))
        .cloned()
        .collect()
}

/// Found skills that are also highlighted.
pub fn highlighted_skills(found: &BTreeSet<String>, highlight: &[String]) -> Vec<String> {
    found
        .iter()
        .filter(|skill| highlight.contains(skill))
        .cloned()
        .collect()
}

/// Comma-separated display string with highlighted skills in `**bold**`, or
/// the absence marker when nothing was found.
pub fn format_skills(found: &BTreeSet<String>, highlight: &[String]) -> String {
    if found.is_empty() {
        return ABSENCE_MARKER.to_string();
    }
    found
        .iter()
        .map(|skill| {
            if highlight.contains(skill) {
                format!("**{skill}**")
            } else {
                skill.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
