//! Resource-planning configuration model.
//!
//! The model mirrors the persisted document one-to-one: a [`Configuration`]
//! maps squad names to [`Squad`]s, and each squad owns an ordered list of
//! [`Project`]s. Every per-category map is keyed by a free-form category
//! label (`"BE"`, `"FE"`, `"QA"`, ...) shared across engineers, efficiency,
//! effort, and concurrency.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from category label to a value.
pub type CategoryMap<V> = IndexMap<String, V>;

/// The whole planning configuration, keyed by squad name.
///
/// Squads keep the order in which they were inserted. Inserting a squad
/// under an existing name replaces its value but keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    /// Squads by name.
    pub squads: IndexMap<String, Squad>,
}

impl Configuration {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a squad, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, squad: Squad) -> Option<Squad> {
        self.squads.insert(name.into(), squad)
    }

    /// Look up a squad by name.
    pub fn get(&self, name: &str) -> Option<&Squad> {
        self.squads.get(name)
    }

    /// Number of squads.
    pub fn len(&self) -> usize {
        self.squads.len()
    }

    /// Whether the configuration has no squads.
    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }

    /// Squad names in document order.
    pub fn squad_names(&self) -> Vec<&str> {
        self.squads.keys().map(String::as_str).collect()
    }

    /// Iterate over `(name, squad)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Squad)> {
        self.squads.iter().map(|(name, squad)| (name.as_str(), squad))
    }

    /// Every category label used anywhere in the configuration.
    pub fn category_labels(&self) -> BTreeSet<&str> {
        let mut labels = BTreeSet::new();
        for squad in self.squads.values() {
            labels.extend(squad.engineers.keys().map(String::as_str));
            labels.extend(squad.efficiency.keys().map(String::as_str));
            for project in &squad.projects {
                labels.extend(project.effort.keys().map(String::as_str));
                labels.extend(project.concurrency.keys().map(String::as_str));
            }
        }
        labels
    }
}

/// A team with its own headcounts, efficiency factors, and project list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Squad {
    /// Headcount per category; fractional values are part-time engineers.
    pub engineers: CategoryMap<f64>,
    /// Efficiency multiplier per category.
    pub efficiency: CategoryMap<f64>,
    /// Planning start date, stored verbatim.
    pub start_date: String,
    /// Projects in priority-list order.
    pub projects: Vec<Project>,
}

/// A unit of planned work within a squad.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Identifier, unique within the squad by convention.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ordering hint interpreted by the UI.
    pub priority: i64,
    /// Effort per category.
    pub effort: CategoryMap<f64>,
    /// Parallelism limit per category.
    pub concurrency: CategoryMap<i64>,
}
