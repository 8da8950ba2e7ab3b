//! Organizations that accept donated books

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BUNDLED_CHARITIES: &str = include_str!("../../data/charities.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub image: String,
    pub needs: Vec<String>,
    pub email: String,
    pub website: String,
}

pub fn bundled() -> Result<Vec<Charity>> {
    serde_json::from_str(BUNDLED_CHARITIES).context("bundled charity list is malformed")
}

/// Distinct categories in first-seen order
pub fn categories(charities: &[Charity]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for charity in charities {
        if !seen.contains(&charity.category.as_str()) {
            seen.push(&charity.category);
        }
    }
    seen
}

/// Case-insensitive substring search over name and description, plus an exact
/// category match when one is given.
pub fn search<'a>(charities: &'a [Charity], term: &str, category: Option<&str>) -> Vec<&'a Charity> {
    let term = term.to_lowercase();

    let matches: Vec<&Charity> = charities
        .iter()
        .filter(|charity| {
            term.is_empty()
                || charity.name.to_lowercase().contains(&term)
                || charity.description.to_lowercase().contains(&term)
        })
        .filter(|charity| category.is_none_or(|category| charity.category == category))
        .collect();

    debug!("{} of {} charities match {:?}", matches.len(), charities.len(), term);
    matches
}
