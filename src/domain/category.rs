use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConscienceError;

/// Fixed set of purchase categories accepted by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fast Food")]
    FastFood,
    Groceries,
    Dining,
    Electronics,
    Clothing,
    Entertainment,
    Health,
    Home,
    Transport,
    Travel,
    Subscriptions,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::FastFood,
        Category::Groceries,
        Category::Dining,
        Category::Electronics,
        Category::Clothing,
        Category::Entertainment,
        Category::Health,
        Category::Home,
        Category::Transport,
        Category::Travel,
        Category::Subscriptions,
        Category::Other,
    ];

    /// Substituted whenever an external source hands back an unknown category.
    pub const DEFAULT: Category = Category::Other;

    pub fn label(self) -> &'static str {
        match self {
            Category::FastFood => "Fast Food",
            Category::Groceries => "Groceries",
            Category::Dining => "Dining",
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Home => "Home",
            Category::Transport => "Transport",
            Category::Travel => "Travel",
            Category::Subscriptions => "Subscriptions",
            Category::Other => "Other",
        }
    }

    /// Lenient parse used for AI-provided values: unknown labels map to [`Category::DEFAULT`].
    pub fn parse_or_default(raw: &str) -> Category {
        raw.parse().unwrap_or(Category::DEFAULT)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ConscienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = normalize(s);
        Category::ALL
            .into_iter()
            .find(|category| normalize(category.label()) == needle)
            .ok_or_else(|| ConscienceError::InvalidInput(format!("unknown category `{}`", s.trim())))
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
