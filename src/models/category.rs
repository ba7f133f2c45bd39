// src/models/category.rs

//! Browsable catalog categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A catalog category from the fixed browsable set.
///
/// The "no filter" sentinel is expressed as `Option<Category>::None`
/// wherever a selection may be unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fiction,
    Science,
    History,
    Technology,
    Philosophy,
    Art,
    Biography,
    Poetry,
    Mathematics,
    Romance,
}

impl Category {
    /// Every category, in default display order.
    pub const ALL: [Category; 10] = [
        Category::Fiction,
        Category::Science,
        Category::History,
        Category::Technology,
        Category::Philosophy,
        Category::Art,
        Category::Biography,
        Category::Poetry,
        Category::Mathematics,
        Category::Romance,
    ];

    /// Lowercase identifier, also used as the upstream subject name.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Fiction => "fiction",
            Category::Science => "science",
            Category::History => "history",
            Category::Technology => "technology",
            Category::Philosophy => "philosophy",
            Category::Art => "art",
            Category::Biography => "biography",
            Category::Poetry => "poetry",
            Category::Mathematics => "mathematics",
            Category::Romance => "romance",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Fiction => "Fiction",
            Category::Science => "Science",
            Category::History => "History",
            Category::Technology => "Technology",
            Category::Philosophy => "Philosophy",
            Category::Art => "Art",
            Category::Biography => "Biography",
            Category::Poetry => "Poetry",
            Category::Mathematics => "Mathematics",
            Category::Romance => "Romance",
        }
    }

    /// Whether an upstream subject string belongs to this category.
    ///
    /// The slug must appear as a whole word: "Science fiction" is fiction,
    /// "Nonfiction" is not.
    pub fn matches_subject(&self, subject: &str) -> bool {
        subject
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == self.slug())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown category '{}'", s.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Science".parse::<Category>().unwrap(), Category::Science);
        assert_eq!(" poetry ".parse::<Category>().unwrap(), Category::Poetry);
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn test_matches_subject() {
        assert!(Category::Science.matches_subject("Popular Science"));
        assert!(Category::Fiction.matches_subject("Fiction, general"));
        assert!(!Category::History.matches_subject("Cooking"));
    }

    #[test]
    fn test_matches_subject_needs_whole_word() {
        assert!(Category::Fiction.matches_subject("Science-Fiction"));
        assert!(!Category::Fiction.matches_subject("Nonfiction"));
        assert!(!Category::Fiction.matches_subject("Juvenile nonfiction"));
        assert!(!Category::Art.matches_subject("Heart"));
        assert!(!Category::Art.matches_subject("Earth sciences"));
        assert!(!Category::Art.matches_subject("Martial arts"));
        assert!(Category::Art.matches_subject("Art, Modern"));
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&Category::Mathematics).unwrap();
        assert_eq!(json, "\"mathematics\"");
    }
}
