//! Problem categories

use serde::{Deserialize, Serialize};

/// Kind of problem the player practises in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Geometry,
    Fractions,
    Time,
    Units,
    Decimals,
}

impl Category {
    /// Every category, in menu order
    pub const ALL: [Category; 9] = [
        Category::Addition,
        Category::Subtraction,
        Category::Multiplication,
        Category::Division,
        Category::Geometry,
        Category::Fractions,
        Category::Time,
        Category::Units,
        Category::Decimals,
    ];

    /// Stable identifier (used for DOM ids and settings)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Addition => "addition",
            Category::Subtraction => "subtraction",
            Category::Multiplication => "multiplication",
            Category::Division => "division",
            Category::Geometry => "geometry",
            Category::Fractions => "fractions",
            Category::Time => "time",
            Category::Units => "units",
            Category::Decimals => "decimals",
        }
    }

    /// Category from an id or a short alias (`?category=` on the web, the demo argument natively)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "addition" | "add" | "+" => Some(Category::Addition),
            "subtraction" | "sub" | "-" => Some(Category::Subtraction),
            "multiplication" | "mul" | "×" | "*" => Some(Category::Multiplication),
            "division" | "div" | "÷" | "/" => Some(Category::Division),
            "geometry" => Some(Category::Geometry),
            "fractions" | "fraction" => Some(Category::Fractions),
            "time" => Some(Category::Time),
            "units" | "unit" => Some(Category::Units),
            "decimals" | "decimal" => Some(Category::Decimals),
            _ => None,
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Addition => "Addition",
            Category::Subtraction => "Subtraction",
            Category::Multiplication => "Multiplication",
            Category::Division => "Division",
            Category::Geometry => "Geometry",
            Category::Fractions => "Fractions",
            Category::Time => "Time",
            Category::Units => "Units",
            Category::Decimals => "Decimals",
        }
    }

    /// Word problems beyond the four basic operations
    pub fn is_extended(&self) -> bool {
        !matches!(
            self,
            Category::Addition | Category::Subtraction | Category::Multiplication | Category::Division
        )
    }
}
