//! Sheet selection

use std::fmt;

/// Identifies one worksheet of a workbook, by position or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SheetSelector {
    /// 0-based position in the workbook's worksheet list
    Index(usize),
    /// Exact sheet name
    Name(String),
}

impl SheetSelector {
    /// Resolve against a workbook's sheet names, returning the position
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Option<usize> {
        match self {
            SheetSelector::Index(i) => (*i < names.len()).then_some(*i),
            SheetSelector::Name(name) => names.iter().position(|n| n.as_ref() == name),
        }
    }

    /// Interpret user input: all digits selects by position, anything else by name
    pub fn parse(input: &str) -> Self {
        match input.parse::<usize>() {
            Ok(i) if input.bytes().all(|b| b.is_ascii_digit()) => SheetSelector::Index(i),
            _ => SheetSelector::Name(input.to_string()),
        }
    }
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{}", i),
            SheetSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl From<usize> for SheetSelector {
    fn from(i: usize) -> Self {
        SheetSelector::Index(i)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

impl From<String> for SheetSelector {
    fn from(name: String) -> Self {
        SheetSelector::Name(name)
    }
}
