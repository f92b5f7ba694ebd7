use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Normalized severity, 1 (most severe) through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MOST_SEVERE: u8 = 1;
    pub const LEAST_SEVERE: u8 = 5;

    /// All severities, most severe first
    pub const ALL: [Severity; 5] = [Severity(1), Severity(2), Severity(3), Severity(4), Severity(5)];

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MOST_SEVERE as i64..=Self::LEAST_SEVERE as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Critical",
            2 => "High",
            3 => "Moderate",
            4 => "Low",
            _ => "Info",
        }
    }

    pub(crate) fn index(self) -> usize {
        (self.0 - Self::MOST_SEVERE) as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a violation; ordered by file, then line, then column
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ViolationLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl ViolationLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// Canonical `file:line:column` form; uses exactly the fields that order locations
impl fmt::Display for ViolationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A single finding reported by an analyzer engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub severity: Severity,
    pub location: ViolationLocation,
    pub rule: String,
    pub engine: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Violation {
    /// Most severe first, then by location
    pub fn severity_order(a: &Violation, b: &Violation) -> Ordering {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.location.cmp(&b.location))
    }
}
