use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Cycles low -> medium -> high -> low, used by the selector controls.
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(DomainError::Validation(format!(
                "Priority must be one of low, medium, high (got '{s}')"
            ))),
        }
    }
}

// Upstream rows are not guaranteed to be lower-case.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn admits(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => *p == priority,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::Only(p) => p.label(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::High) => PriorityFilter::All,
            PriorityFilter::Only(p) => PriorityFilter::Only(p.next()),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        s.parse().map(PriorityFilter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
        let p: Priority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(p, Priority::High);
    }

    #[test]
    fn test_filter_cycle_visits_every_value() {
        let mut filter = PriorityFilter::All;
        let mut seen = vec![filter];
        for _ in 0..3 {
            filter = filter.next();
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                PriorityFilter::All,
                PriorityFilter::Only(Priority::Low),
                PriorityFilter::Only(Priority::Medium),
                PriorityFilter::Only(Priority::High),
            ]
        );
        assert_eq!(filter.next(), PriorityFilter::All);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
        assert_eq!(
            "low".parse::<PriorityFilter>().unwrap(),
            PriorityFilter::Only(Priority::Low)
        );
    }
}
