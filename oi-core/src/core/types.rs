//! Small label-value enums shared by the data and monitoring layers

use std::fmt;

/// Which side of a chain entry a sample was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Put side (`PE`)
    Put,
    /// Call side (`CE`)
    Call,
}

impl OptionType {
    /// Label value as published by the exchange
    pub const fn as_str(&self) -> &'static str {
        match self {
            OptionType::Put => "PE",
            OptionType::Call => "CE",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStatus {
    Ok,
    Fail,
}

impl ScrapeStatus {
    /// Every status, in exposition order
    pub const ALL: [ScrapeStatus; 2] = [ScrapeStatus::Ok, ScrapeStatus::Fail];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Ok => "ok",
            ScrapeStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_labels() {
        assert_eq!(OptionType::Put.as_str(), "PE");
        assert_eq!(OptionType::Call.to_string(), "CE");
    }

    #[test]
    fn test_scrape_status_labels() {
        let labels: Vec<_> = ScrapeStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["ok", "fail"]);
    }
}
