use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SalaryConfig;

pub const DEFAULT_HOURLY_THRESHOLD: f64 = 250.0;
pub const DEFAULT_ANNUAL_HOURS: f64 = 2000.0;

/// First number in the text, optionally currency-prefixed, with an optional unit
static SALARY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?([0-9]+(?:\.[0-9]+)?)\s*(k|per hour|hour|usd|a year)?")
        .expect("salary pattern is valid")
});

/// Unit token that followed the salary figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SalaryUnit {
    Thousands,
    Hourly,
    Annual,
}

impl SalaryUnit {
    fn from_token(token: &str) -> Self {
        match token {
            "k" => SalaryUnit::Thousands,
            "per hour" | "hour" => SalaryUnit::Hourly,
            _ => SalaryUnit::Annual,
        }
    }
}

/// Parses free-text salary strings into annual figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryParser {
    hourly_threshold: f64,
    annual_hours: f64,
}

impl Default for SalaryParser {
    fn default() -> Self {
        Self {
            hourly_threshold: DEFAULT_HOURLY_THRESHOLD,
            annual_hours: DEFAULT_ANNUAL_HOURS,
        }
    }
}

impl SalaryParser {
    pub fn new(config: &SalaryConfig) -> Self {
        Self {
            hourly_threshold: config.hourly_threshold,
            annual_hours: config.annual_hours,
        }
    }

    /// Parse a salary string into a positive annual value rounded to cents.
    ///
    /// `k` multiplies by a thousand. An hourly unit, or a unit-less value below
    /// the hourly threshold, is multiplied by the annual work hours. Anything
    /// else is taken as already annual. Returns `None` when no number is found
    /// or the result is not positive.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let cleaned = text.replace(',', "").to_lowercase();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return None;
        }

        let captures = SALARY_PATTERN.captures(cleaned)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        let unit = captures.get(2).map(|m| SalaryUnit::from_token(m.as_str()));

        let annual = match unit {
            Some(SalaryUnit::Thousands) => value * 1000.0,
            Some(SalaryUnit::Hourly) => value * self.annual_hours,
            None if value < self.hourly_threshold => value * self.annual_hours,
            _ => value,
        };

        let rounded = round_cents(annual);
        (rounded.is_finite() && rounded > 0.0).then_some(rounded)
    }
}

/// Parse with the default threshold and work hours
pub fn parse_salary(text: &str) -> Option<f64> {
    SalaryParser::default().parse(text)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
