//! Launch-record data model.
//!
//! One [`LaunchRecord`] per CSV row, held in an immutable [`LaunchTable`]
//! that is loaded once at startup and shared read-only with every handler.
//!
//! # Control values
//!
//! The dashboard controls are modelled as plain values:
//! - [`SiteSelection`]: either every site (wire sentinel `ALL`) or one site name
//! - [`PayloadRange`]: an inclusive `[low, high]` payload window in kilograms

use serde::{Deserialize, Deserializer};

/// Wire value of the "all sites" dropdown entry.
pub const ALL_SITES: &str = "ALL";

/// Outcome class of a launch (CSV column `class`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Failure,
    Success,
}

impl Outcome {
    /// Parse the binary class value; anything other than 0 or 1 is rejected.
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Self::Failure),
            1 => Some(Self::Success),
            _ => None,
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            Self::Failure => 0,
            Self::Success => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Failure => "Failure",
            Self::Success => "Success",
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // pandas writes integer columns as "1" but a float column as "1.0"
        let raw = f64::deserialize(deserializer)?;
        let class = if raw == 0.0 || raw == 1.0 {
            Self::from_class(raw as u8)
        } else {
            None
        };
        class.ok_or_else(|| {
            serde::de::Error::custom(format!("launch class must be 0 or 1, got {raw}"))
        })
    }
}

// ============================================================================
// Records and Table
// ============================================================================

/// A single launch, as read from one CSV row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LaunchRecord {
    /// Launch site name (categorical).
    #[serde(rename = "Launch Site")]
    pub launch_site: String,
    /// Payload mass in kilograms.
    #[serde(rename = "Payload Mass (kg)")]
    pub payload_mass_kg: f64,
    /// Mission outcome (class 0/1).
    #[serde(rename = "class")]
    pub outcome: Outcome,
    /// Booster version category, used as the scatter colour channel.
    #[serde(rename = "Booster Version Category")]
    pub booster_version_category: String,
}

/// Observed payload extremes of the loaded table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadBounds {
    pub min: f64,
    pub max: f64,
}

impl PayloadBounds {
    /// The range spanning every observed payload.
    pub fn full_range(&self) -> PayloadRange {
        PayloadRange {
            low: self.min,
            high: self.max,
        }
    }
}

/// Read-only table of launches, populated once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchTable {
    records: Vec<LaunchRecord>,
}

impl LaunchTable {
    pub fn new(records: Vec<LaunchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Min and max payload mass, or `None` for an empty table.
    pub fn payload_bounds(&self) -> Option<PayloadBounds> {
        let mut iter = self.records.iter().map(|r| r.payload_mass_kg);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
        Some(PayloadBounds { min, max })
    }

    /// Distinct launch sites in order of first appearance.
    pub fn sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = Vec::new();
        for record in &self.records {
            if !sites.iter().any(|s| s == &record.launch_site) {
                sites.push(record.launch_site.clone());
            }
        }
        sites
    }

    /// Rows matching the site selection.
    pub fn by_site<'a>(
        &'a self,
        selection: &'a SiteSelection,
    ) -> impl Iterator<Item = &'a LaunchRecord> + 'a {
        self.records.iter().filter(move |r| selection.matches(&r.launch_site))
    }

    /// Rows whose payload lies in `range` and whose site matches `selection`.
    pub fn filter<'a>(
        &'a self,
        selection: &'a SiteSelection,
        range: PayloadRange,
    ) -> impl Iterator<Item = &'a LaunchRecord> + 'a {
        self.by_site(selection)
            .filter(move |r| range.contains(r.payload_mass_kg))
    }
}

// ============================================================================
// Control Values
// ============================================================================

/// Current value of the site dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    /// Parse a dropdown wire value. Empty input means every site.
    pub fn from_str(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == ALL_SITES {
            Self::All
        } else {
            Self::Site(trimmed.to_string())
        }
    }

    /// Value sent over the wire for this selection.
    pub fn wire_value(&self) -> &str {
        match self {
            Self::All => ALL_SITES,
            Self::Site(name) => name,
        }
    }

    #[inline]
    pub fn matches(&self, site: &str) -> bool {
        match self {
            Self::All => true,
            Self::Site(name) => name == site,
        }
    }
}

/// Invalid payload window.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RangeError {
    #[error("payload range bounds must be finite numbers")]
    NotFinite,
    #[error("payload range low bound {low} exceeds high bound {high}")]
    Inverted { low: f64, high: f64 },
}

/// Inclusive payload window selected on the range slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadRange {
    low: f64,
    high: f64,
}

impl PayloadRange {
    /// Build a range, rejecting `low > high` and NaN/infinite bounds.
    pub fn new(low: f64, high: f64) -> Result<Self, RangeError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(RangeError::NotFinite);
        }
        if low > high {
            return Err(RangeError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn contains(&self, payload: f64) -> bool {
        payload >= self.low && payload <= self.high
    }
}
