//! Static page layout: heading, site dropdown, payload slider and the two
//! chart placeholders. Serialised to JSON and rendered by the page script.

use serde::Serialize;

use crate::dispatch::{ControlId, OutputId};
use crate::model::{PayloadBounds, ALL_SITES};

pub const HEADING: &str = "SpaceX Launch Records Dashboard";
pub const DEFAULT_SLIDER_STEP: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub heading: &'static str,
    pub dropdown: Dropdown,
    pub slider: RangeSlider,
    pub graphs: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: &'static str,
    pub options: Vec<DropdownOption>,
    pub value: &'static str,
    pub placeholder: &'static str,
    pub searchable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub id: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Tick positions, one per step inside `[min, max]`.
    pub marks: Vec<f64>,
    pub value: [f64; 2],
}

impl DashboardLayout {
    /// Build the layout for the given site options and observed payload bounds.
    pub fn build(sites: &[String], bounds: PayloadBounds, step: f64) -> Self {
        let mut options = vec![DropdownOption {
            label: "All Sites".to_string(),
            value: ALL_SITES.to_string(),
        }];
        options.extend(sites.iter().map(|site| DropdownOption {
            label: site.clone(),
            value: site.clone(),
        }));

        Self {
            heading: HEADING,
            dropdown: Dropdown {
                id: ControlId::SiteDropdown.wire_id(),
                options,
                value: ALL_SITES,
                placeholder: "Select a Launch Site here",
                searchable: true,
            },
            slider: RangeSlider {
                id: ControlId::PayloadSlider.wire_id(),
                min: bounds.min,
                max: bounds.max,
                step,
                marks: slider_marks(bounds, step),
                value: [bounds.min, bounds.max],
            },
            graphs: vec![
                OutputId::SuccessPieChart.wire_id(),
                OutputId::SuccessPayloadScatterChart.wire_id(),
            ],
        }
    }
}

/// Multiples of `step` that fall inside the bounds.
fn slider_marks(bounds: PayloadBounds, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let first = (bounds.min / step).ceil() as i64;
    let last = (bounds.max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropdown_starts_with_all_sites_sentinel() {
        let sites = vec!["CCAFS LC-40".to_string(), "KSC LC-39A".to_string()];
        let layout = DashboardLayout::build(&sites, PayloadBounds { min: 0.0, max: 9600.0 }, 1000.0);
        assert_eq!(layout.dropdown.options.len(), 3);
        assert_eq!(layout.dropdown.options[0].value, "ALL");
        assert_eq!(layout.dropdown.value, "ALL");
        assert_eq!(layout.dropdown.id, "site-dropdown");
    }

    #[test]
    fn slider_is_bounded_by_observed_payloads() {
        let layout = DashboardLayout::build(&[], PayloadBounds { min: 350.0, max: 9600.0 }, 1000.0);
        assert_eq!(layout.slider.value, [350.0, 9600.0]);
        assert_eq!(layout.slider.marks.first(), Some(&1000.0));
        assert_eq!(layout.slider.marks.last(), Some(&9000.0));
        assert_eq!(layout.slider.marks.len(), 9);
    }

    #[test]
    fn zero_step_produces_no_marks() {
        let layout = DashboardLayout::build(&[], PayloadBounds { min: 0.0, max: 100.0 }, 0.0);
        assert!(layout.slider.marks.is_empty());
    }
}
