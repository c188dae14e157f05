//! Chart handlers.
//!
//! Each handler is a pure function of the launch table and a snapshot of the
//! control values, returning a declarative [`ChartSpec`] that the page hands
//! to its plotting library. An empty filter result is not an error; it yields
//! a well-formed chart with no data.

use serde::Serialize;

use crate::model::{LaunchTable, Outcome, PayloadRange, SiteSelection};

pub const SUCCESS_COLOR: &str = "green";
pub const FAILURE_COLOR: &str = "red";

const PAYLOAD_AXIS: &str = "Payload Mass (kg)";
const CLASS_AXIS: &str = "class";

/// Declarative chart description consumed by the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSpec {
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            Self::Pie(p) => &p.title,
            Self::Scatter(s) => &s.title,
        }
    }

    /// Slices of a pie or points of a scatter.
    pub fn data_len(&self) -> usize {
        match self {
            Self::Pie(p) => p.slices.len(),
            Self::Scatter(s) => s.point_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[cfg(test)]
impl PieChart {
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    pub fn slice(&self, label: &str) -> Option<&PieSlice> {
        self.slices.iter().find(|s| s.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// One series per booster version category.
    pub series: Vec<ScatterSeries>,
}

impl ScatterChart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    #[cfg(test)]
    pub fn points(&self) -> impl Iterator<Item = &ScatterPoint> {
        self.series.iter().flat_map(|s| s.points.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Payload mass in kg.
    pub x: f64,
    /// Outcome class, 0 or 1.
    pub y: u8,
    pub site: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Pie chart for the site dropdown.
///
/// - every site: one slice per distinct site, sized by its successful launches
/// - one site: exactly two slices, `Success` then `Failure`, zero counts kept
pub fn site_summary(table: &LaunchTable, selection: &SiteSelection) -> ChartSpec {
    match selection {
        SiteSelection::All => {
            let slices = table
                .sites()
                .into_iter()
                .map(|site| {
                    let successes = table
                        .records()
                        .iter()
                        .filter(|r| r.launch_site == site && r.outcome.is_success())
                        .count() as u64;
                    PieSlice {
                        label: site,
                        value: successes,
                        color: None,
                    }
                })
                .collect();
            ChartSpec::Pie(PieChart {
                title: "Total Success Launches by Site".to_string(),
                slices,
            })
        }
        SiteSelection::Site(site) => {
            let (success, failure) =
                table
                    .by_site(selection)
                    .fold((0u64, 0u64), |(s, f), r| match r.outcome {
                        Outcome::Success => (s + 1, f),
                        Outcome::Failure => (s, f + 1),
                    });
            ChartSpec::Pie(PieChart {
                title: format!("Total Success vs. Failure for Site {site}"),
                slices: vec![
                    PieSlice {
                        label: Outcome::Success.label().to_string(),
                        value: success,
                        color: Some(SUCCESS_COLOR),
                    },
                    PieSlice {
                        label: Outcome::Failure.label().to_string(),
                        value: failure,
                        color: Some(FAILURE_COLOR),
                    },
                ],
            })
        }
    }
}

/// Scatter of payload mass against outcome class, coloured by booster
/// category, over rows inside `range` (and the selected site, if any).
pub fn payload_scatter(
    table: &LaunchTable,
    selection: &SiteSelection,
    range: PayloadRange,
) -> ChartSpec {
    let mut series: Vec<ScatterSeries> = Vec::new();
    for record in table.filter(selection, range) {
        let point = ScatterPoint {
            x: record.payload_mass_kg,
            y: record.outcome.class(),
            site: record.launch_site.clone(),
        };
        match series
            .iter_mut()
            .find(|s| s.name == record.booster_version_category)
        {
            Some(existing) => existing.points.push(point),
            None => series.push(ScatterSeries {
                name: record.booster_version_category.clone(),
                points: vec![point],
            }),
        }
    }

    let scope = match selection {
        SiteSelection::All => "All Sites".to_string(),
        SiteSelection::Site(site) => site.clone(),
    };
    ChartSpec::Scatter(ScatterChart {
        title: format!(
            "Payload vs. Launch Outcome for {scope} (Payload: {}-{} kg)",
            range.low(),
            range.high()
        ),
        x_label: PAYLOAD_AXIS,
        y_label: CLASS_AXIS,
        series,
    })
}
