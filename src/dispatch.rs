//! Control-change dispatch.
//!
//! A [`Registry`] maps trigger controls to pure chart handlers. The server
//! turns each browser request into a [`ControlEvent`], and dispatch returns
//! one [`RenderInstruction`] per output whose triggers include the changed
//! control. Handlers receive the immutable [`DashboardContext`] explicitly.

use serde::Serialize;
use tracing::{debug, warn};

use crate::charts::{self, ChartSpec};
use crate::model::{LaunchTable, PayloadBounds, PayloadRange, SiteSelection};

/// Input controls on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    SiteDropdown,
    PayloadSlider,
}

impl ControlId {
    pub const ALL: [ControlId; 2] = [Self::SiteDropdown, Self::PayloadSlider];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_id() == s)
    }

    pub fn wire_id(&self) -> &'static str {
        match self {
            Self::SiteDropdown => "site-dropdown",
            Self::PayloadSlider => "payload-slider",
        }
    }
}

/// Chart placeholders on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputId {
    #[serde(rename = "success-pie-chart")]
    SuccessPieChart,
    #[serde(rename = "success-payload-scatter-chart")]
    SuccessPayloadScatterChart,
}

impl OutputId {
    pub fn wire_id(&self) -> &'static str {
        match self {
            Self::SuccessPieChart => "success-pie-chart",
            Self::SuccessPayloadScatterChart => "success-payload-scatter-chart",
        }
    }
}

/// Snapshot of every control value at the time of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub site: SiteSelection,
    pub payload: PayloadRange,
}

/// A control change, or the initial render when `trigger` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    pub trigger: Option<ControlId>,
    pub state: ControlState,
}

/// New figure for one output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    pub output: OutputId,
    pub figure: ChartSpec,
}

// ============================================================================
// Context
// ============================================================================

/// Read-only state shared by every handler invocation.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    table: LaunchTable,
    bounds: PayloadBounds,
    site_options: Vec<String>,
}

impl DashboardContext {
    /// Build the context. `site_options` overrides the dropdown entries;
    /// when `None` they are the distinct sites of the table.
    pub fn new(table: LaunchTable, site_options: Option<Vec<String>>) -> Self {
        let bounds = table.payload_bounds().unwrap_or(PayloadBounds { min: 0.0, max: 0.0 });
        let derived = table.sites();
        let site_options = match site_options {
            Some(configured) => {
                for site in configured.iter().filter(|s| !derived.contains(s)) {
                    warn!(site = %site, "configured launch site does not appear in the dataset");
                }
                configured
            }
            None => derived,
        };
        Self {
            table,
            bounds,
            site_options,
        }
    }

    pub fn table(&self) -> &LaunchTable {
        &self.table
    }

    pub fn bounds(&self) -> PayloadBounds {
        self.bounds
    }

    pub fn site_options(&self) -> &[String] {
        &self.site_options
    }

    /// Control values the page starts with.
    pub fn initial_state(&self) -> ControlState {
        ControlState {
            site: SiteSelection::All,
            payload: self.bounds.full_range(),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

pub type Handler = fn(&DashboardContext, &ControlState) -> ChartSpec;

struct Binding {
    output: OutputId,
    triggers: Vec<ControlId>,
    handler: Handler,
}

/// Trigger-to-handler bindings.
#[derive(Default)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pie chart follows the dropdown; scatter follows dropdown and slider.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                OutputId::SuccessPieChart,
                &[ControlId::SiteDropdown],
                pie_handler,
            )
            .register(
                OutputId::SuccessPayloadScatterChart,
                &[ControlId::SiteDropdown, ControlId::PayloadSlider],
                scatter_handler,
            );
        registry
    }

    pub fn register(
        &mut self,
        output: OutputId,
        triggers: &[ControlId],
        handler: Handler,
    ) -> &mut Self {
        self.bindings.push(Binding {
            output,
            triggers: triggers.to_vec(),
            handler,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Run every binding watching the event's trigger (all of them for the
    /// initial render). Handlers see the requested window unchanged, so a
    /// window outside the observed payloads renders an empty scatter.
    pub fn dispatch(&self, ctx: &DashboardContext, event: &ControlEvent) -> Vec<RenderInstruction> {
        let state = &event.state;
        let instructions: Vec<RenderInstruction> = self
            .bindings
            .iter()
            .filter(|b| match event.trigger {
                Some(trigger) => b.triggers.contains(&trigger),
                None => true,
            })
            .map(|b| RenderInstruction {
                output: b.output,
                figure: (b.handler)(ctx, state),
            })
            .collect();
        debug!(
            trigger = event.trigger.map(|t| t.wire_id()).unwrap_or("initial"),
            site = state.site.wire_value(),
            low = state.payload.low(),
            high = state.payload.high(),
            outputs = instructions.len(),
            "dispatched control event"
        );
        for r in &instructions {
            debug!(
                output = r.output.wire_id(),
                title = r.figure.title(),
                data = r.figure.data_len(),
                "rendered figure"
            );
        }
        instructions
    }
}

fn pie_handler(ctx: &DashboardContext, state: &ControlState) -> ChartSpec {
    charts::site_summary(ctx.table(), &state.site)
}

fn scatter_handler(ctx: &DashboardContext, state: &ControlState) -> ChartSpec {
    charts::payload_scatter(ctx.table(), &state.site, state.payload)
}
