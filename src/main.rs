//! SpaceX Launch Records Dashboard
//!
//! Downloads the launch dataset once (falling back to a local copy), then
//! serves an interactive page with a success pie chart and a
//! payload-vs-outcome scatter plot driven by a site dropdown and a payload
//! range slider.

mod charts;
mod cli;
mod dispatch;
mod layout;
mod loader;
mod logging;
mod model;
mod server;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use cli::Cli;
use dispatch::{DashboardContext, Registry};
use layout::DashboardLayout;
use server::Dashboard;

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("{e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    let loaded = loader::load(&args.data_source()).context("failed to load launch data")?;
    if loaded.table.is_empty() {
        warn!(origin = %loaded.origin.describe(), "launch dataset has no rows");
    }

    let ctx = DashboardContext::new(loaded.table, args.site_options());
    let bounds = ctx.bounds();
    info!(
        rows = ctx.table().len(),
        sites = ctx.site_options().len(),
        min_payload = bounds.min,
        max_payload = bounds.max,
        "dashboard ready"
    );

    let layout = DashboardLayout::build(ctx.site_options(), bounds, args.slider_step());
    let registry = Registry::standard();
    info!(handlers = registry.len(), "registered chart handlers");
    let dashboard = Dashboard {
        ctx,
        registry,
        layout,
    };

    server::run_server(&dashboard, &args.host, args.port)?;
    Ok(())
}
