//! Command-line interface for the launch dashboard.
//!
//! Every flag defaults to the stock behaviour (download the lab dataset,
//! fall back to `spacex_launch_dash.csv`, serve on `127.0.0.1:8050`), so
//! running with no arguments is the normal case.
//!
//! ## Data
//! - `--url`: remote CSV location
//! - `--fallback`: local copy read when the download fails
//! - `--timeout-secs`: connect/read timeout for the download
//!
//! ## Server
//! - `--host`, `--port`: listen address
//!
//! ## Controls
//! - `--slider-step`: payload slider step and mark spacing (kg)
//! - `--sites`: explicit dropdown entries instead of the sites found in the data

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::layout::DEFAULT_SLIDER_STEP;
use crate::loader::{DataSource, DEFAULT_FALLBACK, DEFAULT_URL};

#[derive(Parser, Debug)]
#[command(name = "launch-dash")]
#[command(author, version, about = "Interactive SpaceX launch records dashboard")]
pub struct Cli {
    // =========================================================================
    // Data
    // =========================================================================

    /// CSV dataset to download at startup
    #[arg(long, default_value = DEFAULT_URL, help_heading = "Data")]
    pub url: String,

    /// Local CSV read when the download fails
    #[arg(long, default_value = DEFAULT_FALLBACK, help_heading = "Data")]
    pub fallback: PathBuf,

    /// Download timeout in seconds
    #[arg(long, default_value = "30", help_heading = "Data")]
    pub timeout_secs: u64,

    // =========================================================================
    // Server
    // =========================================================================

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1", help_heading = "Server")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value = "8050", help_heading = "Server")]
    pub port: u16,

    // =========================================================================
    // Controls
    // =========================================================================

    /// Payload slider step in kg
    #[arg(long, default_value_t = DEFAULT_SLIDER_STEP, help_heading = "Controls")]
    pub slider_step: f64,

    /// Launch sites offered in the dropdown (comma-separated; default: sites in the data)
    #[arg(long, help_heading = "Controls")]
    pub sites: Option<String>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    pub fn data_source(&self) -> DataSource {
        DataSource {
            url: self.url.clone(),
            fallback_path: self.fallback.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }

    /// Parse the configured site list, dropping blanks and duplicates.
    pub fn site_options(&self) -> Option<Vec<String>> {
        let raw = self.sites.as_deref()?;
        let mut sites: Vec<String> = Vec::new();
        for site in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !sites.iter().any(|s| s == site) {
                sites.push(site.to_string());
            }
        }
        Some(sites)
    }

    /// Slider step, falling back to the default for non-positive values.
    pub fn slider_step(&self) -> f64 {
        if self.slider_step.is_finite() && self.slider_step > 0.0 {
            self.slider_step
        } else {
            DEFAULT_SLIDER_STEP
        }
    }
}
