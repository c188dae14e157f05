//! Test suite validating the chart handlers against the launch table.
//!
//! # Test Categories
//!
//! - **Invariants**: counting and subset properties that must hold for every
//!   site and payload window
//! - **Edge cases**: empty filters, unknown sites, degenerate windows
//! - **End to end**: CSV text through dispatch to serialised output

#[cfg(test)]
mod fixtures {
    use crate::loader::parse_csv;
    use crate::model::LaunchTable;

    /// A slice of the lab dataset, including a site with no successes.
    pub const LAUNCHES_CSV: &str = "\
,Flight Number,Launch Site,class,Payload Mass (kg),Booster Version,Booster Version Category
0,1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0
1,2,CCAFS LC-40,0,0.0,F9 v1.0  B0004,v1.0
2,3,CCAFS LC-40,0,525.0,F9 v1.0  B0005,v1.0
3,4,CCAFS LC-40,0,500.0,F9 v1.0  B0006,v1.0
4,5,CCAFS LC-40,0,677.0,F9 v1.0  B0007,v1.0
5,7,CCAFS LC-40,1,3170.0,F9 v1.1,v1.1
6,8,VAFB SLC-4E,0,500.0,F9 v1.1  B1003,v1.1
7,20,VAFB SLC-4E,1,9600.0,F9 FT B1029.1,FT
8,21,KSC LC-39A,1,2490.0,F9 FT B1031.1,FT
9,22,KSC LC-39A,0,5600.0,F9 FT B1030,FT
10,23,KSC LC-39A,1,5300.0,F9 B4 B1040.1,B4
11,30,CCAFS SLC-40,1,3669.0,F9 B4 B1041.1,B4
12,31,CCAFS SLC-40,1,6460.0,F9 B5 B1046.1,B5
13,32,CCAFS SLC-40,0,4230.0,F9 B4  B1045.2,B4
14,33,CCAFS SLC-40,1,7076.0,F9 B5 B1047.1,B5
";

    pub fn table() -> LaunchTable {
        parse_csv(LAUNCHES_CSV.as_bytes()).expect("fixture CSV parses")
    }
}

#[cfg(test)]
mod invariants {
    use super::fixtures::table;
    use crate::charts::{payload_scatter, site_summary, ChartSpec};
    use crate::model::{PayloadRange, SiteSelection};

    /// Test: a single site's Success + Failure equals its row count.
    #[test]
    fn site_pie_counts_sum_to_site_rows() {
        let table = table();
        for site in table.sites() {
            let selection = SiteSelection::Site(site.clone());
            let ChartSpec::Pie(pie) = site_summary(&table, &selection) else {
                panic!("site summary must be a pie");
            };
            let rows = table.by_site(&selection).count() as u64;
            assert_eq!(pie.total(), rows, "site={}", site);
            assert_eq!(pie.slices.len(), 2, "site={}", site);
        }
    }

    /// Test: the all-sites pie has one slice per distinct site, sized by successes.
    #[test]
    fn all_sites_pie_has_one_slice_per_site() {
        let table = table();
        let ChartSpec::Pie(pie) = site_summary(&table, &SiteSelection::All) else {
            panic!("site summary must be a pie");
        };
        let labels: Vec<String> = pie.slices.iter().map(|s| s.label.clone()).collect();
        assert_eq!(labels, table.sites());

        let successes = table
            .records()
            .iter()
            .filter(|r| r.outcome.is_success())
            .count() as u64;
        assert_eq!(pie.total(), successes);
    }

    /// Test: scatter points are exactly the rows inside the window (and site).
    #[test]
    fn scatter_is_exact_filtered_subset() {
        let table = table();
        let windows = [(0.0, 10_000.0), (500.0, 3170.0), (2490.0, 2490.0), (6000.0, 9600.0)];
        let mut selections = vec![SiteSelection::All];
        selections.extend(table.sites().into_iter().map(SiteSelection::Site));

        for selection in &selections {
            for &(low, high) in &windows {
                let range = PayloadRange::new(low, high).unwrap();
                let ChartSpec::Scatter(scatter) = payload_scatter(&table, selection, range) else {
                    panic!("payload chart must be a scatter");
                };

                let mut expected: Vec<(f64, u8, String)> = table
                    .records()
                    .iter()
                    .filter(|r| r.payload_mass_kg >= low && r.payload_mass_kg <= high)
                    .filter(|r| selection.matches(&r.launch_site))
                    .map(|r| (r.payload_mass_kg, r.outcome.class(), r.launch_site.clone()))
                    .collect();
                let mut actual: Vec<(f64, u8, String)> = scatter
                    .points()
                    .map(|p| (p.x, p.y, p.site.clone()))
                    .collect();
                expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
                actual.sort_by(|a, b| a.partial_cmp(b).unwrap());

                assert_eq!(
                    actual, expected,
                    "selection={:?}, range=[{}, {}]",
                    selection, low, high
                );
            }
        }
    }

    /// Test: narrowing the window never adds points.
    #[test]
    fn scatter_shrinks_monotonically() {
        let table = table();
        for selection in [SiteSelection::All, SiteSelection::Site("KSC LC-39A".into())] {
            let mut prev = usize::MAX;
            let mut low = 0.0;
            let mut high = 10_000.0;
            while low <= high {
                let range = PayloadRange::new(low, high).unwrap();
                let ChartSpec::Scatter(scatter) = payload_scatter(&table, &selection, range) else {
                    panic!("payload chart must be a scatter");
                };
                assert!(
                    scatter.point_count() <= prev,
                    "selection={:?}, [{}, {}]: {} > {}",
                    selection, low, high, scatter.point_count(), prev
                );
                prev = scatter.point_count();
                low += 500.0;
                high -= 500.0;
            }
        }
    }

    /// Test: every scatter y value is a class, 0 or 1.
    #[test]
    fn scatter_y_is_binary() {
        let table = table();
        let range = PayloadRange::new(0.0, 10_000.0).unwrap();
        let ChartSpec::Scatter(scatter) = payload_scatter(&table, &SiteSelection::All, range) else {
            panic!("payload chart must be a scatter");
        };
        assert!(scatter.points().all(|p| p.y <= 1));
        assert_eq!(scatter.point_count(), table.len());
    }
}

#[cfg(test)]
mod edge_cases {
    use super::fixtures::table;
    use crate::charts::{payload_scatter, site_summary, ChartSpec};
    use crate::model::{LaunchRecord, LaunchTable, Outcome, PayloadRange, SiteSelection};

    fn example_table() -> LaunchTable {
        let rows = [("siteA", 2000.0, 1), ("siteA", 3000.0, 0), ("siteB", 5000.0, 1)];
        LaunchTable::new(
            rows.iter()
                .map(|&(site, payload, class)| LaunchRecord {
                    launch_site: site.to_string(),
                    payload_mass_kg: payload,
                    outcome: Outcome::from_class(class).unwrap(),
                    booster_version_category: "FT".to_string(),
                })
                .collect(),
        )
    }

    /// Test: worked example, one success and one failure at siteA.
    #[test]
    fn worked_example_single_site() {
        let ChartSpec::Pie(pie) = site_summary(&example_table(), &SiteSelection::Site("siteA".into()))
        else {
            panic!("expected pie");
        };
        assert_eq!(pie.slice("Success").map(|s| s.value), Some(1));
        assert_eq!(pie.slice("Failure").map(|s| s.value), Some(1));
    }

    /// Test: worked example, all sites.
    #[test]
    fn worked_example_all_sites() {
        let ChartSpec::Pie(pie) = site_summary(&example_table(), &SiteSelection::All) else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices.len(), 2);
        assert_eq!(pie.slice("siteA").map(|s| s.value), Some(1));
        assert_eq!(pie.slice("siteB").map(|s| s.value), Some(1));
    }

    /// Test: a site with no successes still yields two slices.
    #[test]
    fn zero_count_slice_is_kept() {
        let table = LaunchTable::new(
            table()
                .records()
                .iter()
                .filter(|r| !r.outcome.is_success())
                .cloned()
                .collect(),
        );
        let ChartSpec::Pie(pie) = site_summary(&table, &SiteSelection::Site("CCAFS LC-40".into()))
        else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices.len(), 2);
        assert_eq!(pie.slice("Success").map(|s| s.value), Some(0));
        assert_eq!(pie.slice("Failure").map(|s| s.value), Some(5));
    }

    /// Test: an unknown site gives a well-formed empty pie.
    #[test]
    fn unknown_site_gives_empty_pie() {
        let ChartSpec::Pie(pie) = site_summary(&table(), &SiteSelection::Site("Boca Chica".into()))
        else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices.len(), 2);
        assert_eq!(pie.total(), 0);
    }

    /// Test: a window with no payloads gives an empty scatter.
    #[test]
    fn empty_window_gives_empty_scatter() {
        let range = PayloadRange::new(7100.0, 9500.0).unwrap();
        let chart = payload_scatter(&table(), &SiteSelection::All, range);
        let ChartSpec::Scatter(scatter) = &chart else {
            panic!("expected scatter");
        };
        assert!(scatter.series.is_empty());
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "scatter");
        assert_eq!(json["series"].as_array().map(|s| s.len()), Some(0));
    }

    /// Test: the empty table still produces valid charts.
    #[test]
    fn empty_table_is_not_an_error() {
        let table = LaunchTable::default();
        let ChartSpec::Pie(pie) = site_summary(&table, &SiteSelection::All) else {
            panic!("expected pie");
        };
        assert!(pie.slices.is_empty());
        let range = PayloadRange::new(0.0, 0.0).unwrap();
        let ChartSpec::Scatter(scatter) = payload_scatter(&table, &SiteSelection::All, range) else {
            panic!("expected scatter");
        };
        assert_eq!(scatter.point_count(), 0);
    }
}

#[cfg(test)]
mod end_to_end {
    use super::fixtures::table;
    use crate::dispatch::{ControlEvent, ControlId, ControlState, DashboardContext, OutputId, Registry};
    use crate::model::{PayloadRange, SiteSelection};

    /// Test: the dropdown derives its options from the data, including
    /// CCAFS SLC-40, which a hard-coded option list can miss.
    #[test]
    fn derived_options_cover_every_site() {
        let ctx = DashboardContext::new(table(), None);
        assert_eq!(
            ctx.site_options(),
            ["CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A", "CCAFS SLC-40"].map(String::from)
        );
    }

    /// Test: a dropdown event serialises to both render instructions.
    #[test]
    fn dropdown_event_serialises_both_figures() {
        let ctx = DashboardContext::new(table(), None);
        let event = ControlEvent {
            trigger: Some(ControlId::SiteDropdown),
            state: ControlState {
                site: SiteSelection::Site("KSC LC-39A".into()),
                payload: PayloadRange::new(0.0, 10_000.0).unwrap(),
            },
        };
        let outputs = Registry::standard().dispatch(&ctx, &event);
        assert_eq!(outputs[0].output, OutputId::SuccessPieChart);

        let json = serde_json::to_value(&outputs).unwrap();
        assert_eq!(json[0]["output"], "success-pie-chart");
        assert_eq!(json[0]["figure"]["slices"][0]["value"], 2);
        assert_eq!(json[0]["figure"]["slices"][1]["value"], 1);
        assert_eq!(json[1]["output"], "success-payload-scatter-chart");
        assert_eq!(
            json[1]["figure"]["title"],
            "Payload vs. Launch Outcome for KSC LC-39A (Payload: 0-10000 kg)"
        );
    }
}
