//! Show command - filtered, sorted record tables of a scan report.

use crate::cli::output::render_record_table;
use anyhow::{bail, Context};
use clap::ValueEnum;
use scanlens_filter::{parse_filter, FilterNode, MatchContext};
use scanlens_report::{decode_scan_report, ResultRecord, ScanReport, StateGraph, TestCase};
use serde_json::json;
use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the show command.
#[derive(Debug)]
pub struct ShowArgs {
    pub report: PathBuf,
    pub filter: Option<String>,
    pub case: Option<String>,
    pub sort: SortColumn,
    pub order: SortOrder,
    pub json: bool,
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Uid,
    State,
    Request,
    Response,
    Time,
    ReqTs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

fn compare_records(a: &ResultRecord, b: &ResultRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Uid => a.uid.cmp(&b.uid),
        SortColumn::State => a.readable_state.cmp(&b.readable_state),
        SortColumn::Request => a.req.cmp(&b.req),
        SortColumn::Response => a.resp.cmp(&b.resp),
        SortColumn::Time => a
            .round_trip_time
            .partial_cmp(&b.round_trip_time)
            .unwrap_or(Ordering::Equal),
        SortColumn::ReqTs => a.req_ts.partial_cmp(&b.req_ts).unwrap_or(Ordering::Equal),
    }
}

/// Filter and sort one test case's records for display.
///
/// A record whose context cannot be assembled (dangling packet/state ids)
/// is dropped rather than evaluated against a half-built context.
pub fn filtered_records<'a>(
    test_case: &'a TestCase,
    state_graph: &'a StateGraph,
    filter: Option<&FilterNode>,
    sort: SortColumn,
    order: SortOrder,
) -> Vec<&'a ResultRecord> {
    let mut records: Vec<&ResultRecord> = test_case
        .results
        .iter()
        .filter(|record| match MatchContext::for_record(test_case, state_graph, record) {
            Some(ctx) => filter.map(|node| node.matches(&ctx)).unwrap_or(true),
            None => false,
        })
        .collect();

    records.sort_by(|a, b| {
        let ordering = compare_records(a, b, sort);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    records
}

fn select_cases<'a>(report: &'a ScanReport, case: Option<&str>) -> anyhow::Result<Vec<&'a TestCase>> {
    match case {
        None => Ok(report.test_cases.iter().collect()),
        Some(name) => {
            let selected: Vec<&TestCase> = report
                .test_cases
                .iter()
                .filter(|tc| tc.name == name)
                .collect();
            if selected.is_empty() {
                bail!("no test case named '{}' in this report", name);
            }
            Ok(selected)
        }
    }
}

/// Execute the show command.
pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read report file: {}", args.report.display()))?;
    let report = decode_scan_report(&raw).context("Failed to decode scan report")?;

    // An invalid filter is an error up front; a broken filter is never
    // applied to the table.
    let filter = match &args.filter {
        Some(text) => {
            let node = parse_filter(text)
                .with_context(|| format!("Invalid filter '{}'", text))?;
            debug!(filter = %node, "applying filter");
            Some(node)
        }
        None => None,
    };

    let cases = select_cases(&report, args.case.as_deref())?;

    if args.json {
        let body: Vec<serde_json::Value> = cases
            .iter()
            .map(|tc| {
                let records = filtered_records(
                    tc,
                    &report.state_graph,
                    filter.as_ref(),
                    args.sort,
                    args.order,
                );
                json!({ "test_case": tc.name, "results": records })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    for tc in cases {
        let records = filtered_records(
            tc,
            &report.state_graph,
            filter.as_ref(),
            args.sort,
            args.order,
        );
        println!("{} ({} of {} records)", tc.name, records.len(), tc.results.len());
        println!("{}", render_record_table(tc, &records));
        println!();
    }

    Ok(())
}
