//! Suggest command - completion candidates for a partially typed filter.

use anyhow::{bail, Context};
use scanlens_filter::{build_option_tree, suggest};
use scanlens_report::{decode_scan_report, TestCase};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct SuggestArgs {
    pub report: PathBuf,
    pub case: Option<String>,
    pub text: String,
    pub cursor: Option<usize>,
}

/// Execute the suggest command.
pub fn run(args: SuggestArgs) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read report file: {}", args.report.display()))?;
    let report = decode_scan_report(&raw).context("Failed to decode scan report")?;

    let test_case: &TestCase = match &args.case {
        Some(name) => report
            .test_cases
            .iter()
            .find(|tc| tc.name == *name)
            .with_context(|| format!("no test case named '{}' in this report", name))?,
        None => match report.test_cases.first() {
            Some(tc) => tc,
            None => bail!("report contains no test cases"),
        },
    };

    let options = build_option_tree(test_case, &report.state_graph);
    let cursor = args.cursor.unwrap_or_else(|| args.text.chars().count());
    debug!(case = %test_case.name, cursor, "suggesting completions");

    for candidate in suggest(&args.text, cursor, &options) {
        println!("{candidate}");
    }
    Ok(())
}
