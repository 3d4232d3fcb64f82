//! Check command - validate a filter expression without a report.

use anyhow::Context;
use scanlens_filter::parse_filter;

#[derive(Debug)]
pub struct CheckArgs {
    pub filter: String,
}

/// Parse the filter and print its canonical form.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let node = parse_filter(&args.filter)
        .with_context(|| format!("Invalid filter '{}'", args.filter))?;
    println!("{}", node.describe());
    Ok(())
}
