//! Output formatting for the record table.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use scanlens_report::{ResultRecord, TestCase};

/// Round-trip time in milliseconds, two decimals, the way the review table
/// shows it.
pub fn format_round_trip_ms(round_trip_time: f64) -> String {
    format!("{:.2}", round_trip_time * 1000.0)
}

/// Render the filtered record rows of one test case.
pub fn render_record_table(test_case: &TestCase, records: &[&ResultRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["UID", "State", "Request", "Response", "Time (ms)"]);

    for record in records {
        let request_desc = test_case
            .packet_descriptions
            .get(&record.req)
            .map(|p| p.desc.as_str())
            .unwrap_or("-");
        let response_desc = record
            .resp
            .as_ref()
            .and_then(|resp| test_case.packet_descriptions.get(resp))
            .map(|p| p.desc.as_str())
            .unwrap_or("-");

        table.add_row(vec![
            Cell::new(record.uid),
            Cell::new(&record.readable_state),
            Cell::new(request_desc),
            Cell::new(response_desc),
            Cell::new(format_round_trip_ms(record.round_trip_time))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}
