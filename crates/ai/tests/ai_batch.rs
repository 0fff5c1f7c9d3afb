// AI strategy over a whole table, against a mock chat-completion endpoint.

use std::time::Duration;

use httpmock::prelude::*;
use pairmatch_ai::{AiJudge, ChatClient};
use pairmatch_core::{run_batch, BatchOptions, Cell, ColumnLayout, Table, Verdict};

const SAME_REPORT: &str = "1) Brand (Publisher) Check\nBoth by Adobe Inc.\n\n\
5) **Conclusion**\n- **Brand:** Same\n- **Product:** Same\n\nFinal result: Same";

const DIFFERENT_PRODUCT_REPORT: &str = "1) Brand (Publisher) Check\nSame publisher.\n\n\
5) Conclusion\n- Brand: Same\n- Product: Different\n\nFinal result: Not same";

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

fn add_row(table: &mut Table, layout: &ColumnLayout, row: usize, fields: [&str; 4]) {
    table.set(row, layout.product_a, Cell::text(fields[0]));
    table.set(row, layout.product_b, Cell::text(fields[1]));
    table.set(row, layout.publisher_a, Cell::text(fields[2]));
    table.set(row, layout.publisher_b, Cell::text(fields[3]));
    table.set(row, layout.instruction, Cell::text("Compare"));
}

fn sample_table(layout: &ColumnLayout) -> Table {
    let mut table = Table::new("Batch");
    table.set(0, layout.product_a, Cell::text("Product A"));
    table.set(0, layout.status, Cell::text("Status"));
    add_row(&mut table, layout, 1, ["Photoshop", "Adobe Photoshop", "Adobe", "Adobe Inc."]);
    add_row(&mut table, layout, 2, ["Zoom", "Zoom Workplace", "Zoom", "Zoom Video"]);
    add_row(&mut table, layout, 3, ["Acrobat", "Acrobat Reader", "Adobe", "Adobe Inc."]);
    table
}

#[test]
fn ai_pass_records_verdicts_reports_and_failures() {
    let server = MockServer::start();

    let failing = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_includes("Item A: Zoom by Zoom");
        then.status(500).json_body(serde_json::json!({
            "error": { "message": "upstream overloaded" }
        }));
    });
    let different = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_includes("Item A: Acrobat by Adobe");
        then.status(200).json_body(completion(DIFFERENT_PRODUCT_REPORT));
    });
    let same = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("Authorization", "Bearer sk-test");
        then.status(200).json_body(completion(SAME_REPORT));
    });

    let layout = ColumnLayout::default();
    let mut table = sample_table(&layout);
    let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
    let mut judge = AiJudge::new(client);
    let options = BatchOptions { delay: Duration::ZERO, limit: None };

    let summary = run_batch(&mut table, &layout, &mut judge, &options);

    assert_eq!(summary.judge, "ai");
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.not_matched, 1);
    assert_eq!(summary.errors, 1);

    assert_eq!(table.text(1, layout.status).as_deref(), Some("Match"));
    assert_eq!(table.text(2, layout.status).as_deref(), Some("Error"));
    assert_eq!(table.text(3, layout.status).as_deref(), Some("Not Match"));

    let report_col = layout.report.unwrap();
    assert_eq!(table.text(1, report_col).as_deref(), Some(SAME_REPORT));
    assert_eq!(table.text(3, report_col).as_deref(), Some(DIFFERENT_PRODUCT_REPORT));
    let error_detail = table.text(2, report_col).unwrap();
    assert!(error_detail.contains("500"));
    assert!(error_detail.contains("upstream overloaded"));

    failing.assert();
    different.assert();
    same.assert();
}

#[test]
fn report_without_conclusion_fails_closed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200)
            .json_body(completion("These look like the same product to me."));
    });

    let layout = ColumnLayout::default();
    let mut table = Table::new("Batch");
    add_row(&mut table, &layout, 1, ["Slack", "Slack", "Salesforce", "Salesforce"]);

    let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
    let mut judge = AiJudge::new(client);
    let options = BatchOptions { delay: Duration::ZERO, limit: None };
    let summary = run_batch(&mut table, &layout, &mut judge, &options);

    assert_eq!(summary.not_matched, 1);
    assert_eq!(table.text(1, layout.status).as_deref(), Some(Verdict::NotMatch.as_str()));
}

#[test]
fn absent_fields_sent_as_unknown() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_includes("Item B: Unknown by Unknown");
        then.status(200).json_body(completion(DIFFERENT_PRODUCT_REPORT));
    });

    let layout = ColumnLayout::default();
    let mut table = Table::new("Batch");
    table.set(1, layout.product_a, Cell::text("Notepad++"));
    table.set(1, layout.publisher_a, Cell::text("Don Ho"));
    table.set(1, layout.instruction, Cell::text("Compare"));

    let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
    let mut judge = AiJudge::new(client);
    let options = BatchOptions { delay: Duration::ZERO, limit: None };
    run_batch(&mut table, &layout, &mut judge, &options);

    mock.assert();
    assert_eq!(table.text(1, layout.status).as_deref(), Some("Not Match"));
}
