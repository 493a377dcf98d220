use chrono::NaiveDate;
use worktodo::client::TableClient;
use worktodo::commands::{cmd_add, stats_line, task_table};
use worktodo::config::Config;
use worktodo::models::{AdminBlock, Priority, Status, Task};
use worktodo::state::Draft;
use worktodo::stats::Stats;

// Nothing listens on port 1, so any request made would fail.
fn unreachable_client() -> TableClient {
    TableClient::new(&Config {
        base_url: "http://127.0.0.1:1".into(),
        api_token: "t".into(),
        ..Config::default()
    })
    .unwrap()
}

fn sample_task() -> Task {
    Task {
        id: 12,
        task_name: "Quarterly report".into(),
        status: Status::Todo,
        priority: Priority::High,
        category: "Reports".into(),
        admin_block: AdminBlock::Morning,
        due_date: NaiveDate::from_ymd_opt(2025, 12, 1).and_then(|d| d.and_hms_opt(17, 0, 0)),
        notes: Some("pull numbers from finance".into()),
    }
}

#[test]
fn test_task_table_shows_row_fields() {
    let task = sample_task();
    let mut table = task_table(&[&task]);
    table.set_width(200);
    let rendered = table.to_string();

    assert!(rendered.contains("12"));
    assert!(rendered.contains("Quarterly report"));
    assert!(rendered.contains("pull numbers from finance"));
    assert!(rendered.contains("Reports"));
    assert!(rendered.contains("high"));
    assert!(rendered.contains("9-11am"));
    assert!(rendered.contains("2025-12-01"));
    assert!(rendered.contains("Todo"));
}

#[test]
fn test_stats_line_with_tasks() {
    let stats = Stats {
        total: 4,
        completed: 1,
        morning: 3,
        afternoon: 1,
    };
    assert_eq!(
        stats_line(&stats),
        "4 tasks, 1 completed (25%) | morning 3 | afternoon 1"
    );
}

#[test]
fn test_stats_line_without_tasks_omits_percent() {
    assert_eq!(
        stats_line(&Stats::default()),
        "0 tasks, 0 completed | morning 0 | afternoon 0"
    );
}

#[tokio::test]
async fn test_add_with_blank_name_makes_no_call() {
    let draft = Draft {
        name: "   ".into(),
        ..Draft::default()
    };
    assert!(cmd_add(&unreachable_client(), draft).await.is_ok());
}

#[tokio::test]
async fn test_add_reports_unreachable_service() {
    let draft = Draft {
        name: "Quarterly report".into(),
        ..Draft::default()
    };
    let err = cmd_add(&unreachable_client(), draft).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Connection to the table service failed while adding task"));
}
