use anyhow::{anyhow, bail, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::client::TableClient;
use crate::models::{Priority, Task};
use crate::state::{AppState, Draft, Request};
use crate::stats::{BlockFilter, Stats, StatusFilter};

/// Sends `request` (if the state produced one) and folds the outcome back.
///
/// Fails with the state's error message if the call did not succeed.
async fn drive(state: &mut AppState, client: &TableClient, request: Option<Request>) -> Result<bool> {
    let Some(request) = request else {
        return Ok(false);
    };
    let outcome = client.execute(request).await;
    state.complete(outcome);
    match state.error() {
        Some(msg) => Err(anyhow!(msg.to_string())),
        None => Ok(true),
    }
}

/// Fetches the current list into a fresh state.
async fn load(client: &TableClient) -> Result<AppState> {
    let mut state = AppState::new();
    let request = state.begin_reload();
    drive(&mut state, client, request).await?;
    Ok(state)
}

/// Lists tasks passing both filters, followed by the stats line.
pub async fn cmd_list(client: &TableClient, status: StatusFilter, block: BlockFilter) -> Result<()> {
    let mut state = load(client).await?;
    state.status_filter = status;
    state.block_filter = block;

    let visible = state.visible_tasks();
    if visible.is_empty() {
        println!("{}", status.empty_message());
    } else {
        println!("{}", task_table(&visible));
    }
    println!("{}", stats_line(&state.stats()));
    Ok(())
}

/// Adds a new task built from `draft`. A blank name is a no-op.
pub async fn cmd_add(client: &TableClient, draft: Draft) -> Result<()> {
    let mut state = AppState::new();
    state.draft = draft;
    let request = state.begin_create();
    if let Some(msg) = state.error() {
        bail!(msg.to_string());
    }
    drive(&mut state, client, request).await?;
    if let Some(task) = state.tasks().first() {
        println!("Task added (id = {})", task.id);
    }
    Ok(())
}

/// Flips a task between todo and completed.
pub async fn cmd_toggle(client: &TableClient, id: u64) -> Result<()> {
    let mut state = load(client).await?;
    let request = state.begin_toggle(id);
    if request.is_none() {
        bail!("Task {} not found.", id);
    }
    drive(&mut state, client, request).await?;
    if let Some(task) = state.task(id) {
        println!("Task {} is now {}.", id, task.status);
    }
    Ok(())
}

/// Removes a task by ID.
pub async fn cmd_remove(client: &TableClient, id: u64) -> Result<()> {
    let mut state = AppState::new();
    let request = state.begin_delete(id);
    drive(&mut state, client, request).await?;
    println!("Task {} removed.", id);
    Ok(())
}

/// Prints the derived counts.
pub async fn cmd_stats(client: &TableClient) -> Result<()> {
    let state = load(client).await?;
    let stats = state.stats();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Total Tasks").add_attribute(Attribute::Bold),
            Cell::new("Completed").add_attribute(Attribute::Bold),
            Cell::new("Morning (9-11am)").add_attribute(Attribute::Bold),
            Cell::new("Afternoon (2-5pm)").add_attribute(Attribute::Bold),
            Cell::new("Progress").add_attribute(Attribute::Bold),
        ])
        .add_row(vec![
            Cell::new(stats.total),
            Cell::new(stats.completed).fg(Color::Green),
            Cell::new(stats.morning).fg(Color::DarkYellow),
            Cell::new(stats.afternoon).fg(Color::Blue),
            Cell::new(
                stats
                    .completion_percent()
                    .map(|p| format!("{}%", p))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    println!("{table}");
    Ok(())
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// Builds the task table printed by `list`.
pub fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Block").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let color = if t.is_completed() { Color::Grey } else { priority_color(t.priority) };
        let mut name = match &t.notes {
            Some(notes) => Cell::new(format!("{}\n  {}", t.task_name, notes)),
            None => Cell::new(&t.task_name),
        };
        if t.is_completed() {
            name = name.add_attribute(Attribute::CrossedOut);
        }
        table.add_row(vec![
            Cell::new(t.id),
            name,
            Cell::new(&t.category),
            Cell::new(t.priority).fg(color),
            Cell::new(t.admin_block.hours()),
            Cell::new(t.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()),
            Cell::new(if t.is_completed() { "Done" } else { "Todo" })
                .fg(if t.is_completed() { Color::Green } else { Color::Yellow }),
        ]);
    }
    table
}

/// One-line summary, e.g. `4 tasks, 1 completed (25%) | morning 2 | afternoon 2`.
pub fn stats_line(stats: &Stats) -> String {
    let mut line = format!("{} tasks, {} completed", stats.total, stats.completed);
    if let Some(p) = stats.completion_percent() {
        line.push_str(&format!(" ({}%)", p));
    }
    line.push_str(&format!(" | morning {} | afternoon {}", stats.morning, stats.afternoon));
    line
}
