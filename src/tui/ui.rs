use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, FormField, InputMode};
use crate::models::{AdminBlock, Priority, Task};
use crate::state::LoadPhase;

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn block_color(block: AdminBlock) -> Color {
    match block {
        AdminBlock::Morning => Color::LightRed,
        AdminBlock::Afternoon => Color::Blue,
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    if app.state.phase() == LoadPhase::Loading {
        let loading = Paragraph::new("Loading tasks from Baserow...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Work Todo List"));
        f.render_widget(loading, centered_rect(60, 3, f.area()));
        return;
    }

    let stats = app.state.stats();
    let error_height = app
        .state
        .error()
        .map_or(0, |err| banner_height(err, f.area().width));
    let progress_height = if stats.total > 0 { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // Title + sync indicator
            Constraint::Length(error_height),    // Error banner
            Constraint::Length(4),               // Stats
            Constraint::Length(1),               // Filters
            Constraint::Min(0),                  // Table
            Constraint::Length(progress_height), // Progress
            Constraint::Length(3),               // Help
        ])
        .split(f.area());

    render_title(f, app, chunks[0]);

    if let Some(err) = app.state.error() {
        let banner = Paragraph::new(err)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
        f.render_widget(banner, chunks[1]);
    }

    let stat_cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[2]);
    let boxes = [
        ("Total Tasks", stats.total, Color::White),
        ("Completed", stats.completed, Color::Green),
        (AdminBlock::Morning.label(), stats.morning, block_color(AdminBlock::Morning)),
        (AdminBlock::Afternoon.label(), stats.afternoon, block_color(AdminBlock::Afternoon)),
    ];
    for (area, (title, count, color)) in stat_cells.iter().zip(boxes) {
        let p = Paragraph::new(count.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, *area);
    }

    let filters = Line::from(vec![
        Span::styled(" Status: ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.state.status_filter.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Block: ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.state.block_filter.to_string(),
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(filters), chunks[3]);

    render_tasks(f, app, chunks[4]);

    if let Some(percent) = stats.completion_percent() {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Daily Progress"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(stats.completion_ratio())
            .label(format!("{}%", percent));
        f.render_widget(gauge, chunks[5]);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Space: Toggle Done | d: Del | r: Sync | f: Status Filter | b: Block Filter | Esc: Dismiss Error",
        InputMode::Adding => "Tab: Next Field | Left/Right: Change | Enter: Add | Esc: Close",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[6]);

    if app.input_mode == InputMode::Adding {
        render_form(f, app);
    }
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " Work Todo List",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.state.is_busy() {
        spans.push(Span::styled(
            "   ⟳ Syncing with Baserow...",
            Style::default().fg(Color::Black).bg(Color::Blue),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn task_row(t: &Task) -> Row<'static> {
    let mut style = Style::default().fg(priority_color(t.priority));
    if t.is_completed() {
        style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    Row::new(vec![
        Cell::from(if t.is_completed() { "[x]" } else { "[ ]" }),
        Cell::from(t.task_name.clone()),
        Cell::from(t.category.clone()),
        Cell::from(t.priority.to_string()),
        Cell::from(t.admin_block.hours()).style(Style::default().fg(block_color(t.admin_block))),
        Cell::from(t.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()),
        Cell::from(t.notes.clone().unwrap_or_default()),
    ])
    .style(style)
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Tasks");
    let visible = app.state.visible_tasks();
    if visible.is_empty() {
        let empty = Paragraph::new(app.state.status_filter.empty_message())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = visible.into_iter().map(task_row).collect();
    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Percentage(25),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Task", "Category", "Priority", "Block", "Due", "Notes"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_form(f: &mut Frame, app: &App) {
    let area = centered_rect(60, FormField::ALL.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);

    let draft = &app.state.draft;
    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::Name => draft.name.clone(),
                FormField::Priority => format!("< {} >", draft.priority),
                FormField::Category => draft.category.clone(),
                FormField::Block => format!("< {} >", draft.admin_block.label()),
                FormField::Due => draft.due_date.clone(),
                FormField::Notes => draft.notes.clone(),
            };
            let focused = *field == app.form_field;
            let style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:>12}: ", field.label()), style),
                Span::styled(value, style),
            ])
        })
        .collect();

    let title = if app.state.is_busy() { "Add Task (syncing...)" } else { "Add Task" };
    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(form, area);
}

/// Rows needed by the bordered error banner so the whole message stays
/// visible at `width` columns.
fn banner_height(message: &str, width: u16) -> u16 {
    const MAX_HEIGHT: u16 = 8;
    let inner = usize::from(width.saturating_sub(2).max(1));
    let mut lines = 1;
    let mut used = 0;
    for word in message.split_whitespace() {
        let len = word.chars().count();
        let needed = if used == 0 { len } else { used + 1 + len };
        if needed <= inner {
            used = needed;
            continue;
        }
        if used > 0 {
            lines += 1;
        }
        // Words wider than the banner are broken across rows.
        lines += (len.max(1) - 1) / inner;
        used = (len - 1) % inner + 1;
    }
    (lines as u16).saturating_add(2).min(MAX_HEIGHT)
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::Status;
    use crate::state::Outcome;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn renders_stats_and_progress() {
        let mut app = App::new();
        app.state.begin_reload();
        app.state.complete(Outcome::Listed(Ok(vec![
            Task {
                id: 1,
                task_name: "Inbox zero".into(),
                status: Status::Completed,
                priority: Priority::Low,
                category: "Admin".into(),
                admin_block: AdminBlock::Morning,
                due_date: None,
                notes: None,
            },
            Task {
                id: 2,
                task_name: "Budget review".into(),
                status: Status::Todo,
                priority: Priority::High,
                category: "Finance".into(),
                admin_block: AdminBlock::Afternoon,
                due_date: None,
                notes: Some("Q3 numbers".into()),
            },
        ])));
        app.clamp_selection();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Budget review"));
        assert!(text.contains("Daily Progress"));
        assert!(text.contains("50%"));
    }

    #[test]
    fn banner_grows_with_wrapped_message() {
        assert_eq!(banner_height("Error loading tasks: 500", 80), 3);
        assert_eq!(banner_height("aaaa bbbb cccc", 11), 4);
        assert_eq!(banner_height(&"x".repeat(20), 12), 4);
        assert_eq!(banner_height(&"word ".repeat(200), 40), 8);
    }

    #[test]
    fn long_error_is_shown_in_full() {
        let mut app = App::new();
        app.state.begin_reload();
        app.state.complete(Outcome::Listed(Ok(vec![])));
        app.state.begin_reload();
        app.state.complete(Outcome::Listed(Err(ApiError::Status {
            status: 400,
            message: "the filter field does not exist in this table and the request was rejected by the upstream gateway".into(),
        })));

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Error loading tasks"));
        assert!(text.contains("rejected by the"));
        assert!(text.contains("upstream gateway"));
    }

    #[test]
    fn renders_loading_screen_before_first_fetch() {
        let mut app = App::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("Loading tasks"));
    }
}
