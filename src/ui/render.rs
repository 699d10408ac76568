//! Drawing the board, archive view, statistics panel and overlays

use chrono::{Local, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::stats::BoardStats;
use crate::store::StoreDiagnostics;
use crate::task::{DueStatus, Priority, Status, Task};
use crate::ui::app::{App, MessageLevel, Overlay, View};
use crate::ui::form::{FormField, TaskForm};

const BOARD_HELP: &str = " ←→ column  ↑↓ task  </> move  1-3 move to  n new  e edit  a archive  A archive done  d delete  / search  s sort  v archive  i file  q quit";
const ARCHIVE_HELP: &str = " ↑↓ select  u restore  U restore all  e edit  d delete  i file  v/Esc back  q quit";

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn due_color(status: DueStatus) -> Color {
    match status {
        DueStatus::Overdue => Color::Red,
        DueStatus::DueSoon => Color::Yellow,
        DueStatus::Normal => Color::White,
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let today = Local::now().date_naive();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(78), Constraint::Percentage(22)])
        .split(chunks[1]);
    match app.view {
        View::Board => draw_columns(frame, app, main[0], today),
        View::Archive => draw_archive(frame, app, main[0], today),
    }
    draw_stats(frame, &app.stats(), main[1]);

    draw_status_bar(frame, app, chunks[2]);

    match &app.overlay {
        Overlay::Form(form) => draw_form(frame, form),
        Overlay::ConfirmDelete { title, .. } => draw_confirm(frame, title),
        Overlay::Diagnostics(report) => draw_diagnostics(frame, report),
        Overlay::None | Overlay::Search => {}
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view_name = match app.view {
        View::Board => "Task Board",
        View::Archive => "Archived Tasks",
    };
    let mut spans = vec![Span::styled(
        format!(" {view_name} "),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.overlay == Overlay::Search {
        spans.push(Span::raw(" Search: "));
        spans.push(Span::styled(
            format!("{}_", app.query),
            Style::default().fg(Color::Cyan),
        ));
    } else if !app.query.is_empty() {
        spans.push(Span::styled(
            format!(" filter: \"{}\" (Esc clears)", app.query),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        format!("  sorted by {}", app.order.label()),
        Style::default().fg(Color::DarkGray),
    ));
    if app.has_unsaved_changes() {
        spans.push(Span::styled(
            "  [unsaved]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn task_item(task: &Task, today: NaiveDate) -> ListItem<'static> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", task.priority),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::styled(task.title.clone(), Style::default().fg(Color::White)),
    ])];
    if let Some(description) = task.description() {
        lines.push(Line::from(Span::styled(
            format!("  {description}"),
            Style::default().fg(Color::Gray),
        )));
    }
    let mut meta = Vec::new();
    if let Some(due) = task.due_date {
        meta.push(Span::styled(
            format!("  Due: {due}"),
            Style::default().fg(due_color(task.due_status(today))),
        ));
    }
    if let Some(assignee) = task.assignee() {
        meta.push(Span::styled(
            format!("  @{assignee}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !meta.is_empty() {
        lines.push(Line::from(meta));
    }
    ListItem::new(lines)
}

fn draw_columns(frame: &mut Frame, app: &App, area: Rect, today: NaiveDate) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for status in Status::ALL {
        let tasks = app.visible_column(status);
        let selected = app.selected_status == status;
        let items: Vec<ListItem> = tasks.iter().map(|t| task_item(t, today)).collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" {} ({}) ", status, tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if selected {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if selected && !tasks.is_empty() {
            state.select(Some(app.selected_task));
        }
        frame.render_stateful_widget(list, chunks[status.index()], &mut state);
    }
}

fn draw_archive(frame: &mut Frame, app: &App, area: Rect, today: NaiveDate) {
    let tasks = app.visible_archive();
    let block = Block::default()
        .title(format!(" Archived ({}) ", tasks.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if tasks.is_empty() {
        let empty = Paragraph::new("No archived tasks.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|t| task_item(t, today).style(Style::default().add_modifier(Modifier::DIM)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.archive_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn count_line(label: &str, count: usize, max: usize, color: Color) -> Line<'static> {
    const BAR_WIDTH: usize = 10;
    let filled = if max == 0 { 0 } else { count * BAR_WIDTH / max };
    Line::from(vec![
        Span::raw(format!("{label:<12}{count:>3} ")),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
    ])
}

fn draw_stats(frame: &mut Frame, stats: &BoardStats, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let rate = stats.completion_rate();
    let gauge = Gauge::default()
        .block(Block::default().title(" Completion ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(rate.min(100) as u16)
        .label(format!("{rate}%"));
    frame.render_widget(gauge, chunks[0]);

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(format!("Total tasks {:>4}", stats.total)),
        Line::from(format!("Archived    {:>4}", stats.archived)),
        Line::from(""),
        Line::from(Span::styled("By status", heading)),
    ];
    let status_max = stats.by_status.iter().copied().max().unwrap_or(0);
    for status in Status::ALL {
        lines.push(count_line(
            status.label(),
            stats.status_count(status),
            status_max,
            Color::Cyan,
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("By priority", heading)));
    let priority_max = stats.by_priority.iter().copied().max().unwrap_or(0);
    for priority in Priority::ALL {
        lines.push(count_line(
            priority.label(),
            stats.priority_count(priority),
            priority_max,
            priority_color(priority),
        ));
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().title(" Statistics ").borders(Borders::ALL));
    frame.render_widget(panel, chunks[1]);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, color) = match (&app.message, app.view) {
        (Some(message), _) => (format!(" {}", message.text), message.level.color()),
        (None, View::Board) => (BOARD_HELP.to_string(), Color::DarkGray),
        (None, View::Archive) => (ARCHIVE_HELP.to_string(), Color::DarkGray),
    };
    let style = match &app.message {
        Some(m) if m.level == MessageLevel::Error => {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        }
        _ => Style::default().fg(color),
    };
    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

/// Rectangle of the given percentage size centred in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_form(frame: &mut Frame, form: &TaskForm) {
    let area = centered_rect(60, 60, frame.area());
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = match field {
            FormField::Status | FormField::Priority => format!("< {} >", form.value(field)),
            _ if focused => format!("{}_", form.value(field)),
            _ => form.value(field).to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<18}", field.label()), label_style),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab next field  ←→ change choice  Enter save  Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", form.heading()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn draw_confirm(frame: &mut Frame, title: &str) {
    let area = centered_rect(50, 20, frame.area());
    let popup = Paragraph::new(vec![
        Line::from(format!("Delete '{title}' permanently?")),
        Line::from(""),
        Line::from(Span::styled(
            "y delete  any other key cancels",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(" Delete Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn check(ok: bool) -> Span<'static> {
    if ok {
        Span::styled("yes", Style::default().fg(Color::Green))
    } else {
        Span::styled("no", Style::default().fg(Color::Red))
    }
}

fn draw_diagnostics(frame: &mut Frame, report: &StoreDiagnostics) {
    let area = centered_rect(60, 50, frame.area());
    let mut lines = vec![
        Line::from(format!("File: {}", report.path.display())),
        Line::from(vec![Span::raw("Exists: "), check(report.exists())]),
    ];
    if let Some(size) = report.size {
        lines.push(Line::from(format!("Size: {size} bytes")));
        lines.push(Line::from(vec![
            Span::raw("Readable: "),
            check(report.is_readable()),
        ]));
        lines.push(Line::from(format!("Columns: {}", report.columns.join(", "))));
        match &report.rows {
            Ok(rows) => lines.push(Line::from(format!("Rows: {rows}"))),
            Err(e) => lines.push(Line::from(Span::styled(
                e.clone(),
                Style::default().fg(Color::Red),
            ))),
        }
        if !report.preview.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "First rows",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.extend(report.preview.iter().map(|t| Line::from(format!("  {t}"))));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "b rebuild file (keeps a .backup copy)  Esc close",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Task File ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
