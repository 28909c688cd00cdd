//! Main UI renderer

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap};

use crate::core::counter::OptimisticCounter;
use crate::tui::app::{App, Confirmation, Screen};
use crate::tui::forms::{InputField, SettingsItem};
use crate::tui::theme::Theme;

const SPINNER: &[&str] = &["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"]; // ◐ ◓ ◑ ◒

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    if let Some(confirmation) = &app.confirmation {
        render_confirmation(frame, confirmation);
    }

    if let Some(popup) = &app.error_popup {
        render_error_popup(frame, &popup.title, &popup.message);
    }

    // Render help overlay on top if active
    if app.show_help {
        render_help_overlay(frame, app);
    }
}

/// Render the header: tabs once logged in, the screen name before
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::BOTTOM);

    let Some(selected) = app.current_screen.tab_index() else {
        let title = format!(" Peak Fitness │ {} ", app.current_screen.title());
        let header = Paragraph::new(title).style(Theme::header()).block(block);
        frame.render_widget(header, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let titles: Vec<Line> = Screen::TABS
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Theme::header())
        .highlight_style(Theme::active_tab())
        .block(block.clone());
    frame.render_widget(tabs, chunks[0]);

    let user = app.username.as_deref().unwrap_or("");
    let user = Paragraph::new(format!("{} ", user))
        .alignment(Alignment::Right)
        .style(Theme::muted())
        .block(block);
    frame.render_widget(user, chunks[1]);
}

/// Render the main content area based on current screen
fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.current_screen {
        Screen::Connecting => render_connecting(frame, area, app),
        Screen::Login => render_login(frame, area, app),
        Screen::Register => render_register(frame, area, app),
        Screen::Leaderboard => render_leaderboard(frame, area, app),
        Screen::Pushups | Screen::Pullups => render_builtin_counter(frame, area, app),
        Screen::CustomExercises => render_custom_list(frame, area, app),
        Screen::CustomExerciseDetail(id) => render_custom_detail(frame, area, app, id),
        Screen::Settings => render_settings(frame, area, app),
    }
}

fn render_connecting(frame: &mut Frame, area: Rect, app: &App) {
    let spinner = SPINNER[app.tick_counter as usize % SPINNER.len()];
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} Signing in to {}...", spinner, app.server),
            Style::default().fg(Color::Yellow),
        )),
    ];
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .title(" Peak Fitness ")
            .borders(Borders::ALL),
    );
    frame.render_widget(paragraph, area);
}

/// One labelled form field with a focus marker and cursor
fn field_line<'a>(label: &'a str, field: &InputField, focused: bool) -> Line<'a> {
    let marker = if focused { " ▶ " } else { "   " };
    let value_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:<18}", label), Style::default().fg(Color::Cyan)),
        Span::styled(field.display(), value_style),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

/// Centered box for the login and registration forms
fn form_area(area: Rect, height: u16) -> Rect {
    let width = area.width.min(64);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn render_login(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.login_form;
    let mut lines = vec![
        Line::from(""),
        field_line("Username:", &form.username, form.field == 0),
        field_line("Password:", &form.password, form.field == 1),
        Line::from(""),
    ];
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "   Logging in...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "   [Enter] Log in  [Tab] Next field  [Ctrl+R] Register  [Esc] Quit",
            Theme::muted(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Log in to Peak Fitness ")
            .borders(Borders::ALL)
            .border_style(Theme::header()),
    );
    frame.render_widget(paragraph, form_area(area, 8));
}

fn render_register(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.register_form;
    let mut lines = vec![
        Line::from(""),
        field_line("Username:", &form.username, form.field == 0),
        field_line("Password:", &form.password, form.field == 1),
        field_line("Confirm password:", &form.confirm_password, form.field == 2),
        Line::from(""),
        Line::from(Span::styled(
            "   At least 8 characters with upper, lower case and a number",
            Theme::muted(),
        )),
    ];
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "   Creating account...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "   [Enter] Register  [Tab] Next field  [Esc] Back to login",
            Theme::muted(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Create an account ")
            .borders(Borders::ALL)
            .border_style(Theme::header()),
    );
    frame.render_widget(paragraph, form_area(area, 10));
}

/// Render the leaderboard screen
fn render_leaderboard(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let items: Vec<ListItem> = if app.leaderboard_loading && app.leaderboard.is_empty() {
        vec![ListItem::new("  Loading leaderboard...")]
    } else if let Some(err) = &app.leaderboard_error {
        vec![
            ListItem::new(format!("  Error: {}", err)).style(Style::default().fg(Color::Red)),
            ListItem::new(""),
            ListItem::new("  Press [r] to retry"),
        ]
    } else if !app.leaderboard_fetched {
        vec![ListItem::new("  Press [r] to load the leaderboard")]
    } else if app.leaderboard.is_empty() {
        vec![ListItem::new("  Nobody has logged any exercise yet")]
    } else {
        let mut items = vec![ListItem::new(format!(
            "  {:<5} {:<20} {:>8} {:>8} {:>8}",
            "Rank", "User", "Pushups", "Pull-ups", "Points"
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];

        items.extend(app.leaderboard.iter().enumerate().map(|(i, entry)| {
            let is_me = app.username.as_deref() == Some(entry.username.as_str());
            let text = format!(
                "  {:<5} {:<20} {:>8} {:>8} {:>8}{}",
                format!("#{}", i + 1),
                truncate(&entry.username, 20),
                entry.pushups,
                entry.pullups,
                entry.points,
                if is_me { "  ←" } else { "" }
            );
            let item = ListItem::new(text);
            if i == app.leaderboard_selection.selected {
                item.style(Theme::selected())
            } else if is_me {
                item.style(Style::default().fg(Color::Yellow))
            } else {
                item
            }
        }));
        items
    };

    let title = if app.leaderboard.is_empty() {
        " Leaderboard ".to_string()
    } else {
        format!(" Leaderboard ({}) ", app.leaderboard.len())
    };

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Theme::normal()),
    );
    frame.render_widget(list, chunks[0]);

    let help = Paragraph::new(" [r] Refresh  [j/k] Navigate  [Tab] Next tab  [?] Help")
        .style(Theme::muted());
    frame.render_widget(help, chunks[1]);
}

/// Big counter with its sync state underneath
fn counter_lines(counter: &OptimisticCounter, loading: bool, tick_counter: u64) -> Vec<Line<'static>> {
    if counter.last_synced().is_none() {
        let text = if loading {
            format!("{} Loading...", SPINNER[tick_counter as usize % SPINNER.len()])
        } else {
            "Press [r] to load".to_string()
        };
        return vec![Line::from(""), Line::from(Span::styled(text, Theme::muted()))];
    }

    let (value_style, state) = if counter.is_syncing() {
        (
            Theme::counter_syncing(),
            Span::styled(
                format!(
                    "{} syncing {} change(s)…",
                    SPINNER[tick_counter as usize % SPINNER.len()],
                    counter.in_flight()
                ),
                Style::default().fg(Color::Yellow),
            ),
        )
    } else {
        let synced = counter
            .last_synced()
            .map(format_relative_time)
            .unwrap_or_default();
        (
            Theme::counter(),
            Span::styled(format!("✓ synced {}", synced), Theme::muted()),
        )
    };

    vec![
        Line::from(""),
        Line::from(Span::styled(counter.value().to_string(), value_style)),
        Line::from(""),
        Line::from(state),
    ]
}

fn counter_help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "[+] +1   [-] -1   []] +10   [[] -10",
            Style::default().fg(Color::Cyan),
        )),
    ]
}

fn render_builtin_counter(frame: &mut Frame, area: Rect, app: &App) {
    let Some(kind) = app.current_screen.counter_kind() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let counter = app.counter(kind);
    let mut lines = counter_lines(counter, app.counts_loading.contains(&kind), app.tick_counter);
    if let Some(err) = app.counter_error.as_ref().filter(|_| counter.last_synced().is_none()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    lines.extend(counter_help_lines());

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(format!(" {} ", kind.display_name()))
            .borders(Borders::ALL)
            .border_style(Theme::normal()),
    );
    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new(" [↑/↓] ±1  [PgUp/PgDn] ±10  [r] Refresh  [Tab] Next tab")
        .style(Theme::muted());
    frame.render_widget(help, chunks[1]);
}

/// Render the custom exercise list
fn render_custom_list(frame: &mut Frame, area: Rect, app: &App) {
    let input_height = if app.custom_input_mode { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(area);

    let items: Vec<ListItem> = if app.custom_loading && !app.custom_fetched {
        vec![ListItem::new("  Loading exercises...")]
    } else if let Some(err) = &app.custom_error {
        vec![
            ListItem::new(format!("  Error: {}", err)).style(Style::default().fg(Color::Red)),
            ListItem::new(""),
            ListItem::new("  Press [r] to retry"),
        ]
    } else if app.custom_exercises.is_empty() {
        vec![
            ListItem::new("  No custom exercises yet"),
            ListItem::new(""),
            ListItem::new("  Press [a] to add one"),
        ]
    } else {
        app.custom_exercises
            .iter()
            .enumerate()
            .map(|(i, exercise)| {
                let sync = if exercise.counter.is_syncing() { " …" } else { "" };
                let text = format!(
                    "  {:<30} {:>8}{}",
                    truncate(&exercise.name, 30),
                    exercise.counter.value(),
                    sync
                );
                let item = ListItem::new(text);
                if i == app.custom_selection.selected {
                    item.style(Theme::selected())
                } else {
                    item
                }
            })
            .collect()
    };

    let title = if app.custom_exercises.is_empty() {
        " Custom Exercises ".to_string()
    } else {
        format!(" Custom Exercises ({}) ", app.custom_exercises.len())
    };

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Theme::normal()),
    );
    frame.render_widget(list, chunks[0]);

    if app.custom_input_mode {
        let input = Paragraph::new(Line::from(vec![
            Span::raw(app.custom_name_input.display()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]))
        .block(
            Block::default()
                .title(" New exercise name ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(input, chunks[1]);
    }

    let help_bar = if app.custom_input_mode {
        " [Enter] Add  [Esc] Cancel"
    } else if app.custom_adding {
        " Adding exercise..."
    } else {
        " [Enter] Open  [a] Add  [d] Delete  [r] Refresh  [j/k] Navigate"
    };
    let help = Paragraph::new(help_bar).style(Theme::muted());
    frame.render_widget(help, chunks[2]);
}

fn render_custom_detail(frame: &mut Frame, area: Rect, app: &App, id: i64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let Some(exercise) = app.exercise(id) else {
        render_placeholder(frame, chunks[0], "Custom Exercise", "Exercise not found");
        return;
    };

    let mut lines = counter_lines(&exercise.counter, app.custom_loading, app.tick_counter);
    lines.extend(counter_help_lines());

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(format!(" {} ", exercise.name))
            .borders(Borders::ALL)
            .border_style(Theme::normal()),
    );
    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new(" [↑/↓] ±1  [PgUp/PgDn] ±10  [d] Delete  [r] Refresh  [Esc] Back")
        .style(Theme::muted());
    frame.render_widget(help, chunks[1]);
}

/// Render the settings screen
fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let form = &app.settings_form;
    let sel = app.settings_selection.selected;

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("   Logged in as: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                app.username.clone().unwrap_or_default(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
    ];

    for (i, item) in SettingsItem::ALL.iter().enumerate() {
        let selected = i == sel;
        let marker = Span::raw(if selected { " ▶ " } else { "   " });
        let line = match item {
            SettingsItem::NewUsername | SettingsItem::NewPassword => {
                let (label, field) = if *item == SettingsItem::NewUsername {
                    ("New username: ", &form.new_username)
                } else {
                    ("New password: ", &form.new_password)
                };
                let mut spans = vec![
                    marker,
                    Span::styled(label, Style::default().fg(Color::Cyan)),
                    Span::styled(field.display(), Style::default().fg(Color::White)),
                ];
                if selected && form.editing {
                    spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
                } else if field.value().is_empty() {
                    spans.push(Span::styled("(unchanged)", Theme::muted()));
                }
                Line::from(spans)
            }
            SettingsItem::Update => {
                Line::from(vec![marker, Span::styled("[ Update ]", Theme::active_tab())])
            }
            SettingsItem::Logout => Line::from(vec![marker, Span::raw("[ Log out ]")]),
            SettingsItem::DeleteAccount => Line::from(vec![
                marker,
                Span::styled("[ Delete account ]", Style::default().fg(Theme::ERROR)),
            ]),
        };
        lines.push(line);
        if *item == SettingsItem::NewPassword {
            lines.push(Line::from(""));
        }
    }

    if form.submitting {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "   Working...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Settings ")
            .borders(Borders::ALL)
            .border_style(Theme::normal()),
    );
    frame.render_widget(paragraph, chunks[0]);

    let help_bar = if form.editing {
        " [Enter] Done  [Esc] Done"
    } else {
        " [j/k] Navigate  [Enter] Edit / Run  [Tab] Next tab"
    };
    let help = Paragraph::new(help_bar).style(Theme::muted());
    frame.render_widget(help, chunks[1]);
}

/// Render a placeholder screen
fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(format!("\n  {}", message)).block(
        Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL),
    );
    frame.render_widget(paragraph, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_text = if let Some(msg) = &app.status_message {
        format!(" {}", msg)
    } else if let Some(user) = &app.username {
        format!(" {} │ {} │ ? for help ", user, app.server)
    } else {
        format!(" {} ", app.server)
    };

    let status = Paragraph::new(status_text)
        .style(Theme::status_bar())
        .block(Block::default().borders(Borders::TOP));

    frame.render_widget(status, area);
}

/// Centered rectangle of at most the given size
fn centered_rect(area: Rect, max_width: u16, max_height: u16) -> Rect {
    let width = (area.width * 60 / 100).max(30).min(max_width).min(area.width);
    let height = max_height.min(area.height);
    Rect::new(
        (area.width.saturating_sub(width)) / 2,
        (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn render_error_popup(frame: &mut Frame, title: &str, message: &str) {
    let popup_area = centered_rect(frame.area(), 60, 9);
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(format!("  {}", message)),
        Line::from(""),
        Line::from(Span::styled("  Press Enter to dismiss", Theme::muted())),
    ];

    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::ERROR)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

fn render_confirmation(frame: &mut Frame, confirmation: &Confirmation) {
    let popup_area = centered_rect(frame.area(), 56, 7);
    frame.render_widget(Clear, popup_area);

    let question = match confirmation {
        Confirmation::DeleteExercise { name, .. } => format!("Delete '{}'?", name),
        Confirmation::DeleteAccount => "Delete your account? This cannot be undone.".to_string(),
    };

    let text = vec![
        Line::from(""),
        Line::from(format!("  {}", question)),
        Line::from(""),
        Line::from(Span::styled("  [y] Yes  [n] No", Style::default().fg(Color::Cyan))),
    ];

    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

/// Render the help overlay
fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Calculate centered popup area (60% width, 70% height)
    let popup_width = (area.width * 60 / 100).min(60);
    let popup_height = (area.height * 70 / 100).min(20);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let (title, help_lines) = get_help_content(app.current_screen);

    let text: Vec<Line> = help_lines
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:12}", key), Style::default().fg(Color::Cyan)),
                Span::raw(desc),
            ])
        })
        .collect();

    let help = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help, popup_area);
}

/// Get help content for the current screen
fn get_help_content(screen: Screen) -> (&'static str, Vec<(&'static str, &'static str)>) {
    let tab_keys = [
        ("Tab / 1-5", "Switch tab"),
        ("q", "Quit"),
        ("?", "Show this help"),
    ];
    let counter_keys = [
        ("+ / ↑", "Add one"),
        ("- / ↓", "Remove one"),
        ("] / PgUp", "Add ten"),
        ("[ / PgDn", "Remove ten"),
        ("r", "Refresh"),
    ];

    match screen {
        Screen::Connecting | Screen::Login | Screen::Register => (
            "Help",
            vec![
                ("Tab", "Next field"),
                ("Enter", "Submit"),
                ("Ctrl+R", "Register"),
                ("Esc", "Back / Quit"),
            ],
        ),
        Screen::Leaderboard => {
            let mut keys = vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("r", "Refresh"),
            ];
            keys.extend(tab_keys);
            ("Help - Leaderboard", keys)
        }
        Screen::Pushups | Screen::Pullups => {
            let mut keys = counter_keys.to_vec();
            keys.extend(tab_keys);
            ("Help - Counter", keys)
        }
        Screen::CustomExercises => {
            let mut keys = vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter", "Open exercise"),
                ("a", "Add exercise"),
                ("d", "Delete exercise"),
                ("r", "Refresh"),
            ];
            keys.extend(tab_keys);
            ("Help - Custom Exercises", keys)
        }
        Screen::CustomExerciseDetail(_) => {
            let mut keys = counter_keys.to_vec();
            keys.extend([("d", "Delete exercise"), ("Esc", "Go back")]);
            ("Help - Custom Exercise", keys)
        }
        Screen::Settings => {
            let mut keys = vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter", "Edit field / Run action"),
            ];
            keys.extend(tab_keys);
            ("Help - Settings", keys)
        }
    }
}

/// Format a datetime as relative time
fn format_relative_time(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_seconds() >= 5 {
        format!("{}s ago", duration.num_seconds())
    } else {
        "just now".to_string()
    }
}

/// Truncate a string to max characters with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_format_relative_time() {
        assert_eq!(format_relative_time(Utc::now()), "just now");
        assert_eq!(
            format_relative_time(Utc::now() - Duration::seconds(30)),
            "30s ago"
        );
        assert_eq!(
            format_relative_time(Utc::now() - Duration::minutes(3)),
            "3m ago"
        );
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Überlangername", 8), "Überl...");
    }

    #[test]
    fn test_every_screen_has_help() {
        for screen in Screen::TABS {
            let (_, keys) = get_help_content(screen);
            assert!(keys.iter().any(|(k, _)| *k == "?"));
        }
    }
}
