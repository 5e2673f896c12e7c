use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section, FIELDS};
use crate::catalog::{CATEGORIES, COUNTRIES, MAX_CATEGORIES};
use crate::theme::Theme;

// Load theme colors once at startup
static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::load)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(8),    // Country + categories boxes
            Constraint::Length(7), // Details box (5 fields + borders)
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);

    let selection = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50), // Country list
            Constraint::Percentage(50), // Category toggles
        ])
        .split(chunks[1]);

    draw_country_box(f, app, selection[0]);
    draw_categories_box(f, app, selection[1]);
    draw_details_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::Confirm => draw_confirm_popup(f, app),
        Popup::Result => draw_result_popup(f, app),
    }
}

fn section_style(active: bool) -> (Color, Style) {
    let border_color = if active { accent() } else { inactive() };
    let title_style = if active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };
    (border_color, title_style)
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > current selection summary
    let line = if let Some(ref status) = app.status_message {
        Line::from(vec![Span::styled(status, Style::default().fg(warning()))])
    } else {
        let country = app.selected_country();
        let topics = if app.selected_categories.is_empty() {
            "no topics".to_string()
        } else {
            app.selected_categories.join(", ")
        };
        let recipient = if app.email.trim().is_empty() {
            "no recipient".to_string()
        } else {
            app.email.trim().to_string()
        };

        Line::from(vec![
            Span::styled(country.name, Style::default().fg(text())),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(topics, Style::default().fg(text())),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(recipient, Style::default().fg(text_dim())),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_country_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Country;
    let (border_color, title_style) = section_style(is_active);

    let block = Block::default()
        .title(Span::styled(" Country ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Window the list so the cursor stays visible
    let inner_height = area.height.saturating_sub(3).max(1) as usize; // borders + header
    let start = if app.country_cursor >= inner_height {
        app.country_cursor + 1 - inner_height
    } else {
        0
    };
    let end = (start + inner_height).min(COUNTRIES.len());

    let head = Row::new(vec![
        Span::styled("", Style::default().fg(header())),
        Span::styled("Name", Style::default().fg(header())),
        Span::styled("Code", Style::default().fg(header())),
    ]);

    let rows: Vec<Row> = COUNTRIES[start..end]
        .iter()
        .enumerate()
        .map(|(i, country)| {
            let idx = start + i;
            let selected = idx == app.country_cursor;
            let marker = if selected { "●" } else { " " };

            let row_style = if selected && is_active {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };

            Row::new(vec![
                Span::styled(marker, Style::default().fg(success())),
                Span::styled(country.name, Style::default().fg(text())),
                Span::styled(country.code, Style::default().fg(text_dim())),
            ])
            .style(row_style)
        })
        .collect();

    let widths = vec![
        Constraint::Length(2),
        Constraint::Percentage(80),
        Constraint::Length(4),
    ];

    let table = Table::new(rows, widths).header(head).block(block);
    f.render_widget(table, area);
}

fn draw_categories_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Categories;
    let (border_color, title_style) = section_style(is_active);

    let title = format!(
        " Topics ({}/{}) ",
        app.selected_categories.len(),
        MAX_CATEGORIES
    );
    let block = Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let rows: Vec<Row> = CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let selected = app.is_category_selected(category);
            let (icon, icon_color) = if selected {
                ("✓", success())
            } else {
                (" ", text_dim())
            };

            // Payload position, since selection order is what gets sent
            let order = app
                .selected_categories
                .iter()
                .position(|c| c == category)
                .map(|p| format!("#{}", p + 1))
                .unwrap_or_default();

            let row_style = if i == app.category_cursor && is_active {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };

            Row::new(vec![
                Span::styled(icon, Style::default().fg(icon_color)),
                Span::styled(*category, Style::default().fg(text())),
                Span::styled(order, Style::default().fg(text_dim())),
            ])
            .style(row_style)
        })
        .collect();

    let widths = vec![
        Constraint::Length(2),
        Constraint::Percentage(80),
        Constraint::Length(3),
    ];

    let table = Table::new(rows, widths).block(block);
    f.render_widget(table, area);
}

fn draw_details_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Details;
    let (border_color, title_style) = section_style(is_active);

    let block = Block::default()
        .title(Span::styled(" Details ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let rows: Vec<Row> = FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let on_cursor = i == app.field_cursor && is_active;
            let value = app.field_value(*field);

            let shown = if field.is_secret() {
                "•".repeat(value.chars().count())
            } else {
                value.to_string()
            };
            let cursor = if on_cursor && app.editing { "_" } else { "" };

            let value_color = if shown.is_empty() { text_dim() } else { text() };
            let display = if shown.is_empty() && !app.editing {
                "(required)".to_string()
            } else {
                format!("{}{}", shown, cursor)
            };

            let row_style = if on_cursor {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };

            Row::new(vec![
                Span::styled(field.label(), Style::default().fg(header())),
                Span::styled(display, Style::default().fg(value_color)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = vec![Constraint::Length(20), Constraint::Percentage(75)];

    let table = Table::new(rows, widths).block(block);
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = if app.editing {
        vec![
            ("Enter/Esc", "Done"),
            ("Tab", "Next field"),
            ("Backspace", "Erase"),
        ]
    } else {
        match app.section {
            Section::Country => vec![
                ("↑↓", "Pick"),
                ("Tab", "Next"),
                ("s", "Send"),
                ("h", "Help"),
            ],
            Section::Categories => vec![
                ("↑↓", "Nav"),
                ("Space", "Toggle"),
                ("Tab", "Next"),
                ("s", "Send"),
                ("h", "Help"),
            ],
            Section::Details => vec![
                ("↑↓", "Nav"),
                ("Enter", "Edit"),
                ("d", "Clear"),
                ("Tab", "Next"),
                ("s", "Send"),
            ],
        }
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled("═══ Navigation ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled("  Tab       ", Style::default().fg(accent())),
            Span::raw("Switch boxes (Country → Topics → Details)"),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", Style::default().fg(accent())),
            Span::raw("Move up/down in lists"),
        ]),
        Line::from(""),
        Line::from(Span::styled("═══ Form ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled("  Space     ", Style::default().fg(accent())),
            Span::raw("Toggle a topic (at most four at once)"),
        ]),
        Line::from(vec![
            Span::styled("  Enter/e   ", Style::default().fg(accent())),
            Span::raw("Edit the highlighted field"),
        ]),
        Line::from(vec![
            Span::styled("  d         ", Style::default().fg(accent())),
            Span::raw("Clear the highlighted field"),
        ]),
        Line::from(vec![
            Span::styled("  s         ", Style::default().fg(accent())),
            Span::raw("Send the digest request"),
        ]),
        Line::from(""),
        Line::from(Span::styled("═══ Quick Start ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled("  newsbrief           ", Style::default().fg(accent())),
            Span::raw("Launch this TUI"),
        ]),
        Line::from(vec![
            Span::styled("  newsbrief --send    ", Style::default().fg(accent())),
            Span::raw("Submit from the command line"),
        ]),
        Line::from(vec![
            Span::styled("  newsbrief --endpoint URL", Style::default().fg(accent())),
            Span::raw("  Override the backend for one run"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" newsbrief Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.status_message.as_deref().unwrap_or("Send digest? (y/n)");

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn draw_result_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 30, f.area());

    f.render_widget(Clear, popup_area);

    let Some(report) = app.last_report.as_ref() else {
        return;
    };

    let (title, color) = if report.is_sent() {
        (" Digest Sent ", success())
    } else {
        (" Delivery Failed ", danger())
    };

    let body = vec![
        Line::from(""),
        Line::from(Span::styled(report.message(), Style::default().fg(text()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" close", Style::default().fg(text_dim())),
        ]),
    ];

    let result = Paragraph::new(body)
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(result, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
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
