//! Drawing the wizard model

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{Listing, Wizard};
use crate::presenter::Severity;
use crate::session::Step;
use crate::steps::catalog::COMPLETE_TITLE;

const LABEL_WIDTH: u16 = 14;

pub struct HeaderBar<'a> {
    pub version: &'static str,
    pub base_url: &'a str,
}

impl HeaderBar<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                " Prelim",
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" v{}", self.version), Style::default().fg(Color::Gray)),
            Span::styled("  │  ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.base_url, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

pub fn draw(frame: &mut Frame, wizard: &Wizard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // progress
            Constraint::Min(6),    // step body
            Constraint::Length(6), // message
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    HeaderBar {
        version: env!("CARGO_PKG_VERSION"),
        base_url: wizard.base_url(),
    }
    .render(frame, chunks[0]);

    render_progress(frame, chunks[1], wizard);

    let body = match wizard.listing() {
        Some(listing) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[2]);
            render_listing(frame, halves[1], listing);
            halves[0]
        }
        None => chunks[2],
    };
    if wizard.is_completed() {
        render_complete(frame, body);
    } else {
        render_step(frame, body, wizard);
    }

    render_message(frame, chunks[3], wizard);
    render_footer(frame, chunks[4], wizard);
}

fn render_progress(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let step = wizard.step();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(step.progress_ratio())
        .label(format!("Step {}/{}", step.number(), Step::LAST.number()));
    frame.render_widget(gauge, area);
}

fn render_step(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let info = wizard.info();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", info.heading()))
        .title_bottom(Line::from(format!(" {} ", info.endpoint)).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut y = inner.y;
    for (i, entry) in wizard.form.entries.iter().enumerate() {
        if y >= inner.bottom() {
            return;
        }
        let focused = i == wizard.form.focused_index;
        let row = Rect::new(inner.x, y, inner.width, 1);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)])
            .split(row);

        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{}:", entry.label), label_style)),
            cols[0],
        );
        entry.widget.render(frame, cols[1], focused);
        y += 1;
    }

    // blank line, then the trigger
    y += 1;
    if y < inner.bottom() {
        let style = if wizard.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        };
        let label = if wizard.busy {
            " Working... ".to_string()
        } else {
            format!(" {} ", info.trigger_label())
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, style)),
            Rect::new(inner.x, y, inner.width, 1),
        );
    }
}

fn render_complete(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            COMPLETE_TITLE,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from("All 15 steps done. Press Esc to exit.").centered(),
    ])
    .block(block);
    frame.render_widget(text, area);
}

fn render_listing(frame: &mut Frame, area: Rect, listing: &Listing) {
    let items: Vec<ListItem> = if listing.pets.is_empty() {
        vec![ListItem::new(Span::styled(
            "No pets",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        listing
            .pets
            .iter()
            .map(|pet| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        pet.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("  Type: {}  Owner: {}", pet.kind, pet.owner),
                        Style::default().fg(Color::Gray),
                    )),
                    Line::from(Span::styled(
                        format!("  ID: {}", pet.id),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", listing.title, listing.pets.len())),
    );
    frame.render_widget(list, area);
}

fn render_message(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let (text, color) = match wizard.message() {
        Some((text, severity)) => (text, severity_color(severity)),
        None => ("", Color::Gray),
    };
    let para = Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(" Response "),
        );
    frame.render_widget(para, area);
}

fn render_footer(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let hints = if wizard.is_completed() {
        " Esc quit"
    } else if wizard.busy {
        " Waiting for the service..."
    } else {
        " Tab/↑/↓ focus  ←/→ choose  Enter submit  Esc quit"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}
