//! Form widgets for the step surfaces

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::presenter::{Field, FieldKind, FieldRequest};

/// A form field widget that can handle different input types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        /// Cursor position in characters
        cursor_pos: usize,
        /// Render as asterisks
        masked: bool,
        /// Accept digits only
        numeric: bool,
    },
    /// Choice from predefined options
    Select {
        options: &'static [&'static str],
        /// `None` until the user picks one
        selected: Option<usize>,
    },
}

impl FormField {
    pub fn from_kind(kind: FieldKind, prefill: Option<&str>) -> Self {
        let mut field = match kind {
            FieldKind::Select(options) => FormField::Select {
                options,
                selected: None,
            },
            FieldKind::Text | FieldKind::Password | FieldKind::Number => FormField::TextInput {
                value: String::new(),
                cursor_pos: 0,
                masked: kind == FieldKind::Password,
                numeric: kind == FieldKind::Number,
            },
        };
        if let Some(prefill) = prefill {
            field.set_value(prefill);
        }
        field
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::Select { options, selected } => selected
                .and_then(|i| options.get(i))
                .map(|o| (*o).to_string())
                .unwrap_or_default(),
        }
    }

    /// Set the value from a string
    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                *value = new_value.to_string();
                *cursor_pos = value.chars().count();
            }
            FormField::Select { options, selected } => {
                if let Some(idx) = options.iter().position(|o| *o == new_value) {
                    *selected = Some(idx);
                }
            }
        }
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                numeric,
                ..
            } => match key {
                KeyCode::Char(c) => {
                    if !*numeric || c.is_ascii_digit() {
                        value.insert(byte_index(value, *cursor_pos), c);
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                        value.remove(byte_index(value, *cursor_pos));
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos < value.chars().count() {
                        value.remove(byte_index(value, *cursor_pos));
                    }
                    true
                }
                KeyCode::Left => {
                    *cursor_pos = cursor_pos.saturating_sub(1);
                    true
                }
                KeyCode::Right => {
                    if *cursor_pos < value.chars().count() {
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.chars().count();
                    true
                }
                _ => false,
            },
            FormField::Select { options, selected } => {
                let last = options.len().saturating_sub(1);
                match key {
                    KeyCode::Left | KeyCode::Char('h') => {
                        *selected = Some(selected.map_or(0, |i| i.saturating_sub(1)));
                        true
                    }
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                        *selected = Some(selected.map_or(0, |i| (i + 1).min(last)));
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Render the field
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let line = match self {
            FormField::TextInput {
                value,
                cursor_pos,
                masked,
                ..
            } => {
                let mut text: String = if *masked {
                    "*".repeat(value.chars().count())
                } else {
                    value.clone()
                };
                if focused {
                    text.insert(byte_index(&text, *cursor_pos), '|');
                }
                Line::from(text)
            }
            FormField::Select { options, selected } => {
                let mut spans = Vec::new();
                for (i, option) in options.iter().enumerate() {
                    let style = if Some(i) == *selected {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    spans.push(Span::styled(format!(" {option} "), style));
                    spans.push(Span::raw(" "));
                }
                if selected.is_none() {
                    spans.push(Span::styled(
                        "(select role)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            }
        };

        let para = Paragraph::new(line).style(Style::default().fg(if focused {
            Color::White
        } else {
            Color::Gray
        }));
        frame.render_widget(para, area);
    }
}

fn byte_index(value: &str, char_pos: usize) -> usize {
    value
        .char_indices()
        .nth(char_pos)
        .map_or(value.len(), |(i, _)| i)
}

/// One labelled input on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub field: Field,
    pub label: &'static str,
    pub widget: FormField,
}

/// The inputs of the current step, in the order they were requested
#[derive(Debug, Clone, Default)]
pub struct StepForm {
    pub entries: Vec<FormEntry>,
    /// Currently focused entry index
    pub focused_index: usize,
}

impl StepForm {
    /// Add an input for `request.field` unless one exists
    pub fn add(&mut self, request: &FieldRequest) -> bool {
        if self.contains(request.field) {
            return false;
        }
        self.entries.push(FormEntry {
            field: request.field,
            label: request.label,
            widget: FormField::from_kind(request.kind, request.prefill.as_deref()),
        });
        true
    }

    pub fn contains(&self, field: Field) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    pub fn value(&self, field: Field) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.widget.value())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.focused_index = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a mutable reference to the focused field
    pub fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        self.entries
            .get_mut(self.focused_index)
            .map(|e| &mut e.widget)
    }

    /// Move to the next field, wrapping around
    pub fn next_field(&mut self) {
        if !self.entries.is_empty() {
            self.focused_index = (self.focused_index + 1) % self.entries.len();
        }
    }

    /// Move to the previous field, wrapping around
    pub fn prev_field(&mut self) {
        if !self.entries.is_empty() {
            self.focused_index =
                (self.focused_index + self.entries.len() - 1) % self.entries.len();
        }
    }
}
