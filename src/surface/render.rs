//! Drawing a dialog surface with ratatui
//!
//! The dialog is sized from its content, centred in the given area and drawn
//! over a dimmed backdrop. Every interactive element's rectangle is recorded
//! so mouse input can be mapped back to it.

use super::{DialogSurface, FocusTarget, HitRegions, Stylesheet};
use crate::dialog::types::{DialogContent, Region};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::borrow::Cow;
use unicode_width::UnicodeWidthStr;

const MIN_WIDTH: u16 = 30;
const MAX_TEXT_WIDTH: u16 = 60;
const FIELD_INPUT_WIDTH: u16 = 20;
const BUTTON_GAP: u16 = 1;
const CLOSE_LABEL: &str = " × ";

impl DialogSurface {
    /// Draw the dialog into `area` and record its hit regions
    pub fn render(&mut self, frame: &mut Frame, area: Rect, stylesheet: &Stylesheet) {
        let mut hits = HitRegions::default();

        // Backdrop keeps whatever is underneath, only dimmed
        let backdrop = Style::default()
            .add_modifier(Modifier::DIM)
            .patch(self.region_style(Region::Backdrop, stylesheet));
        frame.render_widget(Block::default().style(backdrop), area);

        let text_lines = self.content_lines();
        let dialog_area = centered(self.preferred_size(&text_lines), area);
        hits.dialog = Some(dialog_area);

        frame.render_widget(Clear, dialog_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .style(self.region_style(Region::Dialog, stylesheet));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        if self.config.show_close_button {
            let width = CLOSE_LABEL.width() as u16;
            let rect = Rect {
                x: dialog_area.right().saturating_sub(width + 1).max(dialog_area.x),
                y: dialog_area.y,
                width: width.min(dialog_area.width),
                height: 1,
            };
            let mut style = self.region_style(Region::CloseButton, stylesheet);
            if self.focused_target() == Some(FocusTarget::CloseButton) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            frame.render_widget(Paragraph::new(Span::styled(CLOSE_LABEL, style)), rect);
            hits.close_button = Some(rect);
        }

        // One column of padding inside the border
        let inner = Rect {
            x: inner.x.saturating_add(1),
            width: inner.width.saturating_sub(2),
            ..inner
        };
        let bottom = inner.bottom();
        let mut y = inner.y;

        if let Some(title) = &self.config.title {
            if y < bottom {
                let style = Style::default()
                    .add_modifier(Modifier::BOLD)
                    .patch(self.region_style(Region::Title, stylesheet));
                frame.render_widget(
                    Paragraph::new(Span::styled(title.as_str(), style)),
                    Rect { y, height: 1, ..inner },
                );
            }
            y = y.saturating_add(2);
        }

        if self.config.content.is_some() {
            let content_style = self.region_style(Region::Content, stylesheet);
            match &self.form {
                Some(form) => {
                    for (index, field) in form.fields.iter().enumerate() {
                        if y >= bottom {
                            break;
                        }
                        let label = format!("{}: ", field.display_label());
                        let label_width = (label.width() as u16).min(inner.width);
                        let input = Rect {
                            x: inner.x + label_width,
                            y,
                            width: inner.width.saturating_sub(label_width),
                            height: 1,
                        };
                        let focused = self.focused_target() == Some(FocusTarget::Field(index));
                        let input_style = if focused {
                            content_style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                        } else {
                            content_style.add_modifier(Modifier::UNDERLINED)
                        };
                        frame.render_widget(
                            Paragraph::new(Line::from(vec![
                                Span::styled(label, content_style),
                                Span::styled(format!("{:<width$}", field.value, width = input.width as usize), input_style),
                            ])),
                            Rect { y, height: 1, ..inner },
                        );
                        if focused {
                            let cursor = input.x + (field.value.width() as u16).min(input.width.saturating_sub(1));
                            frame.set_cursor(cursor, y);
                        }
                        hits.fields.push((index, input));
                        y += 1;
                    }
                }
                None => {
                    for line in &text_lines {
                        if y >= bottom {
                            break;
                        }
                        frame.render_widget(
                            Paragraph::new(Span::styled(line.as_str(), content_style)),
                            Rect { y, height: 1, ..inner },
                        );
                        y += 1;
                    }
                }
            }
            y = y.saturating_add(1);
        }

        let actions_style = self.region_style(Region::Actions, stylesheet);
        let row_style = actions_style.patch(self.region_style(Region::ActionsRow, stylesheet));
        for row in &self.rows {
            if y >= bottom {
                break;
            }
            let row_area = Rect { y, height: 1, ..inner };
            frame.render_widget(Block::default().style(row_style), row_area);

            let mut x = row_area.x;
            for &index in &row.left {
                x = self.render_button(frame, index, x, row_area, stylesheet, &mut hits);
            }

            let right_width = self.group_width(&row.right);
            let mut x = row_area.right().saturating_sub(right_width).max(x);
            for &index in &row.right {
                x = self.render_button(frame, index, x, row_area, stylesheet, &mut hits);
            }
            y += 1;
        }

        self.hits = hits;
    }

    fn render_button(
        &self,
        frame: &mut Frame,
        index: usize,
        x: u16,
        row_area: Rect,
        stylesheet: &Stylesheet,
        hits: &mut HitRegions,
    ) -> u16 {
        let label = button_label(&self.buttons[index].action.title);
        let width = (label.width() as u16).min(row_area.right().saturating_sub(x));
        if width == 0 {
            return x;
        }
        let mut style = self.button_style(index, stylesheet);
        if self.focused_target() == Some(FocusTarget::Button(index)) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let rect = Rect {
            x,
            y: row_area.y,
            width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
        hits.buttons.push((index, rect));
        x.saturating_add(width + BUTTON_GAP)
    }

    fn group_width(&self, group: &[usize]) -> u16 {
        let labels: u16 = group
            .iter()
            .map(|&index| button_label(&self.buttons[index].action.title).width() as u16)
            .sum();
        labels + BUTTON_GAP * (group.len().saturating_sub(1) as u16)
    }

    /// Text content wrapped to the widest line the dialog allows
    fn content_lines(&self) -> Vec<String> {
        match &self.config.content {
            Some(DialogContent::Text(text)) => textwrap::wrap(text, MAX_TEXT_WIDTH as usize)
                .into_iter()
                .map(Cow::into_owned)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Outer width and height wanted for the current content
    fn preferred_size(&self, text_lines: &[String]) -> (u16, u16) {
        let mut width = 0u16;
        let mut height = 0u16;

        if let Some(title) = &self.config.title {
            width = width.max(title.width() as u16);
            height += 2;
        }
        if self.config.content.is_some() {
            match &self.form {
                Some(form) => {
                    for field in &form.fields {
                        let label = field.display_label().width() as u16 + 2;
                        let input = (field.value.width() as u16 + 1).max(FIELD_INPUT_WIDTH);
                        width = width.max(label + input);
                    }
                    height += form.fields.len() as u16;
                }
                None => {
                    for line in text_lines {
                        width = width.max(line.width() as u16);
                    }
                    height += text_lines.len() as u16;
                }
            }
            height += 1;
        }
        for row in &self.rows {
            let both = !row.left.is_empty() && !row.right.is_empty();
            let row_width = self.group_width(&row.left)
                + self.group_width(&row.right)
                + if both { BUTTON_GAP * 2 } else { 0 };
            width = width.max(row_width);
        }
        height += self.rows.len() as u16;

        // Border and padding
        ((width + 4).max(MIN_WIDTH), height.max(1) + 2)
    }
}

fn button_label(title: &str) -> String {
    format!("[ {} ]", title)
}

fn centered((width, height): (u16, u16), area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
