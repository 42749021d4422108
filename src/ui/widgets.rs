//! UI widgets for the expense views.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use super::theme::Theme;
use crate::data::{DailySummary, ExpenseRecord};
use crate::form::{FormField, FormState};
use crate::notice::Notice;
use crate::selection::SelectionState;

/// Placeholder shown in an empty date field
const DATE_HINT: &str = "YYYY-MM-DD";

/// Shared bordered block; double border when focused
fn panel<'a>(title: String, focused: bool, theme: &Theme) -> Block<'a> {
    let (border_style, title_style) = theme.panel_styles(focused);
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        })
        .border_style(border_style)
        .title_style(title_style)
        .style(theme.surface_style())
}

/// Top menu switching between the three views
pub struct MenuBar<'a> {
    titles: &'a [&'a str],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> MenuBar<'a> {
    pub fn new(titles: &'a [&'a str], selected: usize, theme: &'a Theme) -> Self {
        MenuBar {
            titles,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let titles = self
            .titles
            .iter()
            .enumerate()
            .map(|(idx, title)| format!("F{} {title}", idx + 2));

        let tabs = Tabs::new(titles)
            .select(self.selected)
            .block(
                Block::default()
                    .title(" expense-tui ")
                    .title_style(self.theme.title_style())
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style()),
            )
            .style(self.theme.surface_style())
            .highlight_style(self.theme.highlight_style())
            .divider("|");

        frame.render_widget(tabs, area);
    }
}

/// Add-expense form panel
pub struct ExpenseFormPanel<'a> {
    form: &'a FormState,
    today: NaiveDate,
    theme: &'a Theme,
}

impl<'a> ExpenseFormPanel<'a> {
    pub fn new(form: &'a FormState, today: NaiveDate, theme: &'a Theme) -> Self {
        ExpenseFormPanel { form, today, theme }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label_width = 14;
        let mut lines: Vec<Line> = vec![Line::from("")];
        let mut cursor = None;

        for field in FormField::ALL {
            let focused = self.form.focused() == field;
            let edit = self.form.field(field);
            let label_style = if focused {
                self.theme.focused_border_style()
            } else {
                self.theme.title_style()
            };

            let mut spans = vec![
                Span::raw("  "),
                Span::styled(format!("{:<12}", field.label()), label_style),
                Span::styled(edit.value().to_string(), self.theme.surface_style()),
            ];
            if edit.value().is_empty() {
                let hint = match field {
                    FormField::Date => format!("{DATE_HINT}, up to {}", self.today),
                    FormField::Amount => "0.00".to_string(),
                    FormField::Description => "what was it for?".to_string(),
                };
                spans.push(Span::styled(hint, self.theme.muted_style()));
            }

            if focused {
                // Block border + blank first line
                let row = area.y + 1 + lines.len() as u16;
                let col = area.x + 1 + label_width + edit.cursor() as u16;
                cursor = Some((col, row));
            }

            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            "  Enter: add expense   Tab/↑/↓: next field",
            self.theme.muted_style(),
        )));

        let paragraph =
            Paragraph::new(lines).block(panel(" Add Expense ".to_string(), true, self.theme));
        frame.render_widget(paragraph, area);

        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }
}

/// Date-sorted ledger of every expense with check boxes
pub struct LedgerTable<'a> {
    records: &'a [ExpenseRecord],
    selected: usize,
    marked: &'a SelectionState,
    theme: &'a Theme,
}

impl<'a> LedgerTable<'a> {
    pub fn new(
        records: &'a [ExpenseRecord],
        selected: usize,
        marked: &'a SelectionState,
        theme: &'a Theme,
    ) -> Self {
        LedgerTable {
            records,
            selected,
            marked,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel(format!(" Summary ({}) ", self.records.len()), true, self.theme);

        if self.records.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "  No expenses yet. Press F2 to add one.",
                self.theme.muted_style(),
            ))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(["", "Date", "Amount", "Description"])
            .style(self.theme.title_style())
            .bottom_margin(1);

        let rows = self.records.iter().map(|record| {
            let checked = self.marked.is_marked(&record.id);
            let check = if checked {
                Cell::from("[x]").style(self.theme.checked_style())
            } else {
                Cell::from("[ ]")
            };
            Row::new([
                check,
                Cell::from(record.display_date()),
                Cell::from(Line::from(record.display_amount()).right_aligned()),
                Cell::from(record.description.clone()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(self.theme.highlight_style())
        .highlight_symbol("> ");

        let mut state = TableState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

/// Per-day totals table
pub struct SummaryTable<'a> {
    summary: &'a DailySummary,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> SummaryTable<'a> {
    pub fn new(summary: &'a DailySummary, title: &'a str, theme: &'a Theme) -> Self {
        SummaryTable {
            summary,
            title,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel(format!(" {} ", self.title), true, self.theme);

        let header = Row::new(["Date", "Total"])
            .style(self.theme.title_style())
            .bottom_margin(1);

        let rows = self.summary.iter().map(|total| {
            Row::new([
                Cell::from(total.date_label.clone()),
                Cell::from(Line::from(total.display_total()).right_aligned()),
            ])
        });

        let table = Table::new(rows, [Constraint::Length(10), Constraint::Length(14)])
            .header(header)
            .block(block)
            .column_spacing(2);

        frame.render_widget(table, area);
    }
}

/// Status bar: the active notice, otherwise key hints for the view
pub struct StatusBar<'a> {
    notice: Option<&'a Notice>,
    hints: &'a str,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(notice: Option<&'a Notice>, hints: &'a str, theme: &'a Theme) -> Self {
        StatusBar {
            notice,
            hints,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = match self.notice {
            Some(notice) => Line::from(Span::styled(
                notice.text.clone(),
                self.theme.notice_style(notice.kind),
            )),
            None => Line::from(Span::styled(self.hints, self.theme.muted_style())),
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(self.theme.border_style()),
        );

        frame.render_widget(paragraph, area);
    }
}
