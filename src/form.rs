//! Editable state of the add-expense form.

use crate::data::ExpenseInput;

/// Form field with keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Amount,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Date, FormField::Amount, FormField::Description];

    pub fn next(self) -> Self {
        match self {
            FormField::Date => FormField::Amount,
            FormField::Amount => FormField::Description,
            FormField::Description => FormField::Date,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Date => FormField::Description,
            FormField::Amount => FormField::Date,
            FormField::Description => FormField::Amount,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Date => "Date",
            FormField::Amount => "Amount",
            FormField::Description => "Description",
        }
    }
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEdit {
    value: String,
    /// Cursor position in chars, 0..=char count
    cursor: usize,
}

impl LineEdit {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// The three inputs of the add-expense form plus focus
#[derive(Debug, Clone)]
pub struct FormState {
    date: LineEdit,
    amount: LineEdit,
    description: LineEdit,
    focused: FormField,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            date: LineEdit::default(),
            amount: LineEdit::default(),
            description: LineEdit::default(),
            focused: FormField::Date,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }

    pub fn field(&self, field: FormField) -> &LineEdit {
        match field {
            FormField::Date => &self.date,
            FormField::Amount => &self.amount,
            FormField::Description => &self.description,
        }
    }

    /// Input under the cursor
    pub fn current_mut(&mut self) -> &mut LineEdit {
        match self.focused {
            FormField::Date => &mut self.date,
            FormField::Amount => &mut self.amount,
            FormField::Description => &mut self.description,
        }
    }

    /// Raw values for submission
    pub fn to_input(&self) -> ExpenseInput {
        ExpenseInput::new(
            self.date.value(),
            self.amount.value(),
            self.description.value(),
        )
    }

    /// Reset every field and return focus to the date
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
