use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

use crate::models::{AdminBlock, Priority};
use crate::state::{AppState, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// Field of the add form that receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Priority,
    Category,
    Block,
    Due,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Priority,
        FormField::Category,
        FormField::Block,
        FormField::Due,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Task",
            FormField::Priority => "Priority",
            FormField::Category => "Category",
            FormField::Block => "Admin Block",
            FormField::Due => "Due Date",
            FormField::Notes => "Notes",
        }
    }

    fn index(self) -> usize {
        FormField::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> FormField {
        FormField::ALL[(self.index() + 1) % FormField::ALL.len()]
    }

    fn previous(self) -> FormField {
        let len = FormField::ALL.len();
        FormField::ALL[(self.index() + len - 1) % len]
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Send(Request),
}

impl From<Option<Request>> for Action {
    fn from(request: Option<Request>) -> Self {
        request.map_or(Action::None, Action::Send)
    }
}

pub struct App {
    pub state: AppState,
    /// Selection within the filtered view.
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub form_field: FormField,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> App {
        App {
            state: AppState::new(),
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            form_field: FormField::Name,
        }
    }

    /// Keeps the selection inside the filtered view after the list changes.
    pub fn clamp_selection(&mut self) {
        let len = self.state.visible_tasks().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(i) if i >= len => self.table_state.select(Some(len - 1)),
                Some(_) => {}
                None => self.table_state.select(Some(0)),
            }
        }
    }

    pub fn next(&mut self) {
        let len = self.state.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.state.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_id(&self) -> Option<u64> {
        let i = self.table_state.selected()?;
        self.state.visible_tasks().get(i).map(|t| t.id)
    }

    pub fn refresh(&mut self) -> Option<Request> {
        if self.state.is_busy() {
            return None;
        }
        self.state.begin_reload()
    }

    pub fn toggle_selected(&mut self) -> Option<Request> {
        if self.state.is_busy() {
            return None;
        }
        let id = self.selected_id()?;
        self.state.begin_toggle(id)
    }

    pub fn delete_selected(&mut self) -> Option<Request> {
        if self.state.is_busy() {
            return None;
        }
        let id = self.selected_id()?;
        self.state.begin_delete(id)
    }

    pub fn cycle_status_filter(&mut self) {
        self.state.status_filter = self.state.status_filter.next();
        self.clamp_selection();
    }

    pub fn cycle_block_filter(&mut self) {
        self.state.block_filter = self.state.block_filter.next();
        self.clamp_selection();
    }

    /// Opens the add form with the draft left as it was.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.form_field = FormField::Name;
    }

    /// Submits the draft. The form closes once a request is issued; a blank
    /// name keeps it open.
    fn submit(&mut self) -> Option<Request> {
        if self.state.is_busy() {
            return None;
        }
        let request = self.state.begin_create();
        // Not busy, so a named draft without a request failed validation
        // and now has its error on screen.
        if request.is_some() || !self.state.draft.name.trim().is_empty() {
            self.input_mode = InputMode::Normal;
        }
        request
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key.code),
            InputMode::Adding => self.handle_form_key(key.code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char(' ') => return self.toggle_selected().into(),
            KeyCode::Char('d') | KeyCode::Delete => return self.delete_selected().into(),
            KeyCode::Char('r') => return self.refresh().into(),
            KeyCode::Char('a') => self.start_add(),
            KeyCode::Char('f') => self.cycle_status_filter(),
            KeyCode::Char('b') => self.cycle_block_filter(),
            KeyCode::Esc => self.state.dismiss_error(),
            _ => {}
        }
        Action::None
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter => return self.submit().into(),
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::Down => self.form_field = self.form_field.next(),
            KeyCode::BackTab | KeyCode::Up => self.form_field = self.form_field.previous(),
            KeyCode::Left => self.cycle_choice(false),
            KeyCode::Right => self.cycle_choice(true),
            KeyCode::Char(c) => {
                if let Some(buf) = self.focused_text() {
                    buf.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.focused_text() {
                    buf.pop();
                }
            }
            _ => {}
        }
        Action::None
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        let draft = &mut self.state.draft;
        match self.form_field {
            FormField::Name => Some(&mut draft.name),
            FormField::Category => Some(&mut draft.category),
            FormField::Due => Some(&mut draft.due_date),
            FormField::Notes => Some(&mut draft.notes),
            FormField::Priority | FormField::Block => None,
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        let draft = &mut self.state.draft;
        match self.form_field {
            FormField::Priority => draft.priority = step(&Priority::ALL, draft.priority, forward),
            FormField::Block => draft.admin_block = step(&AdminBlock::ALL, draft.admin_block, forward),
            _ => {}
        }
    }
}

fn step<T: Copy + PartialEq>(choices: &[T], current: T, forward: bool) -> T {
    let len = choices.len();
    let i = choices.iter().position(|c| *c == current).unwrap_or(0);
    let j = if forward { (i + 1) % len } else { (i + len - 1) % len };
    choices[j]
}
