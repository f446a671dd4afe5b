//! Main application logic for the terminal user interface.
//!
//! `App` borrows the session for the lifetime of the UI, routes key events to
//! the current page, overlay or modal, and renders every screen. Completing a
//! task is deferred by the configured delay so the row can show that it is
//! being completed; reopening one applies at once.

use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::fields::*;
use crate::session::Session;
use crate::settings::{NotificationToggle, PrivacyToggle, ReminderSlot, ReminderToggle};
use crate::social::{Channel, DiscoverTab, MessageKind};
use crate::store::{category_breakdown, completed_count, truncate};
use crate::task::{parse_reminder, Task};
use crate::tui::{
    colors::{category_color, intensity_color, priority_color, AMBER, CINNABAR, DEEP_TEAL, JADE, SLATE},
    enums::{AppState, GuideTab, InputMode, MessagesTab, TextTarget},
    input::InputField,
    task_form::{TaskForm, CATEGORY_ORDER, PRIORITY_ORDER, REMINDER_ORDER, REPEAT_ORDER, TITLE_ORDER},
    utils::centered_rect,
};

/// A completion waiting out its delay.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingCompletion {
    id: u64,
    due: Instant,
}

/// How long the title frame stays up unless a key is pressed.
const SPLASH_DURATION: Duration = Duration::from_millis(1500);

/// Editable rows of the user center, in display order.
const PROFILE_FIELDS: [&str; 4] = ["Name", "Title", "Email", "Location"];

/// One row of a settings screen.
#[derive(Clone, Copy, Debug, PartialEq)]
enum SettingsRow {
    ProfileVisibility,
    TaskVisibility,
    Privacy(PrivacyToggle),
    Slot(ReminderSlot),
    Reminder(ReminderToggle),
    Notify(NotificationToggle),
    InAppOnly,
}

fn settings_rows(page: SettingsPage) -> Vec<SettingsRow> {
    match page {
        SettingsPage::Privacy => {
            let mut rows = vec![SettingsRow::ProfileVisibility];
            rows.extend(PrivacyToggle::ALL.iter().map(|&k| SettingsRow::Privacy(k)));
            rows.push(SettingsRow::TaskVisibility);
            rows
        }
        SettingsPage::Reminder => ReminderSlot::ALL
            .iter()
            .map(|&s| SettingsRow::Slot(s))
            .chain(ReminderToggle::ALL.iter().map(|&k| SettingsRow::Reminder(k)))
            .collect(),
        SettingsPage::Notification => NotificationToggle::ALL
            .iter()
            .map(|&k| SettingsRow::Notify(k))
            .chain(std::iter::once(SettingsRow::InAppOnly))
            .collect(),
    }
}

/// Main application state for the terminal user interface.
pub struct App<'a> {
    session: &'a mut Session,
    state: AppState,
    input_mode: InputMode,
    status_message: String,
    completion_delay: Duration,
    pending: Vec<PendingCompletion>,
    // Home
    home_selected: usize,
    home_table: TableState,
    show_completed: bool,
    task_form: TaskForm,
    // Friends
    friend_selected: usize,
    friend_table: TableState,
    // Messages
    messages_tab: MessagesTab,
    conversation_selected: usize,
    conversation_table: TableState,
    message_input: InputField,
    // User center and settings
    user_center_selected: usize,
    settings_selected: usize,
    edit_input: InputField,
    // Add friend
    discover_tab: DiscoverTab,
    discover_selected: usize,
    discover_table: TableState,
    search_input: InputField,
    // Guide
    guide_tab: GuideTab,
}

impl<'a> App<'a> {
    pub fn new(session: &'a mut Session, completion_delay: Duration) -> Self {
        App {
            session,
            state: AppState::Browse,
            input_mode: InputMode::None,
            status_message: String::new(),
            completion_delay,
            pending: Vec::new(),
            home_selected: 0,
            home_table: TableState::default(),
            show_completed: false,
            task_form: TaskForm::new(),
            friend_selected: 0,
            friend_table: TableState::default(),
            messages_tab: MessagesTab::Public,
            conversation_selected: 0,
            conversation_table: TableState::default(),
            message_input: InputField::new(),
            user_center_selected: 0,
            settings_selected: 0,
            edit_input: InputField::new(),
            discover_tab: DiscoverTab::Recommended,
            discover_selected: 0,
            discover_table: TableState::default(),
            search_input: InputField::new(),
            guide_tab: GuideTab::Path,
        }
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    // ----- Home -------------------------------------------------------------

    /// Ids of today's rows in display order: pending first, then completed
    /// when the section is expanded.
    fn visible_rows(&self) -> Vec<u64> {
        let today = self.session.store().today_tasks();
        let mut ids: Vec<u64> = today.iter().filter(|t| !t.completed).map(|t| t.id).collect();
        if self.show_completed {
            ids.extend(today.iter().filter(|t| t.completed).map(|t| t.id));
        }
        ids
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.visible_rows().get(self.home_selected).copied()
    }

    fn clamp_home_selection(&mut self) {
        let len = self.visible_rows().len();
        if self.home_selected >= len {
            self.home_selected = len.saturating_sub(1);
        }
    }

    fn is_completing(&self, id: u64) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Toggle `id`. Completing waits for the delay; reopening is immediate. A
    /// second toggle while a completion is pending cancels it.
    fn toggle_task(&mut self, id: u64, now: Instant) {
        if let Some(pos) = self.pending.iter().position(|p| p.id == id) {
            self.pending.remove(pos);
            self.set_status_message("Completion cancelled");
            return;
        }
        let Some(task) = self.session.store().get(id) else {
            return;
        };
        if task.completed || self.completion_delay.is_zero() {
            self.apply_toggle(id);
        } else {
            debug!(id, delay_ms = self.completion_delay.as_millis() as u64, "completion scheduled");
            self.pending.push(PendingCompletion {
                id,
                due: now + self.completion_delay,
            });
        }
    }

    fn apply_toggle(&mut self, id: u64) {
        let Some(outcome) = self.session.store_mut().toggle_completion(id) else {
            return;
        };
        let title = self
            .session
            .store()
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        if outcome.completed {
            self.set_status_message(format!("{title} complete · +{} 灵力", outcome.exp_awarded));
        } else {
            self.set_status_message(format!("{title} reopened"));
        }
        self.clamp_home_selection();
    }

    /// Apply every pending completion whose delay has elapsed by `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.pending.is_empty() {
            return;
        }
        let (due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        for p in due {
            let still_open = self.session.store().get(p.id).is_some_and(|t| !t.completed);
            if still_open {
                self.apply_toggle(p.id);
            }
        }
    }

    fn delete_task(&mut self, id: u64) {
        self.pending.retain(|p| p.id != id);
        if let Some(task) = self.session.store_mut().delete_task(id) {
            self.set_status_message(format!("Deleted: {}", task.title));
        }
        self.clamp_home_selection();
    }

    fn submit_task_form(&mut self) {
        if !self.task_form.can_submit() {
            self.set_status_message("Title is required");
            return;
        }
        match self.task_form.to_new_task() {
            Ok(new) => {
                if let Some(id) = self.session.store_mut().add_task(new) {
                    self.set_status_message(format!("Vow taken · task {id} added"));
                }
                self.task_form = TaskForm::new();
                self.session.close_overlay();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let len = self.visible_rows().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if len > 0 {
                    self.home_selected = (self.home_selected + 1).min(len - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.home_selected = self.home_selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(id) = self.selected_task_id() {
                    self.toggle_task(id, Instant::now());
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.state = AppState::ConfirmDelete(id);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.task_form = TaskForm::new();
                self.session.open_overlay(Overlay::CreateTask);
            }
            KeyCode::Char('t') => {
                self.show_completed = !self.show_completed;
                self.clamp_home_selection();
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, id: u64, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.delete_task(id);
                self.state = AppState::Browse;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Browse;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.session.close_overlay(),
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    // ----- Friends and messages --------------------------------------------

    fn handle_friends_key(&mut self, key: KeyEvent) {
        let len = self.session.social.ranked_friends().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if len > 0 {
                    self.friend_selected = (self.friend_selected + 1).min(len - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.friend_selected = self.friend_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                let id = self
                    .session
                    .social
                    .ranked_friends()
                    .get(self.friend_selected)
                    .map(|f| f.id.clone());
                if let Some(id) = id {
                    if self.session.start_chat(&id) {
                        self.messages_tab = MessagesTab::Private;
                    }
                }
            }
            KeyCode::Char('a') => {
                self.discover_selected = 0;
                self.session.open_overlay(Overlay::AddFriend);
            }
            _ => {}
        }
    }

    fn handle_messages_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char('p') => {
                self.messages_tab = match self.messages_tab {
                    MessagesTab::Public => MessagesTab::Private,
                    MessagesTab::Private => MessagesTab::Public,
                };
            }
            KeyCode::Char('i') => {
                let can_type = self.messages_tab == MessagesTab::Public
                    || self.session.selected_friend().is_some();
                if can_type {
                    self.input_mode = InputMode::Text(TextTarget::Message);
                }
            }
            KeyCode::Esc | KeyCode::Backspace if self.messages_tab == MessagesTab::Private => {
                self.session.leave_chat();
            }
            KeyCode::Down | KeyCode::Char('j') if self.showing_conversation_list() => {
                let len = self.session.social.conversations().len();
                if len > 0 {
                    self.conversation_selected = (self.conversation_selected + 1).min(len - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') if self.showing_conversation_list() => {
                self.conversation_selected = self.conversation_selected.saturating_sub(1);
            }
            KeyCode::Enter if self.showing_conversation_list() => {
                let id = self
                    .session
                    .social
                    .conversations()
                    .get(self.conversation_selected)
                    .map(|c| c.friend_id.clone());
                if let Some(id) = id {
                    self.session.start_chat(&id);
                }
            }
            _ => {}
        }
    }

    fn showing_conversation_list(&self) -> bool {
        self.messages_tab == MessagesTab::Private && self.session.selected_friend().is_none()
    }

    fn send_message(&mut self) {
        let channel = match (self.messages_tab, self.session.selected_friend()) {
            (MessagesTab::Public, _) => Channel::Public,
            (MessagesTab::Private, Some(id)) => Channel::Friend(id.to_string()),
            (MessagesTab::Private, None) => return,
        };
        let content = self.message_input.take();
        let time = Local::now().format("%H:%M").to_string();
        if !self.session.social.send_message(&channel, &content, &time) {
            self.set_status_message("Nothing to send");
        }
    }

    // ----- User center, settings, add friend, guide -------------------------

    fn profile_value(&self, idx: usize) -> &str {
        let p = &self.session.settings.profile;
        match idx {
            0 => &p.name,
            1 => &p.title,
            2 => &p.email,
            _ => &p.location,
        }
    }

    fn set_profile_value(&mut self, idx: usize, value: String) {
        let p = &mut self.session.settings.profile;
        match idx {
            0 => p.name = value,
            1 => p.title = value,
            2 => p.email = value,
            _ => p.location = value,
        }
    }

    fn handle_user_center_key(&mut self, key: KeyEvent) {
        let rows = PROFILE_FIELDS.len() + SettingsPage::ALL.len();
        match key.code {
            KeyCode::Esc => self.session.close_overlay(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.user_center_selected = (self.user_center_selected + 1).min(rows - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.user_center_selected = self.user_center_selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                let idx = self.user_center_selected;
                if idx < PROFILE_FIELDS.len() {
                    self.edit_input = InputField::with_value(self.profile_value(idx));
                    self.input_mode = InputMode::Text(TextTarget::ProfileField(idx));
                } else if let Some(&page) = SettingsPage::ALL.get(idx - PROFILE_FIELDS.len()) {
                    self.settings_selected = 0;
                    self.session.open_overlay(Overlay::Settings(page));
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, page: SettingsPage, key: KeyEvent) {
        let rows = settings_rows(page);
        match key.code {
            KeyCode::Esc => self.session.open_overlay(Overlay::UserCenter),
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_selected = (self.settings_selected + 1).min(rows.len() - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_selected = self.settings_selected.saturating_sub(1);
            }
            KeyCode::Char('e') => {
                if let Some(SettingsRow::Slot(slot)) = rows.get(self.settings_selected).copied() {
                    let current = self.session.settings.reminder.slot_time(slot);
                    self.edit_input = InputField::with_value(&current.format("%H:%M").to_string());
                    self.input_mode = InputMode::Text(TextTarget::ReminderTime(slot));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                if let Some(row) = rows.get(self.settings_selected).copied() {
                    self.activate_settings_row(row);
                }
            }
            _ => {}
        }
    }

    fn activate_settings_row(&mut self, row: SettingsRow) {
        let s = &mut self.session.settings;
        match row {
            SettingsRow::ProfileVisibility => {
                s.privacy.profile_visibility = s.privacy.profile_visibility.next();
            }
            SettingsRow::TaskVisibility => {
                s.privacy.task_visibility = s.privacy.task_visibility.next();
            }
            SettingsRow::Privacy(k) => {
                s.privacy.toggle(k);
            }
            SettingsRow::Slot(slot) => {
                s.reminder.toggle_slot(slot);
            }
            SettingsRow::Reminder(k) => {
                s.reminder.toggle(k);
            }
            SettingsRow::Notify(k) => {
                s.notification.toggle(k);
            }
            SettingsRow::InAppOnly => {
                s.notification.in_app_only = !s.notification.in_app_only;
            }
        }
    }

    fn discover_len(&self) -> usize {
        self.session
            .social
            .discover(self.discover_tab, &self.search_input.value)
            .len()
    }

    fn handle_add_friend_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.session.close_overlay(),
            KeyCode::Left | KeyCode::Right => {
                let idx = DiscoverTab::ALL.iter().position(|t| *t == self.discover_tab).unwrap_or(0);
                let n = DiscoverTab::ALL.len();
                let next = if key.code == KeyCode::Right { (idx + 1) % n } else { (idx + n - 1) % n };
                self.discover_tab = DiscoverTab::ALL[next];
                self.discover_selected = 0;
            }
            KeyCode::Char('/') => {
                self.discover_tab = DiscoverTab::Search;
                self.discover_selected = 0;
                self.input_mode = InputMode::Text(TextTarget::Search);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.discover_len();
                if len > 0 {
                    self.discover_selected = (self.discover_selected + 1).min(len - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.discover_selected = self.discover_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                let target = self
                    .session
                    .social
                    .discover(self.discover_tab, &self.search_input.value)
                    .get(self.discover_selected)
                    .map(|s| (s.id.clone(), s.name.clone()));
                if let Some((id, name)) = target {
                    if self.session.social.send_request(&id) {
                        self.set_status_message(format!("Request sent to {name}"));
                    } else {
                        self.set_status_message(format!("Already asked {name}"));
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_guide_key(&mut self, key: KeyEvent) {
        let idx = GuideTab::ALL.iter().position(|t| *t == self.guide_tab).unwrap_or(0);
        let n = GuideTab::ALL.len();
        match key.code {
            KeyCode::Left => self.guide_tab = GuideTab::ALL[(idx + n - 1) % n],
            KeyCode::Right | KeyCode::Tab => self.guide_tab = GuideTab::ALL[(idx + 1) % n],
            _ => self.session.close_overlay(),
        }
    }

    // ----- Text entry ------------------------------------------------------

    fn text_field_mut(&mut self, target: TextTarget) -> &mut InputField {
        match target {
            TextTarget::Message => &mut self.message_input,
            TextTarget::Search => &mut self.search_input,
            TextTarget::ProfileField(_) | TextTarget::ReminderTime(_) => &mut self.edit_input,
        }
    }

    fn handle_text_key(&mut self, target: TextTarget, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::None,
            KeyCode::Enter => self.commit_text(target),
            KeyCode::Backspace => self.text_field_mut(target).handle_backspace(),
            KeyCode::Delete => self.text_field_mut(target).handle_delete(),
            KeyCode::Left => self.text_field_mut(target).move_cursor_left(),
            KeyCode::Right => self.text_field_mut(target).move_cursor_right(),
            KeyCode::Char(c) => {
                self.text_field_mut(target).handle_char(c);
                if target == TextTarget::Search {
                    self.discover_selected = 0;
                }
            }
            _ => {}
        }
    }

    fn commit_text(&mut self, target: TextTarget) {
        match target {
            TextTarget::Message => self.send_message(),
            TextTarget::Search => self.input_mode = InputMode::None,
            TextTarget::ProfileField(idx) => {
                let value = self.edit_input.take().trim().to_string();
                if value.is_empty() {
                    self.set_status_message(format!("{} cannot be empty", PROFILE_FIELDS[idx]));
                } else {
                    self.set_profile_value(idx, value);
                    self.set_status_message("Profile saved");
                }
                self.input_mode = InputMode::None;
            }
            TextTarget::ReminderTime(slot) => match parse_reminder(&self.edit_input.value) {
                Ok(Some(time)) => {
                    self.session.settings.reminder.set_slot_time(slot, time);
                    self.input_mode = InputMode::None;
                }
                Ok(None) => self.input_mode = InputMode::None,
                Err(e) => self.set_status_message(e.to_string()),
            },
        }
    }

    // ----- Dispatch --------------------------------------------------------

    /// Route one key press. Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.clear_status_message();

        if let AppState::ConfirmDelete(id) = self.state {
            self.handle_confirm_key(id, key);
            return false;
        }
        if let InputMode::Text(target) = self.input_mode {
            self.handle_text_key(target, key);
            return false;
        }
        if let Some(overlay) = self.session.overlay() {
            match overlay {
                Overlay::CreateTask => self.handle_form_key(key),
                Overlay::UserCenter => self.handle_user_center_key(key),
                Overlay::Settings(page) => self.handle_settings_key(page, key),
                Overlay::AddFriend => self.handle_add_friend_key(key),
                Overlay::Guide => self.handle_guide_key(key),
            }
            return false;
        }

        let page = self.session.page();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc if !(page == Page::Messages && self.session.selected_friend().is_some()) => {
                return true
            }
            KeyCode::Tab => self.switch_page(Page::TABS[(page.index() + 1) % Page::TABS.len()]),
            KeyCode::BackTab => {
                let n = Page::TABS.len();
                self.switch_page(Page::TABS[(page.index() + n - 1) % n]);
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.switch_page(Page::TABS[idx]);
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.guide_tab = GuideTab::Path;
                self.session.open_overlay(Overlay::Guide);
            }
            KeyCode::Char('u') => {
                self.user_center_selected = 0;
                self.session.open_overlay(Overlay::UserCenter);
            }
            _ => match page {
                Page::Home => self.handle_home_key(key),
                Page::Friends => self.handle_friends_key(key),
                Page::Messages => self.handle_messages_key(key),
                Page::Profile if key.code == KeyCode::Enter => {
                    self.session.open_overlay(Overlay::UserCenter);
                }
                Page::Calendar | Page::Profile => {}
            },
        }
        false
    }

    fn switch_page(&mut self, page: Page) {
        self.session.navigate(page);
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    // ----- Rendering -------------------------------------------------------

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Page::TABS
            .iter()
            .enumerate()
            .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.label())))
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(JADE))
                    .title(Span::styled(
                        " 修仙录 CULTIVATE ",
                        Style::default().fg(AMBER).add_modifier(Modifier::BOLD),
                    )),
            )
            .select(self.session.page().index())
            .highlight_style(Style::default().fg(Color::Black).bg(JADE).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_home(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // realm header
                Constraint::Length(3), // exp gauge
                Constraint::Length(3), // category breakdown
                Constraint::Min(0),    // task table
            ])
            .split(area);

        let progression = self.session.store().progression().clone();
        let profile = &self.session.settings.profile;
        let header = Paragraph::new(Line::from(vec![
            Span::raw(format!("{} ", profile.avatar)),
            Span::styled(profile.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} · Level {}", progression.title(), progression.level),
                Style::default().fg(JADE).add_modifier(Modifier::ITALIC),
            ),
            Span::raw("  "),
            Span::styled(
                self.session.store().today().format("%Y-%m-%d").to_string(),
                Style::default().fg(SLATE),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Today's Practice"))
        .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("灵力 Spiritual Exp"))
            .gauge_style(Style::default().fg(AMBER).bg(DEEP_TEAL))
            .ratio(progression.display_ratio())
            .label(format!(
                "{}/{} ({:.1}%)",
                progression.exp,
                progression.next_level_exp,
                progression.progress_ratio() * 100.0
            ));
        f.render_widget(gauge, chunks[1]);

        let today = self.session.store().today_tasks();
        let breakdown: Vec<Span> = category_breakdown(&today)
            .into_iter()
            .flat_map(|s| {
                [
                    Span::styled(
                        format!("{} ", s.category.themed_name()),
                        Style::default().fg(category_color(s.category)),
                    ),
                    Span::raw(format!("{}/{}   ", s.completed, s.count)),
                ]
            })
            .collect();
        let breakdown = Paragraph::new(Line::from(breakdown))
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Progress {}/{}",
                completed_count(&today),
                today.len()
            )))
            .alignment(Alignment::Center);
        f.render_widget(breakdown, chunks[2]);

        if today.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from("No practice today."),
                Line::from("Press 'a' to take a vow (立誓) and begin."),
            ])
            .style(Style::default().fg(SLATE))
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .alignment(Alignment::Center);
            f.render_widget(empty, chunks[3]);
            return;
        }

        let pending: Vec<&Task> = today.iter().copied().filter(|t| !t.completed).collect();
        let done: Vec<&Task> = today.iter().copied().filter(|t| t.completed).collect();

        let mut rows: Vec<Row> = pending.iter().map(|t| self.task_row(t)).collect();
        let separator = format!(
            "{} Completed ({}) · t to {}",
            if self.show_completed { "▾" } else { "▸" },
            done.len(),
            if self.show_completed { "collapse" } else { "expand" }
        );
        rows.push(
            Row::new(vec![Cell::from(""), Cell::from(""), Cell::from(separator)])
                .style(Style::default().fg(SLATE).add_modifier(Modifier::ITALIC)),
        );
        if self.show_completed {
            rows.extend(done.iter().map(|t| self.task_row(t)));
        }

        // The separator occupies one row between the two sections.
        let table_index = if self.home_selected < pending.len() {
            self.home_selected
        } else {
            self.home_selected + 1
        };
        self.home_table.select(Some(table_index));

        let widths = [
            Constraint::Length(12), // state
            Constraint::Length(4),  // runes
            Constraint::Min(20),    // title
            Constraint::Length(10), // category
            Constraint::Length(6),  // reminder
            Constraint::Length(6),  // repeat
        ];
        let header = Row::new(["State", "Rune", "Title", "Type", "Time", "Daily"])
            .style(Style::default().bg(JADE).fg(Color::Black).add_modifier(Modifier::BOLD));
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Tasks - a: vow  space: complete  d: delete  ?: guide"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[3], &mut self.home_table);
    }

    fn task_row(&self, t: &Task) -> Row<'static> {
        let (state, style) = if self.is_completing(t.id) {
            ("completing…", Style::default().fg(AMBER).add_modifier(Modifier::ITALIC))
        } else if t.completed {
            ("done", Style::default().fg(SLATE).add_modifier(Modifier::CROSSED_OUT))
        } else {
            ("open", Style::default().fg(Color::White))
        };
        Row::new(vec![
            Cell::from(state),
            Cell::from(t.priority.runes()).style(Style::default().fg(priority_color(t.priority))),
            Cell::from(t.title.clone()),
            Cell::from(t.category.themed_name()).style(Style::default().fg(category_color(t.category))),
            Cell::from(t.reminder_label()),
            Cell::from(if t.repeats() { "↻" } else { "" }),
        ])
        .style(style)
    }

    fn render_calendar(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(5)])
            .split(area);

        let history = self.session.history();
        let today_done = self.session.today_completed();
        let rows: Vec<Row> = history
            .month_grid(today_done)
            .into_iter()
            .map(|week| {
                let cells: Vec<Cell> = week
                    .iter()
                    .map(|cell| match cell {
                        Some(c) => {
                            let mut style = Style::default().bg(intensity_color(c.intensity));
                            if c.is_today {
                                style = style.fg(AMBER).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                            }
                            let marker = if c.is_today { "*" } else { " " };
                            Cell::from(format!("{:>3}{} {}", c.day, marker, c.completed)).style(style)
                        }
                        None => Cell::from(""),
                    })
                    .collect();
                Row::new(cells).height(2)
            })
            .collect();
        let header = Row::new(["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"])
            .style(Style::default().fg(JADE).add_modifier(Modifier::BOLD));
        let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
            .header(header)
            .column_spacing(1)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "宗门卷轴 · {}",
                history.today().format("%Y-%m")
            )));
        f.render_widget(table, chunks[0]);

        let summary = self.session.month_summary();
        let text = vec![
            Line::from(vec![
                Span::styled("Completed ", Style::default().fg(SLATE)),
                Span::styled(summary.total_completed.to_string(), Style::default().fg(AMBER)),
                Span::styled("   Streak ", Style::default().fg(SLATE)),
                Span::styled(format!("{} days", summary.streak_days), Style::default().fg(AMBER)),
                Span::styled("   Best day ", Style::default().fg(SLATE)),
                Span::styled(summary.best_day.to_string(), Style::default().fg(AMBER)),
            ]),
            Line::from(vec![
                Span::raw("Legend: "),
                Span::styled(" 0 ", Style::default().bg(intensity_color(crate::calendar::Intensity::None))),
                Span::styled(" 1-2 ", Style::default().bg(intensity_color(crate::calendar::Intensity::Low))),
                Span::styled(" 3-4 ", Style::default().bg(intensity_color(crate::calendar::Intensity::Medium))),
                Span::styled(" 5+ ", Style::default().bg(intensity_color(crate::calendar::Intensity::High))),
            ]),
        ];
        let summary = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("This Month"))
            .alignment(Alignment::Center);
        f.render_widget(summary, chunks[1]);
    }

    fn render_friends(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .session
            .social
            .ranked_friends()
            .iter()
            .enumerate()
            .map(|(i, fr)| {
                let place = match i {
                    0 => "🥇".to_string(),
                    1 => "🥈".to_string(),
                    2 => "🥉".to_string(),
                    _ => format!("{}", i + 1),
                };
                Row::new(vec![
                    Cell::from(place),
                    Cell::from(format!("{} {}", fr.avatar, fr.name)),
                    Cell::from(fr.title.clone()),
                    Cell::from(format!("{}{}", fr.rank, fr.stage)),
                    Cell::from(fr.level.to_string()),
                    Cell::from(fr.spirit.to_string()).style(Style::default().fg(AMBER)),
                ])
            })
            .collect();
        self.friend_table.select(Some(self.friend_selected));
        let header = Row::new(["#", "Name", "Title", "Realm", "Lv", "Spirit"])
            .style(Style::default().bg(JADE).fg(Color::Black).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(4),
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(4),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Fellow Cultivators - Enter: chat  a: add friend"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.friend_table);
    }

    fn render_messages(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let tab_idx = match self.messages_tab {
            MessagesTab::Public => 0,
            MessagesTab::Private => 1,
        };
        let tabs = Tabs::new(vec!["Public Square", "Private"])
            .block(Block::default().borders(Borders::ALL).title("Messages - p: switch  i: write"))
            .select(tab_idx)
            .highlight_style(Style::default().fg(AMBER).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        if self.showing_conversation_list() {
            self.render_conversations(f, chunks[1]);
        } else {
            let (title, lines) = match (self.messages_tab, self.session.selected_friend()) {
                (MessagesTab::Private, Some(id)) => {
                    let name = self
                        .session
                        .social
                        .friend(id)
                        .map(|fr| format!("{} {}", fr.avatar, fr.name))
                        .unwrap_or_default();
                    (format!("Chat with {name} - Esc: back"), self.session.social.private_transcript(id))
                }
                _ => ("Public Square".to_string(), self.session.social.public_messages().to_vec()),
            };
            let text: Vec<Line> = lines
                .iter()
                .map(|m| {
                    let style = match m.kind {
                        MessageKind::Sent => Style::default().fg(JADE),
                        MessageKind::Received => Style::default(),
                    };
                    Line::from(vec![
                        Span::styled(format!("{} ", m.time), Style::default().fg(SLATE)),
                        Span::styled(format!("{} {}: ", m.avatar, m.from), style.add_modifier(Modifier::BOLD)),
                        Span::styled(m.content.clone(), style),
                    ])
                })
                .collect();
            let visible = chunks[1].height.saturating_sub(2) as usize;
            let skip = text.len().saturating_sub(visible);
            let body = Paragraph::new(text.into_iter().skip(skip).collect::<Vec<_>>())
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: false });
            f.render_widget(body, chunks[1]);
        }

        let typing = self.input_mode == InputMode::Text(TextTarget::Message);
        let input = Paragraph::new(self.message_input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(if typing { "Write - Enter: send  Esc: stop" } else { "Write (i)" })
                .border_style(if typing { Style::default().fg(AMBER) } else { Style::default() }),
        );
        f.render_widget(input, chunks[2]);
        if typing {
            f.set_cursor_position((
                chunks[2].x + 1 + self.message_input.cursor_column(),
                chunks[2].y + 1,
            ));
        }
    }

    fn render_conversations(&mut self, f: &mut Frame, area: Rect) {
        let social = &self.session.social;
        let rows: Vec<Row> = social
            .conversations()
            .iter()
            .map(|c| {
                let name = social
                    .friend(&c.friend_id)
                    .map(|fr| format!("{} {}", fr.avatar, fr.name))
                    .unwrap_or_else(|| c.friend_id.clone());
                let unread = if c.unread > 0 { format!("({})", c.unread) } else { String::new() };
                Row::new(vec![
                    Cell::from(name),
                    Cell::from(truncate(&c.last_message, 24)),
                    Cell::from(c.time.clone()).style(Style::default().fg(SLATE)),
                    Cell::from(unread).style(Style::default().fg(CINNABAR)),
                ])
            })
            .collect();
        self.conversation_table.select(Some(self.conversation_selected));
        let widths = [
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(4),
        ];
        let table = Table::new(rows, widths)
            .block(Block::default().borders(Borders::ALL).title("Conversations - Enter: open"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.conversation_table);
    }

    fn render_profile(&self, f: &mut Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(cols[0]);

        let p = self.session.store().progression();
        let profile = &self.session.settings.profile;
        let identity = Paragraph::new(vec![
            Line::from(vec![
                Span::raw(format!("{} ", profile.avatar)),
                Span::styled(profile.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" · "),
                Span::styled(profile.title.clone(), Style::default().fg(JADE)),
            ]),
            Line::from(Span::styled(
                format!("{} · Level {}", p.title(), p.level),
                Style::default().fg(AMBER),
            )),
            Line::from(Span::styled(
                format!("{} · joined {}", profile.location, profile.joined),
                Style::default().fg(SLATE),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Cultivator - u: user center"));
        f.render_widget(identity, left[0]);

        let exp = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Exp"))
            .gauge_style(Style::default().fg(AMBER).bg(DEEP_TEAL))
            .ratio(p.display_ratio())
            .label(format!("{}/{}", p.exp, p.next_level_exp));
        f.render_widget(exp, left[1]);

        let roots = [
            ("勤奋灵根 Diligence", p.attributes.diligence),
            ("心法灵根 Wisdom", p.attributes.wisdom),
            ("体修灵根 Body", p.attributes.body),
        ];
        for (i, (label, value)) in roots.iter().enumerate() {
            let g = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(*label))
                .gauge_style(Style::default().fg(JADE))
                .ratio((*value as f64 / 100.0).clamp(0.0, 1.0))
                .label(value.to_string());
            f.render_widget(g, left[2 + i]);
        }

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(cols[1]);
        let stats = self.session.profile_stats();
        let stats = Paragraph::new(vec![
            Line::from(format!("Tasks completed  {}", stats.total_completed)),
            Line::from(format!("Tasks in total   {}", stats.total_tasks)),
            Line::from(format!("Current streak   {} days", stats.streak_days)),
        ])
        .block(Block::default().borders(Borders::ALL).title("Record"));
        f.render_widget(stats, right[0]);

        let ladder: Vec<Line> = p
            .milestones()
            .iter()
            .map(|m| {
                let (mark, style) = if m.current {
                    ("▶", Style::default().fg(AMBER).add_modifier(Modifier::BOLD))
                } else if m.reached {
                    ("✓", Style::default().fg(JADE))
                } else {
                    (" ", Style::default().fg(SLATE))
                };
                Line::from(Span::styled(
                    format!("{mark} L{} {}  {:>6}", m.level, m.name, m.threshold),
                    style,
                ))
            })
            .collect();
        let ladder = Paragraph::new(ladder).block(Block::default().borders(Borders::ALL).title("Realm Ladder"));
        f.render_widget(ladder, right[1]);
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Category
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Reminder
                Constraint::Length(3), // Repeat
                Constraint::Min(0),    // Instructions
            ])
            .split(area);

        let form = &self.task_form;
        let focus = |order: usize| {
            if form.current_field == order {
                Style::default().fg(AMBER)
            } else {
                Style::default()
            }
        };

        let title = Paragraph::new(form.title.value.as_str()).block(
            Block::default().borders(Borders::ALL).title("Vow *").border_style(focus(TITLE_ORDER)),
        );
        f.render_widget(title, chunks[0]);

        let category = form.selected_category();
        let category = Paragraph::new(Line::from(vec![
            Span::raw("< "),
            Span::styled(category.themed_name(), Style::default().fg(category_color(category))),
            Span::raw(format!(" · {} >", category.description())),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Type").border_style(focus(CATEGORY_ORDER)));
        f.render_widget(category, chunks[1]);

        let priority = form.selected_priority();
        let priority = Paragraph::new(Line::from(vec![
            Span::raw("< "),
            Span::styled(priority.runes(), Style::default().fg(priority_color(priority))),
            Span::raw(format!(" {} >", priority.label())),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Weight").border_style(focus(PRIORITY_ORDER)));
        f.render_widget(priority, chunks[2]);

        let reminder = Paragraph::new(form.reminder.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Reminder (HH:MM, optional)")
                .border_style(focus(REMINDER_ORDER)),
        );
        f.render_widget(reminder, chunks[3]);

        let repeat = Paragraph::new(if form.repeat { "[x] repeat daily" } else { "[ ] repeat daily" }).block(
            Block::default().borders(Borders::ALL).title("Repeat").border_style(focus(REPEAT_ORDER)),
        );
        f.render_widget(repeat, chunks[4]);

        let submit_style = if form.can_submit() {
            Style::default().fg(JADE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(SLATE)
        };
        let help = Paragraph::new(vec![
            Line::from("Tab/↑↓ move between fields  ←→ change selection"),
            Line::from(Span::styled("Enter: take the vow   Esc: cancel", submit_style)),
        ])
        .block(Block::default().borders(Borders::ALL).title("立誓 New Task"))
        .alignment(Alignment::Center);
        f.render_widget(help, chunks[5]);

        if let Some(input) = form.active_input() {
            let row = if form.current_field == TITLE_ORDER { chunks[0] } else { chunks[3] };
            f.set_cursor_position((row.x + 1 + input.cursor_column(), row.y + 1));
        }
    }

    fn render_user_center(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(70, 70, area);
        f.render_widget(Clear, area);
        let mut lines = vec![Line::from("")];
        for (i, label) in PROFILE_FIELDS.iter().enumerate() {
            let editing = self.input_mode == InputMode::Text(TextTarget::ProfileField(i));
            let value = if editing {
                format!("{}▏", self.edit_input.value)
            } else {
                self.profile_value(i).to_string()
            };
            lines.push(self.menu_line(i, format!("{label:<10} {value}")));
        }
        lines.push(Line::from(""));
        for (j, page) in SettingsPage::ALL.iter().enumerate() {
            lines.push(self.menu_line(PROFILE_FIELDS.len() + j, format!("{} ›", page.label())));
        }
        let p = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(JADE))
                .title("User Center - Enter: edit/open  Esc: close"),
        );
        f.render_widget(p, area);
    }

    fn menu_line(&self, idx: usize, text: String) -> Line<'static> {
        if idx == self.user_center_selected {
            Line::from(Span::styled(format!(">> {text}"), Style::default().bg(Color::Gray).fg(Color::Black)))
        } else {
            Line::from(format!("   {text}"))
        }
    }

    fn settings_row_text(&self, row: SettingsRow) -> String {
        let s = &self.session.settings;
        let onoff = |b: bool| if b { "[on] " } else { "[off]" };
        match row {
            SettingsRow::ProfileVisibility => {
                format!("{:<34} {}", "Profile visibility", s.privacy.profile_visibility.label())
            }
            SettingsRow::TaskVisibility => {
                format!("{:<34} {}", "Task visibility", s.privacy.task_visibility.label())
            }
            SettingsRow::Privacy(k) => format!("{:<34} {}", k.label(), onoff(s.privacy.get(k))),
            SettingsRow::Slot(slot) => {
                let editing = self.input_mode == InputMode::Text(TextTarget::ReminderTime(slot));
                let time = if editing {
                    format!("{}▏", self.edit_input.value)
                } else {
                    s.reminder.slot_time(slot).format("%H:%M").to_string()
                };
                format!("{:<34} {} {}", slot.label(), onoff(s.reminder.slot_enabled(slot)), time)
            }
            SettingsRow::Reminder(k) => format!("{:<34} {}", k.label(), onoff(s.reminder.get(k))),
            SettingsRow::Notify(k) => format!(
                "{:<34} {}",
                format!("{} · {}", k.group(), k.label()),
                onoff(s.notification.get(k))
            ),
            SettingsRow::InAppOnly => format!("{:<34} {}", "In-app only", onoff(s.notification.in_app_only)),
        }
    }

    fn render_settings(&self, f: &mut Frame, area: Rect, page: SettingsPage) {
        let area = centered_rect(80, 85, area);
        f.render_widget(Clear, area);
        let lines: Vec<Line> = settings_rows(page)
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let text = self.settings_row_text(row);
                if i == self.settings_selected {
                    Line::from(Span::styled(format!(">> {text}"), Style::default().bg(Color::Gray).fg(Color::Black)))
                } else {
                    Line::from(format!("   {text}"))
                }
            })
            .collect();
        let hint = match page {
            SettingsPage::Reminder => "space: toggle  e: edit time  Esc: back",
            _ => "space: toggle/cycle  Esc: back",
        };
        let p = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(JADE))
                .title(format!("{} - {}", page.label(), hint)),
        );
        f.render_widget(p, area);
    }

    fn render_add_friend(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(80, 80, area);
        f.render_widget(Clear, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let tab_idx = DiscoverTab::ALL.iter().position(|t| *t == self.discover_tab).unwrap_or(0);
        let tabs = Tabs::new(DiscoverTab::ALL.iter().map(|t| t.label()).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL).title("Add Friend - ←→: tab  /: search  Esc: close"))
            .select(tab_idx)
            .highlight_style(Style::default().fg(AMBER).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        let searching = self.input_mode == InputMode::Text(TextTarget::Search);
        let search = Paragraph::new(self.search_input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search by name")
                .border_style(if searching { Style::default().fg(AMBER) } else { Style::default() }),
        );
        f.render_widget(search, chunks[1]);
        if searching {
            f.set_cursor_position((chunks[1].x + 1 + self.search_input.cursor_column(), chunks[1].y + 1));
        }

        let social = &self.session.social;
        let rows: Vec<Row> = social
            .discover(self.discover_tab, &self.search_input.value)
            .into_iter()
            .map(|s| {
                let extra = match (&s.distance, s.common_friends) {
                    (Some(d), _) => d.clone(),
                    (None, Some(n)) => format!("{n} mutual"),
                    (None, None) => String::new(),
                };
                let status = if social.is_requested(&s.id) { "requested ✓" } else { "Enter: add" };
                Row::new(vec![
                    Cell::from(format!("{} {}", s.avatar, s.name)),
                    Cell::from(s.title.clone()),
                    Cell::from(format!("{}{}", s.rank, s.stage)),
                    Cell::from(s.spirit.to_string()).style(Style::default().fg(AMBER)),
                    Cell::from(s.location.clone()),
                    Cell::from(extra).style(Style::default().fg(SLATE)),
                    Cell::from(status),
                ])
            })
            .collect();
        let empty = rows.is_empty();
        self.discover_table.select(if empty { None } else { Some(self.discover_selected) });
        let widths = [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(12),
        ];
        let title = if empty && self.discover_tab == DiscoverTab::Search {
            "Type a name to search"
        } else {
            "Cultivators"
        };
        let table = Table::new(rows, widths)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[2], &mut self.discover_table);
    }

    fn render_guide(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(80, 85, area);
        f.render_widget(Clear, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let idx = GuideTab::ALL.iter().position(|t| *t == self.guide_tab).unwrap_or(0);
        let tabs = Tabs::new(GuideTab::ALL.iter().map(|t| t.label()).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL).title("修仙指南 Guide - ←→: tab  any key: close"))
            .select(idx)
            .highlight_style(Style::default().fg(AMBER).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let text: Vec<Line> = match self.guide_tab {
            GuideTab::Path => vec![
                Line::from(Span::styled("修行之路漫漫，唯有日积月累，方能登临绝顶。", Style::default().fg(AMBER))),
                Line::from(""),
                Line::from(Span::styled("① Take a vow", bold)),
                Line::from("   Turn a real-world to-do into a practice task with a type and weight."),
                Line::from(Span::styled("② Earn spiritual exp", bold)),
                Line::from("   Every completed task grants exp toward the next realm."),
                Line::from(Span::styled("③ Break through", bold)),
                Line::from("   练气 → 筑基 → 结丹 → 元婴 → 化神, each with early, middle and late stages."),
                Line::from(Span::styled("④ Find companions", bold)),
                Line::from("   Add friends, keep each other honest, progress together."),
            ],
            GuideTab::TaskTypes => Category::ALL
                .iter()
                .flat_map(|c| {
                    [
                        Line::from(Span::styled(
                            format!("{} · {}", c.themed_name(), c.label()),
                            Style::default().fg(category_color(*c)).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(format!("   {}", c.description())),
                        Line::from(""),
                    ]
                })
                .collect(),
            GuideTab::Features => vec![
                Line::from(Span::styled("1 Practice", bold)),
                Line::from("   Realm and exp, today's tasks, space to complete, a to vow, d to delete."),
                Line::from(Span::styled("2 Calendar", bold)),
                Line::from("   Month grid shaded by completions; streak and best day."),
                Line::from(Span::styled("3 Friends", bold)),
                Line::from("   Leaderboard by spirit power; Enter to chat, a to add friends."),
                Line::from(Span::styled("4 Messages", bold)),
                Line::from("   Public square and private conversations; i to write."),
                Line::from(Span::styled("5 Profile", bold)),
                Line::from("   Roots, record and realm ladder; u for the user center and settings."),
            ],
        };
        let body = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(JADE)))
            .wrap(Wrap { trim: false });
        f.render_widget(body, chunks[1]);
    }

    /// Render a confirmation dialog for deleting a task.
    fn render_confirm(&self, f: &mut Frame, area: Rect, id: u64) {
        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(CINNABAR));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let title = self
            .session
            .store()
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Abandon this vow?", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(title),
            Line::from(""),
            Line::from("Exp already earned is kept."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(overlay) = self.session.overlay() {
            match overlay {
                Overlay::CreateTask => "New task".to_string(),
                Overlay::UserCenter => "User center".to_string(),
                Overlay::Settings(page) => page.label().to_string(),
                Overlay::AddFriend => "Add friend".to_string(),
                Overlay::Guide => "Guide".to_string(),
            }
        } else {
            let pending = if self.pending.is_empty() {
                String::new()
            } else {
                format!(" | {} completing", self.pending.len())
            };
            format!(
                "{} | 1-5/Tab: pages  u: user center  ?: guide  q: quit{}",
                self.session.page().label(),
                pending
            )
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(DEEP_TEAL).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the page and overlay renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_tabs(f, chunks[0]);
        let body = chunks[1];
        match self.session.page() {
            Page::Home => self.render_home(f, body),
            Page::Calendar => self.render_calendar(f, body),
            Page::Friends => self.render_friends(f, body),
            Page::Messages => self.render_messages(f, body),
            Page::Profile => self.render_profile(f, body),
        }

        match self.session.overlay() {
            Some(Overlay::CreateTask) => self.render_task_form(f, body),
            Some(Overlay::UserCenter) => self.render_user_center(f, body),
            Some(Overlay::Settings(page)) => self.render_settings(f, body, page),
            Some(Overlay::AddFriend) => self.render_add_friend(f, body),
            Some(Overlay::Guide) => self.render_guide(f, body),
            None => {}
        }

        if let AppState::ConfirmDelete(id) = self.state {
            self.render_confirm(f, body, id);
        }

        self.render_status_bar(f, chunks[2]);
    }

    /// Title frame shown once before the first page.
    fn render_splash(&self, f: &mut Frame) {
        let area = centered_rect(60, 40, f.area());
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "⬡  修仙ToDo  ⬡",
                Style::default().fg(AMBER).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("CULTIVATE", Style::default().fg(JADE).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled("人生即修行，每日皆历练", Style::default().fg(JADE))),
            Line::from(""),
            Line::from(Span::styled("press any key", Style::default().fg(SLATE))),
        ];
        let splash = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(DEEP_TEAL)))
            .alignment(Alignment::Center);
        f.render_widget(splash, area);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|f| self.render_splash(f))?;
        if event::poll(SPLASH_DURATION)? {
            let _ = event::read()?;
        }

        loop {
            self.tick(Instant::now());
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn session() -> Session {
        Session::new(&Config::default())
    }

    #[test]
    fn test_completion_waits_for_delay() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::from_millis(800));
        let t0 = Instant::now();
        app.toggle_task(1, t0);
        assert!(app.is_completing(1));
        assert!(!app.session.store().get(1).unwrap().completed);

        app.tick(t0 + Duration::from_millis(400));
        assert!(!app.session.store().get(1).unwrap().completed);

        app.tick(t0 + Duration::from_millis(800));
        assert!(app.session.store().get(1).unwrap().completed);
        assert!(!app.is_completing(1));
        assert_eq!(app.session.store().progression().exp, 3300);
    }

    #[test]
    fn test_reopen_is_immediate() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::from_millis(800));
        app.toggle_task(2, Instant::now());
        assert!(!app.session.store().get(2).unwrap().completed);
        assert_eq!(app.session.store().progression().exp, 3240);
    }

    #[test]
    fn test_second_toggle_cancels_pending() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::from_millis(800));
        let t0 = Instant::now();
        app.toggle_task(3, t0);
        app.toggle_task(3, t0);
        app.tick(t0 + Duration::from_secs(2));
        assert!(!app.session.store().get(3).unwrap().completed);
        assert_eq!(app.session.store().progression().exp, 3240);
    }

    #[test]
    fn test_zero_delay_applies_at_once() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        app.toggle_task(4, Instant::now());
        assert!(app.session.store().get(4).unwrap().completed);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::ConfirmDelete(1));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.session.store().tasks().len(), 4);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.state, AppState::Browse);
        assert!(app.session.store().get(1).is_none());
        assert_eq!(app.session.store().tasks().len(), 3);
    }

    #[test]
    fn test_create_form_flow() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session.overlay(), Some(Overlay::CreateTask));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message, "Title is required");
        assert_eq!(app.session.store().tasks().len(), 4);

        for c in "站桩".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.overlay(), None);
        let last = app.session.store().tasks().last().unwrap();
        assert_eq!(last.title, "站桩");
        assert_eq!(last.id, 5);
    }

    #[test]
    fn test_page_keys_and_start_chat() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.session.page(), Page::Friends);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.page(), Page::Messages);
        assert_eq!(app.session.selected_friend(), Some("2"));

        press(&mut app, KeyCode::Char('i'));
        for c in "多谢".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.message_input.value.is_empty());
        let transcript = app.session.social.private_transcript("2");
        assert_eq!(transcript.last().map(|m| m.content.as_str()), Some("多谢"));

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.selected_friend(), None);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_settings_toggle_and_time_edit() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        press(&mut app, KeyCode::Char('u'));
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.overlay(), Some(Overlay::Settings(SettingsPage::Reminder)));

        press(&mut app, KeyCode::Char(' '));
        assert!(!app.session.settings.reminder.slot_enabled(ReminderSlot::Daily));

        press(&mut app, KeyCode::Char('e'));
        for _ in 0..5 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "25:00".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.input_mode, InputMode::Text(_)));

        for _ in 0..5 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "07:15".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::None);
        assert_eq!(
            app.session.settings.reminder.slot_time(ReminderSlot::Daily).format("%H:%M").to_string(),
            "07:15"
        );

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.overlay(), Some(Overlay::UserCenter));
    }

    #[test]
    fn test_home_renders() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::from_millis(800));
        app.toggle_task(1, Instant::now());

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Practice"));
        assert!(screen.contains("3240/5000"));
        assert!(screen.contains("completing"));
        assert!(screen.contains("Completed (1)"));
    }

    #[test]
    fn test_splash_renders() {
        let mut s = session();
        let app = App::new(&mut s, Duration::ZERO);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render_splash(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("CULTIVATE"));
        assert!(screen.contains("press any key"));
    }

    #[test]
    fn test_every_page_renders() {
        let mut s = session();
        let mut app = App::new(&mut s, Duration::ZERO);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        for page in Page::TABS {
            app.switch_page(page);
            terminal.draw(|f| app.render(f)).unwrap();
        }
        for overlay in [
            Overlay::CreateTask,
            Overlay::UserCenter,
            Overlay::Settings(SettingsPage::Notification),
            Overlay::AddFriend,
            Overlay::Guide,
        ] {
            app.session.open_overlay(overlay);
            terminal.draw(|f| app.render(f)).unwrap();
        }
    }
}
