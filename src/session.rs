//! One running session: store, settings, social data and where the user is.

use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::{CompletionHistory, MonthSummary};
use crate::config::Config;
use crate::fields::{Overlay, Page};
use crate::settings::Settings;
use crate::social::Social;
use crate::store::{completed_count, Store};

/// Owned state of a session. Nothing here is shared or global.
#[derive(Debug, Clone)]
pub struct Session {
    store: Store,
    pub settings: Settings,
    pub social: Social,
    history: CompletionHistory,
    page: Page,
    overlay: Option<Overlay>,
    selected_friend: Option<String>,
}

/// Totals shown on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub total_completed: usize,
    pub total_tasks: usize,
    pub streak_days: u32,
}

impl Session {
    /// Fresh seeded session for `config`.
    pub fn new(config: &Config) -> Self {
        let today = config.session.resolve_today();
        let store = Store::seeded(today, config.progression.completion_reward);
        let settings = Settings {
            privacy: config.privacy.clone(),
            reminder: config.reminder.clone(),
            notification: config.notification.clone(),
            ..Settings::default()
        };
        info!(%today, reward = store.reward(), "session started");
        Session {
            store,
            settings,
            social: Social::seed(),
            history: CompletionHistory::seeded(today),
            page: Page::Home,
            overlay: None,
            selected_friend: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn history(&self) -> &CompletionHistory {
        &self.history
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn selected_friend(&self) -> Option<&str> {
        self.selected_friend.as_deref()
    }

    /// Switch page. Any open overlay is closed.
    pub fn navigate(&mut self, page: Page) {
        debug!(?page, "navigate");
        self.page = page;
        self.overlay = None;
    }

    /// Open an overlay, replacing any other.
    pub fn open_overlay(&mut self, overlay: Overlay) {
        debug!(?overlay, "open overlay");
        self.overlay = Some(overlay);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Select `friend_id` and switch to Messages. Unknown ids are ignored.
    pub fn start_chat(&mut self, friend_id: &str) -> bool {
        if self.social.friend(friend_id).is_none() {
            debug!(friend_id, "start chat ignored: unknown friend");
            return false;
        }
        self.selected_friend = Some(friend_id.to_string());
        self.navigate(Page::Messages);
        true
    }

    /// Leave a private chat and return to the conversation list.
    pub fn leave_chat(&mut self) {
        self.selected_friend = None;
    }

    /// Completed tasks dated today.
    pub fn today_completed(&self) -> u32 {
        completed_count(&self.store.today_tasks()) as u32
    }

    pub fn month_summary(&self) -> MonthSummary {
        self.history.summary(self.today_completed())
    }

    pub fn profile_stats(&self) -> ProfileStats {
        let all: Vec<_> = self.store.tasks().iter().collect();
        ProfileStats {
            total_completed: completed_count(&all),
            total_tasks: all.len(),
            streak_days: self.month_summary().streak_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SettingsPage;

    fn session() -> Session {
        Session::new(&Config::default())
    }

    #[test]
    fn test_starts_on_home() {
        let s = session();
        assert_eq!(s.page(), Page::Home);
        assert_eq!(s.overlay(), None);
        assert_eq!(s.store().tasks().len(), 4);
        assert_eq!(s.today_completed(), 1);
    }

    #[test]
    fn test_start_chat_switches_to_messages() {
        let mut s = session();
        s.navigate(Page::Friends);
        let id = s.social.ranked_friends()[0].id.clone();
        assert!(s.start_chat(&id));
        assert_eq!(s.page(), Page::Messages);
        assert_eq!(s.selected_friend(), Some(id.as_str()));
        s.leave_chat();
        assert_eq!(s.selected_friend(), None);
    }

    #[test]
    fn test_start_chat_unknown_friend() {
        let mut s = session();
        assert!(!s.start_chat("nobody"));
        assert_eq!(s.page(), Page::Home);
    }

    #[test]
    fn test_overlays_replace_and_close() {
        let mut s = session();
        s.open_overlay(Overlay::UserCenter);
        s.open_overlay(Overlay::Settings(SettingsPage::Privacy));
        assert_eq!(s.overlay(), Some(Overlay::Settings(SettingsPage::Privacy)));
        s.close_overlay();
        assert_eq!(s.overlay(), None);
        s.open_overlay(Overlay::Guide);
        s.navigate(Page::Calendar);
        assert_eq!(s.overlay(), None);
    }

    #[test]
    fn test_profile_stats_follow_store() {
        let mut s = session();
        s.store_mut().toggle_completion(1);
        let stats = s.profile_stats();
        assert_eq!(stats.total_completed, 2);
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.streak_days, 22);
    }

    #[test]
    fn test_config_reward_applies() {
        let mut cfg = Config::default();
        cfg.progression.completion_reward = 5;
        let mut s = Session::new(&cfg);
        let out = s.store_mut().toggle_completion(1).unwrap();
        assert_eq!(out.exp_awarded, 5);
    }
}
