//! Privacy, reminder and notification settings plus the user profile record.
//!
//! Each settings screen edits a fixed record. Toggles are addressed by typed
//! keys so every screen can list its rows without string lookups. Nothing here
//! is persisted or sent anywhere; values live for the session.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::Visibility;

/// Who can see what of the cultivator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    pub profile_visibility: Visibility,
    pub show_spirit: bool,
    pub show_level: bool,
    pub show_progress: bool,
    pub allow_friend_requests: bool,
    pub show_online_status: bool,
    pub task_visibility: Visibility,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        PrivacySettings {
            profile_visibility: Visibility::Public,
            show_spirit: true,
            show_level: true,
            show_progress: true,
            allow_friend_requests: true,
            show_online_status: true,
            task_visibility: Visibility::Friends,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyToggle {
    ShowSpirit,
    ShowLevel,
    ShowProgress,
    AllowFriendRequests,
    ShowOnlineStatus,
}

impl PrivacyToggle {
    pub const ALL: [PrivacyToggle; 5] = [
        PrivacyToggle::ShowSpirit,
        PrivacyToggle::ShowLevel,
        PrivacyToggle::ShowProgress,
        PrivacyToggle::AllowFriendRequests,
        PrivacyToggle::ShowOnlineStatus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PrivacyToggle::ShowSpirit => "Show spirit power",
            PrivacyToggle::ShowLevel => "Show realm",
            PrivacyToggle::ShowProgress => "Show practice progress",
            PrivacyToggle::AllowFriendRequests => "Accept friend requests",
            PrivacyToggle::ShowOnlineStatus => "Show online status",
        }
    }
}

impl PrivacySettings {
    pub fn get(&self, key: PrivacyToggle) -> bool {
        match key {
            PrivacyToggle::ShowSpirit => self.show_spirit,
            PrivacyToggle::ShowLevel => self.show_level,
            PrivacyToggle::ShowProgress => self.show_progress,
            PrivacyToggle::AllowFriendRequests => self.allow_friend_requests,
            PrivacyToggle::ShowOnlineStatus => self.show_online_status,
        }
    }

    pub fn toggle(&mut self, key: PrivacyToggle) -> bool {
        let slot = match key {
            PrivacyToggle::ShowSpirit => &mut self.show_spirit,
            PrivacyToggle::ShowLevel => &mut self.show_level,
            PrivacyToggle::ShowProgress => &mut self.show_progress,
            PrivacyToggle::AllowFriendRequests => &mut self.allow_friend_requests,
            PrivacyToggle::ShowOnlineStatus => &mut self.show_online_status,
        };
        *slot = !*slot;
        debug!(?key, value = *slot, "privacy setting toggled");
        *slot
    }
}

/// Scheduled practice reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub daily_reminder: bool,
    #[serde(with = "clock")]
    pub reminder_time: NaiveTime,
    pub morning_reminder: bool,
    #[serde(with = "clock")]
    pub morning_time: NaiveTime,
    pub evening_reminder: bool,
    #[serde(with = "clock")]
    pub evening_time: NaiveTime,
    pub night_reminder: bool,
    #[serde(with = "clock")]
    pub night_time: NaiveTime,
    pub weekend_reminder: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            daily_reminder: true,
            reminder_time: hm(8, 0),
            morning_reminder: true,
            morning_time: hm(6, 0),
            evening_reminder: true,
            evening_time: hm(18, 0),
            night_reminder: false,
            night_time: hm(21, 0),
            weekend_reminder: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

/// A reminder that has both a switch and a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderSlot {
    Daily,
    Morning,
    Evening,
    Night,
}

impl ReminderSlot {
    pub const ALL: [ReminderSlot; 4] = [
        ReminderSlot::Daily,
        ReminderSlot::Morning,
        ReminderSlot::Evening,
        ReminderSlot::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReminderSlot::Daily => "Daily reminder",
            ReminderSlot::Morning => "Morning practice",
            ReminderSlot::Evening => "Evening practice",
            ReminderSlot::Night => "Night practice",
        }
    }
}

/// Plain on/off reminder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderToggle {
    Weekend,
    Sound,
    Vibration,
}

impl ReminderToggle {
    pub const ALL: [ReminderToggle; 3] = [
        ReminderToggle::Weekend,
        ReminderToggle::Sound,
        ReminderToggle::Vibration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReminderToggle::Weekend => "Weekend reminders",
            ReminderToggle::Sound => "Reminder sound",
            ReminderToggle::Vibration => "Vibration",
        }
    }
}

impl ReminderSettings {
    pub fn slot_enabled(&self, slot: ReminderSlot) -> bool {
        match slot {
            ReminderSlot::Daily => self.daily_reminder,
            ReminderSlot::Morning => self.morning_reminder,
            ReminderSlot::Evening => self.evening_reminder,
            ReminderSlot::Night => self.night_reminder,
        }
    }

    pub fn slot_time(&self, slot: ReminderSlot) -> NaiveTime {
        match slot {
            ReminderSlot::Daily => self.reminder_time,
            ReminderSlot::Morning => self.morning_time,
            ReminderSlot::Evening => self.evening_time,
            ReminderSlot::Night => self.night_time,
        }
    }

    pub fn toggle_slot(&mut self, slot: ReminderSlot) -> bool {
        let flag = match slot {
            ReminderSlot::Daily => &mut self.daily_reminder,
            ReminderSlot::Morning => &mut self.morning_reminder,
            ReminderSlot::Evening => &mut self.evening_reminder,
            ReminderSlot::Night => &mut self.night_reminder,
        };
        *flag = !*flag;
        debug!(?slot, value = *flag, "reminder slot toggled");
        *flag
    }

    pub fn set_slot_time(&mut self, slot: ReminderSlot, time: NaiveTime) {
        let target = match slot {
            ReminderSlot::Daily => &mut self.reminder_time,
            ReminderSlot::Morning => &mut self.morning_time,
            ReminderSlot::Evening => &mut self.evening_time,
            ReminderSlot::Night => &mut self.night_time,
        };
        *target = time;
    }

    pub fn get(&self, key: ReminderToggle) -> bool {
        match key {
            ReminderToggle::Weekend => self.weekend_reminder,
            ReminderToggle::Sound => self.sound_enabled,
            ReminderToggle::Vibration => self.vibration_enabled,
        }
    }

    pub fn toggle(&mut self, key: ReminderToggle) -> bool {
        let flag = match key {
            ReminderToggle::Weekend => &mut self.weekend_reminder,
            ReminderToggle::Sound => &mut self.sound_enabled,
            ReminderToggle::Vibration => &mut self.vibration_enabled,
        };
        *flag = !*flag;
        *flag
    }
}

/// Push and in-app notification switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub new_message: bool,
    pub friend_message: bool,
    pub group_message: bool,
    pub friend_request: bool,
    pub friend_accepted: bool,
    pub friend_activity: bool,
    pub task_completed: bool,
    pub level_up: bool,
    pub milestone: bool,
    pub streak: bool,
    pub system_updates: bool,
    pub maintenance: bool,
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub in_app_only: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            new_message: true,
            friend_message: true,
            group_message: false,
            friend_request: true,
            friend_accepted: true,
            friend_activity: false,
            task_completed: true,
            level_up: true,
            milestone: true,
            streak: true,
            system_updates: true,
            maintenance: true,
            push_enabled: true,
            email_enabled: false,
            in_app_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationToggle {
    PushEnabled,
    EmailEnabled,
    NewMessage,
    FriendMessage,
    GroupMessage,
    FriendRequest,
    FriendAccepted,
    FriendActivity,
    TaskCompleted,
    LevelUp,
    Milestone,
    Streak,
    SystemUpdates,
    Maintenance,
}

impl NotificationToggle {
    /// Rows in screen order; delivery methods first, then the four groups.
    pub const ALL: [NotificationToggle; 14] = [
        NotificationToggle::PushEnabled,
        NotificationToggle::EmailEnabled,
        NotificationToggle::NewMessage,
        NotificationToggle::FriendMessage,
        NotificationToggle::GroupMessage,
        NotificationToggle::FriendRequest,
        NotificationToggle::FriendAccepted,
        NotificationToggle::FriendActivity,
        NotificationToggle::TaskCompleted,
        NotificationToggle::LevelUp,
        NotificationToggle::Milestone,
        NotificationToggle::Streak,
        NotificationToggle::SystemUpdates,
        NotificationToggle::Maintenance,
    ];

    /// Section heading the row belongs to.
    pub fn group(self) -> &'static str {
        use NotificationToggle::*;
        match self {
            PushEnabled | EmailEnabled => "Delivery",
            NewMessage | FriendMessage | GroupMessage => "Messages",
            FriendRequest | FriendAccepted | FriendActivity => "Social",
            TaskCompleted | LevelUp | Milestone | Streak => "Achievements",
            SystemUpdates | Maintenance => "System",
        }
    }

    pub fn label(self) -> &'static str {
        use NotificationToggle::*;
        match self {
            PushEnabled => "Push notifications",
            EmailEnabled => "Email notifications",
            NewMessage => "New message",
            FriendMessage => "Friend message",
            GroupMessage => "Group message",
            FriendRequest => "Friend request",
            FriendAccepted => "Request accepted",
            FriendActivity => "Friend activity",
            TaskCompleted => "Task completed",
            LevelUp => "Realm breakthrough",
            Milestone => "Milestone reached",
            Streak => "Practice streak",
            SystemUpdates => "System updates",
            Maintenance => "Maintenance notices",
        }
    }
}

impl NotificationSettings {
    fn slot(&mut self, key: NotificationToggle) -> &mut bool {
        use NotificationToggle::*;
        match key {
            PushEnabled => &mut self.push_enabled,
            EmailEnabled => &mut self.email_enabled,
            NewMessage => &mut self.new_message,
            FriendMessage => &mut self.friend_message,
            GroupMessage => &mut self.group_message,
            FriendRequest => &mut self.friend_request,
            FriendAccepted => &mut self.friend_accepted,
            FriendActivity => &mut self.friend_activity,
            TaskCompleted => &mut self.task_completed,
            LevelUp => &mut self.level_up,
            Milestone => &mut self.milestone,
            Streak => &mut self.streak,
            SystemUpdates => &mut self.system_updates,
            Maintenance => &mut self.maintenance,
        }
    }

    pub fn get(&self, key: NotificationToggle) -> bool {
        use NotificationToggle::*;
        match key {
            PushEnabled => self.push_enabled,
            EmailEnabled => self.email_enabled,
            NewMessage => self.new_message,
            FriendMessage => self.friend_message,
            GroupMessage => self.group_message,
            FriendRequest => self.friend_request,
            FriendAccepted => self.friend_accepted,
            FriendActivity => self.friend_activity,
            TaskCompleted => self.task_completed,
            LevelUp => self.level_up,
            Milestone => self.milestone,
            Streak => self.streak,
            SystemUpdates => self.system_updates,
            Maintenance => self.maintenance,
        }
    }

    pub fn toggle(&mut self, key: NotificationToggle) -> bool {
        let flag = self.slot(key);
        *flag = !*flag;
        *flag
    }
}

/// Editable identity shown in the user center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub avatar: String,
    pub name: String,
    pub title: String,
    pub email: String,
    pub location: String,
    pub joined: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            avatar: "🧘".into(),
            name: "玄清散人".into(),
            title: "筑基修士".into(),
            email: "xuanqing@cultivation.com".into(),
            location: "青云宗 · 灵峰".into(),
            joined: "2024-05".into(),
        }
    }
}

/// All settings records of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    pub privacy: PrivacySettings,
    pub reminder: ReminderSettings,
    pub notification: NotificationSettings,
    pub profile: UserProfile,
}

/// Serde adapter storing times of day as `HH:MM`.
mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_toggle() {
        let mut p = PrivacySettings::default();
        assert!(p.get(PrivacyToggle::ShowSpirit));
        assert!(!p.toggle(PrivacyToggle::ShowSpirit));
        assert!(!p.show_spirit);
        assert!(p.show_level);
    }

    #[test]
    fn test_reminder_slots() {
        let mut r = ReminderSettings::default();
        assert!(!r.slot_enabled(ReminderSlot::Night));
        assert_eq!(r.slot_time(ReminderSlot::Night), hm(21, 0));
        assert!(r.toggle_slot(ReminderSlot::Night));
        r.set_slot_time(ReminderSlot::Morning, hm(5, 30));
        assert_eq!(r.morning_time, hm(5, 30));
        assert!(!r.toggle(ReminderToggle::Sound));
    }

    #[test]
    fn test_notification_toggle_only_touches_one_field() {
        let mut n = NotificationSettings::default();
        let before = n.clone();
        assert!(n.toggle(NotificationToggle::GroupMessage));
        assert!(n.get(NotificationToggle::GroupMessage));
        n.group_message = false;
        assert_eq!(n, before);
    }

    #[test]
    fn test_reminder_times_serialize_as_hhmm() {
        let r = ReminderSettings::default();
        let s = toml::to_string(&r).unwrap();
        assert!(s.contains("reminder_time = \"08:00\""));
        let back: ReminderSettings = toml::from_str(&s).unwrap();
        assert_eq!(back, r);
    }
}
