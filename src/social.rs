//! Mock social layer: fellow cultivators, message transcripts and friend discovery.
//!
//! All data is seeded at session start. Sent messages and friend requests are
//! kept for the session only.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

/// A friend on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Friend {
    pub id: String,
    pub name: String,
    pub title: String,
    pub rank: String,
    pub stage: String,
    pub level: u32,
    pub spirit: u32,
    pub avatar: String,
}

/// Direction of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Received,
    Sent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub from: String,
    pub avatar: String,
    pub content: String,
    pub time: String,
    pub kind: MessageKind,
}

/// Entry of the private conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub friend_id: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
}

/// A cultivator who is not yet a friend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stranger {
    pub id: String,
    pub name: String,
    pub title: String,
    pub rank: String,
    pub stage: String,
    pub spirit: u32,
    pub avatar: String,
    pub location: String,
    pub distance: Option<String>,
    pub common_friends: Option<u32>,
}

/// Tabs of the add-friend screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverTab {
    Recommended,
    Nearby,
    Search,
}

impl DiscoverTab {
    pub const ALL: [DiscoverTab; 3] = [DiscoverTab::Recommended, DiscoverTab::Nearby, DiscoverTab::Search];

    pub fn label(self) -> &'static str {
        match self {
            DiscoverTab::Recommended => "Recommended",
            DiscoverTab::Nearby => "Nearby",
            DiscoverTab::Search => "Search",
        }
    }
}

/// Where a message is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Public,
    Friend(String),
}

const ME: &str = "我";
const MY_AVATAR: &str = "🧘";

/// Session-owned social data.
#[derive(Debug, Clone)]
pub struct Social {
    friends: Vec<Friend>,
    public_messages: Vec<Message>,
    conversations: Vec<Conversation>,
    sent_private: BTreeMap<String, Vec<Message>>,
    recommended: Vec<Stranger>,
    nearby: Vec<Stranger>,
    search_pool: Vec<Stranger>,
    requested: BTreeSet<String>,
}

#[allow(clippy::too_many_arguments)]
fn friend(id: &str, name: &str, title: &str, rank: &str, stage: &str, level: u32, spirit: u32, avatar: &str) -> Friend {
    Friend {
        id: id.into(),
        name: name.into(),
        title: title.into(),
        rank: rank.into(),
        stage: stage.into(),
        level,
        spirit,
        avatar: avatar.into(),
    }
}

fn received(from: &str, avatar: &str, content: &str, time: &str) -> Message {
    Message {
        from: from.into(),
        avatar: avatar.into(),
        content: content.into(),
        time: time.into(),
        kind: MessageKind::Received,
    }
}

fn sent(content: &str, time: &str) -> Message {
    Message {
        from: ME.into(),
        avatar: MY_AVATAR.into(),
        content: content.into(),
        time: time.into(),
        kind: MessageKind::Sent,
    }
}

fn conversation(friend_id: &str, last: &str, time: &str, unread: u32) -> Conversation {
    Conversation {
        friend_id: friend_id.into(),
        last_message: last.into(),
        time: time.into(),
        unread,
    }
}

#[allow(clippy::too_many_arguments)]
fn stranger(
    id: &str,
    name: &str,
    title: &str,
    rank: &str,
    stage: &str,
    spirit: u32,
    avatar: &str,
    location: &str,
    distance: Option<&str>,
    common_friends: Option<u32>,
) -> Stranger {
    Stranger {
        id: id.into(),
        name: name.into(),
        title: title.into(),
        rank: rank.into(),
        stage: stage.into(),
        spirit,
        avatar: avatar.into(),
        location: location.into(),
        distance: distance.map(str::to_string),
        common_friends,
    }
}

impl Social {
    /// The starter social graph.
    pub fn seed() -> Self {
        Social {
            friends: vec![
                friend("1", "青云子", "剑道修士", "金丹", "中期", 5, 8640, "⚔️"),
                friend("2", "长河散人", "丹道宗师", "元婴", "初期", 6, 12400, "🔮"),
                friend("3", "寒月仙子", "法术天才", "金丹", "后期", 5, 9200, "❄️"),
                friend("4", "玄木道人", "符箓大师", "筑基", "大圆满", 4, 4850, "📜"),
                friend("5", "烈火真君", "炼器师", "金丹", "初期", 5, 7320, "🔥"),
            ],
            public_messages: vec![
                received("青云子", "⚔️", "诸位道友，今日青云宗开坛讲法，欢迎前来听讲。", "08:30"),
                received("寒月仙子", "❄️", "近日修行颇有感悟，愿与诸位道友分享心得。", "09:15"),
                sent("今日突破境界瓶颈，感谢诸位道友指点。", "10:20"),
                received("长河散人", "🔮", "贫道新炼一炉丹药，效果奇佳，可提升修为。有意者可来洞府一叙。", "14:30"),
                received("烈火真君", "🔥", "修行之路漫漫，唯有勤勉方能有所成就。与诸位道友共勉！", "15:45"),
            ],
            conversations: vec![
                conversation("1", "道友今日修行进展如何？", "10 min ago", 2),
                conversation("3", "明日可否结伴修炼？", "1 h ago", 0),
                conversation("2", "这枚丹药送予道友", "3 h ago", 1),
                conversation("5", "多谢道友援手之恩", "yesterday", 0),
                conversation("4", "这卷功法还请道友参详", "2 days ago", 0),
            ],
            sent_private: BTreeMap::new(),
            recommended: vec![
                stranger("6", "流云真人", "青云宗长老", "金丹", "初期", 8500, "☁️", "青云宗", None, Some(3)),
                stranger("7", "紫霞仙子", "天剑宗弟子", "筑基", "后期", 4200, "🌸", "天剑宗", None, Some(2)),
                stranger("8", "星辰散人", "散修", "筑基", "中期", 3100, "✨", "无归之地", None, Some(1)),
                stranger("9", "玄冰道人", "冰魄宫弟子", "筑基", "初期", 2400, "❄️", "冰魄宫", None, Some(0)),
            ],
            nearby: vec![
                stranger("10", "清风道长", "青云宗弟子", "筑基", "中期", 2900, "🍃", "青云宗·东峰", Some("500 m"), None),
                stranger("11", "明月仙子", "青云宗弟子", "筑基", "初期", 2600, "🌙", "青云宗·灵药园", Some("1.2 km"), None),
                stranger("12", "赤焰真君", "烈火门弟子", "筑基", "后期", 3800, "🔥", "青云城", Some("3 km"), None),
            ],
            search_pool: vec![
                stranger("13", "幻影散人", "散修", "筑基", "中期", 3300, "🌫️", "迷雾森林", None, None),
                stranger("14", "雷霆真人", "雷音寺弟子", "金丹", "初期", 9200, "⚡", "雷音寺", None, None),
            ],
            requested: BTreeSet::new(),
        }
    }

    /// Friends ordered by spirit power, strongest first.
    pub fn ranked_friends(&self) -> Vec<&Friend> {
        let mut ranked: Vec<&Friend> = self.friends.iter().collect();
        ranked.sort_by(|a, b| b.spirit.cmp(&a.spirit));
        ranked
    }

    pub fn friend(&self, id: &str) -> Option<&Friend> {
        self.friends.iter().find(|f| f.id == id)
    }

    pub fn public_messages(&self) -> &[Message] {
        &self.public_messages
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Transcript with one friend: the canned exchange followed by anything
    /// sent this session. Unknown friends have no transcript.
    pub fn private_transcript(&self, friend_id: &str) -> Vec<Message> {
        let Some(f) = self.friend(friend_id) else {
            return Vec::new();
        };
        let mut lines = vec![
            received(&f.name, &f.avatar, "道友，今日修行可有进展？", "09:30"),
            sent("多谢道友关心，略有所获。", "09:35"),
            received(&f.name, &f.avatar, "那便好，若有疑惑之处，尽管相询。", "09:40"),
            sent("定当如此，再次感谢道友。", "09:45"),
        ];
        if let Some(extra) = self.sent_private.get(friend_id) {
            lines.extend(extra.iter().cloned());
        }
        lines
    }

    /// Append a sent message. Blank content or an unknown friend is ignored.
    pub fn send_message(&mut self, channel: &Channel, content: &str, time: &str) -> bool {
        let content = content.trim();
        if content.is_empty() {
            return false;
        }
        match channel {
            Channel::Public => self.public_messages.push(sent(content, time)),
            Channel::Friend(id) => {
                if self.friend(id).is_none() {
                    return false;
                }
                self.sent_private.entry(id.clone()).or_default().push(sent(content, time));
            }
        }
        info!(?channel, "message sent");
        true
    }

    /// Candidates listed under a discovery tab. Search matches a substring of
    /// the name and shows nothing for an empty query.
    pub fn discover(&self, tab: DiscoverTab, query: &str) -> Vec<&Stranger> {
        match tab {
            DiscoverTab::Recommended => self.recommended.iter().collect(),
            DiscoverTab::Nearby => self.nearby.iter().collect(),
            DiscoverTab::Search => {
                let q = query.trim();
                if q.is_empty() {
                    return Vec::new();
                }
                self.search_pool.iter().filter(|s| s.name.contains(q)).collect()
            }
        }
    }

    /// Record a friend request. Returns false if it was already sent.
    pub fn send_request(&mut self, user_id: &str) -> bool {
        let fresh = self.requested.insert(user_id.to_string());
        if fresh {
            info!(user_id, "friend request sent");
        }
        fresh
    }

    pub fn is_requested(&self, user_id: &str) -> bool {
        self.requested.contains(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friends_ranked_by_spirit() {
        let social = Social::seed();
        let ranked = social.ranked_friends();
        let spirits: Vec<u32> = ranked.iter().map(|f| f.spirit).collect();
        assert_eq!(spirits, vec![12400, 9200, 8640, 7320, 4850]);
        assert_eq!(ranked[0].name, "长河散人");
    }

    #[test]
    fn test_search_filters_by_substring() {
        let social = Social::seed();
        assert!(social.discover(DiscoverTab::Search, "").is_empty());
        let hits = social.discover(DiscoverTab::Search, "雷霆");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "14");
        assert_eq!(social.discover(DiscoverTab::Search, "散人").len(), 1);
        assert_eq!(social.discover(DiscoverTab::Nearby, "ignored").len(), 3);
    }

    #[test]
    fn test_friend_request_idempotent() {
        let mut social = Social::seed();
        assert!(!social.is_requested("6"));
        assert!(social.send_request("6"));
        assert!(!social.send_request("6"));
        assert!(social.is_requested("6"));
    }

    #[test]
    fn test_private_transcript_and_send() {
        let mut social = Social::seed();
        assert!(social.private_transcript("99").is_empty());
        let base = social.private_transcript("3");
        assert_eq!(base.len(), 4);
        assert_eq!(base[0].from, "寒月仙子");

        assert!(!social.send_message(&Channel::Friend("3".into()), "   ", "10:00"));
        assert!(social.send_message(&Channel::Friend("3".into()), "好", "10:00"));
        let after = social.private_transcript("3");
        assert_eq!(after.len(), 5);
        assert_eq!(after[4].kind, MessageKind::Sent);
        assert!(!social.send_message(&Channel::Friend("99".into()), "hi", "10:00"));
    }

    #[test]
    fn test_public_send_appends() {
        let mut social = Social::seed();
        let n = social.public_messages().len();
        social.send_message(&Channel::Public, "共勉", "16:00");
        assert_eq!(social.public_messages().len(), n + 1);
    }
}
