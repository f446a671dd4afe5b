//! Task and progression store, plus table formatting helpers.
//!
//! `Store` owns the ordered task collection and the progression record. It is
//! the only place tasks are mutated. Every operation is total: an unknown id
//! or a blank title is a no-op reported through the return value, never an
//! error.

use chrono::{NaiveDate, NaiveTime};
use ratatui::text::Span;
use serde::Serialize;
use tracing::{debug, info};

use crate::fields::*;
use crate::progression::Progression;
use crate::task::{format_reminder, NewTask, Task};

/// Experience granted each time a task is marked complete.
pub const DEFAULT_COMPLETION_REWARD: u64 = 60;

/// In-memory store for one session.
#[derive(Debug, Clone)]
pub struct Store {
    tasks: Vec<Task>,
    progression: Progression,
    next_id: u64,
    today: NaiveDate,
    reward: u64,
}

/// Result of a toggle that found its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub id: u64,
    pub completed: bool,
    pub exp_awarded: u64,
}

/// Count and completed count for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub count: usize,
    pub completed: usize,
}

impl Store {
    /// Empty store dated `today`.
    pub fn new(today: NaiveDate, progression: Progression, reward: u64) -> Self {
        Store {
            tasks: Vec::new(),
            progression,
            next_id: 1,
            today,
            reward,
        }
    }

    /// Store holding the starter practice list for `today`.
    pub fn seeded(today: NaiveDate, reward: u64) -> Self {
        let mut store = Store::new(today, Progression::seed(), reward);
        let seed = [
            ("晨间打坐冥想", Category::Focus, Priority::Urgent, None, Some(true), false),
            ("研读道德经第三章", Category::Mind, Priority::Important, None, Some(true), true),
            ("炼体功法一百式", Category::Physical, Priority::Important, NaiveTime::from_hms_opt(6, 0, 0), None, false),
            ("整理洞府杂物", Category::Chore, Priority::Normal, None, None, false),
        ];
        for (title, category, priority, reminder, repeat, completed) in seed {
            let id = store.allocate_id();
            store.tasks.push(Task {
                id,
                title: title.to_string(),
                category,
                completed,
                priority,
                reminder,
                repeat,
                date: today,
            });
        }
        store
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Date assigned to newly created tasks.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn reward(&self) -> u64 {
        self.reward
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        self.tasks.get_mut(idx)
    }

    /// Flip completion of `id`. Marking complete awards the reward; un-marking
    /// never takes it back, so repeated toggling keeps accumulating.
    pub fn toggle_completion(&mut self, id: u64) -> Option<ToggleOutcome> {
        let reward = self.reward;
        let Some(task) = self.get_mut(id) else {
            debug!(id, "toggle ignored: unknown task");
            return None;
        };
        let was_completed = task.completed;
        task.completed = !was_completed;
        let exp_awarded = if was_completed { 0 } else { reward };
        self.progression.exp += exp_awarded;
        info!(id, completed = !was_completed, exp_awarded, exp = self.progression.exp, "task toggled");
        Some(ToggleOutcome {
            id,
            completed: !was_completed,
            exp_awarded,
        })
    }

    /// Append a task. Returns `None` without touching the list if the title is blank.
    pub fn add_task(&mut self, new: NewTask) -> Option<u64> {
        let title = new.title.trim();
        if title.is_empty() {
            debug!("add ignored: blank title");
            return None;
        }
        let id = self.allocate_id();
        self.tasks.push(Task {
            id,
            title: title.to_string(),
            category: new.category,
            completed: false,
            priority: new.priority,
            reminder: new.reminder,
            repeat: new.repeat.filter(|r| *r),
            date: self.today,
        });
        info!(id, category = new.category.label(), "task added");
        Some(id)
    }

    /// Remove `id` if present. Experience already earned is kept.
    pub fn delete_task(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        info!(id, "task deleted");
        Some(removed)
    }

    /// Tasks dated exactly `date`, in insertion order.
    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == date).collect()
    }

    /// Tasks for the session date.
    pub fn today_tasks(&self) -> Vec<&Task> {
        self.tasks_for_date(self.today)
    }

    /// `exp / next_level_exp`, unclamped.
    pub fn progress_ratio(&self) -> f64 {
        self.progression.progress_ratio()
    }
}

/// Number of completed tasks in `tasks`.
pub fn completed_count(tasks: &[&Task]) -> usize {
    tasks.iter().filter(|t| t.completed).count()
}

/// Number of tasks in `tasks`.
pub fn total_count(tasks: &[&Task]) -> usize {
    tasks.len()
}

/// Per-category counts. Always four entries in [`Category::ALL`] order.
pub fn category_breakdown(tasks: &[&Task]) -> Vec<CategoryStat> {
    Category::ALL
        .iter()
        .map(|&category| CategoryStat {
            category,
            count: tasks.iter().filter(|t| t.category == category).count(),
            completed: tasks
                .iter()
                .filter(|t| t.category == category && t.completed)
                .count(),
        })
        .collect()
}

/// Keep only tasks matching the completion filter, preserving order.
pub fn filter_completion<'a>(tasks: &[&'a Task], filter: CompletionFilter) -> Vec<&'a Task> {
    tasks
        .iter()
        .copied()
        .filter(|t| match filter {
            CompletionFilter::All => true,
            CompletionFilter::Pending => !t.completed,
            CompletionFilter::Completed => t.completed,
        })
        .collect()
}

/// Format a category for tables: "Focus 灵识任务".
pub fn format_category(c: Category) -> String {
    format!("{} {}", c.label(), c.themed_name())
}

/// Format completion for tables.
pub fn format_completed(done: bool) -> &'static str {
    if done {
        "Done"
    } else {
        "Open"
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<6} {:<10} {:<10} {:<6} {:<7} {}",
        "ID", "State", "Category", "Priority", "Remind", "Repeat", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<6} {:<10} {:<10} {:<6} {:<7} {}",
            t.id,
            format_completed(t.completed),
            t.category.label(),
            t.priority.label(),
            format_reminder(t.reminder),
            if t.repeats() { "daily" } else { "-" },
            t.title
        );
    }
}

/// Terminal columns taken by `s`. Wide CJK characters count two, combining
/// marks and joiners count zero.
pub fn display_width(s: &str) -> usize {
    Span::raw(s).width()
}

/// Truncate a string to at most `width` columns, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut out = String::new();
    for ch in s.chars() {
        out.push(ch);
        if display_width(&out) > budget {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

/// Pad `s` with spaces on the right to `width` columns.
pub fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 22).unwrap()
    }

    fn seeded() -> Store {
        Store::seeded(day(), DEFAULT_COMPLETION_REWARD)
    }

    #[test]
    fn test_seed_shape() {
        let store = seeded();
        assert_eq!(store.tasks().len(), 4);
        assert_eq!(store.progression().exp, 3240);
        assert!(store.get(2).unwrap().completed);
        assert!(!store.get(3).unwrap().completed);
    }

    #[test]
    fn test_toggle_scenario_reward_is_one_directional() {
        let mut store = seeded();
        let out = store.toggle_completion(3).unwrap();
        assert!(out.completed);
        assert_eq!(out.exp_awarded, 60);
        assert!(store.get(3).unwrap().completed);
        assert_eq!(store.progression().exp, 3300);

        let out = store.toggle_completion(3).unwrap();
        assert!(!out.completed);
        assert_eq!(out.exp_awarded, 0);
        assert!(!store.get(3).unwrap().completed);
        assert_eq!(store.progression().exp, 3300);
    }

    #[test]
    fn test_double_toggle_from_complete_awards_once() {
        let mut store = seeded();
        store.toggle_completion(2);
        assert_eq!(store.progression().exp, 3240);
        store.toggle_completion(2);
        assert!(store.get(2).unwrap().completed);
        assert_eq!(store.progression().exp, 3300);
    }

    #[test]
    fn test_repeated_toggling_inflates_exp() {
        let mut store = seeded();
        for _ in 0..10 {
            store.toggle_completion(1);
        }
        assert!(!store.get(1).unwrap().completed);
        assert_eq!(store.progression().exp, 3240 + 5 * 60);
    }

    #[test]
    fn test_toggle_touches_nothing_else() {
        let mut store = seeded();
        let before = store.get(3).cloned().unwrap();
        store.toggle_completion(3);
        let after = store.get(3).unwrap();
        assert_eq!(after.title, before.title);
        assert_eq!(after.priority, before.priority);
        assert_eq!(after.reminder, before.reminder);
        assert_eq!(after.date, before.date);
        assert_eq!(store.progression().level, 3);
        assert_eq!(store.progression().rank, "筑基");
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.tasks().to_vec();
        assert_eq!(store.toggle_completion(99), None);
        assert_eq!(store.tasks(), &before[..]);
        assert_eq!(store.progression().exp, 3240);
    }

    #[test]
    fn test_add_appends_with_fresh_id() {
        let mut store = seeded();
        let id = store
            .add_task(NewTask::new("  冥想  ", Category::Focus, Priority::Important))
            .unwrap();
        assert_eq!(store.tasks().len(), 5);
        let last = store.tasks().last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.title, "冥想");
        assert!(!last.completed);
        assert_eq!(last.date, day());
        assert_eq!(store.tasks().iter().filter(|t| t.id == id).count(), 1);
        assert_eq!(store.progression().exp, 3240);
    }

    #[test]
    fn test_add_blank_title_rejected() {
        let mut store = seeded();
        assert_eq!(store.add_task(NewTask::new("  ", Category::Mind, Priority::Normal)), None);
        assert_eq!(store.add_task(NewTask::new("", Category::Mind, Priority::Normal)), None);
        assert_eq!(store.tasks().len(), 4);
    }

    #[test]
    fn test_add_then_delete_round_trip() {
        let mut store = seeded();
        let before = store.tasks().to_vec();
        let id = store
            .add_task(NewTask::new("冥想", Category::Focus, Priority::Important))
            .unwrap();
        store.delete_task(id).unwrap();
        assert_eq!(store.tasks(), &before[..]);
    }

    #[test]
    fn test_delete_keeps_exp_and_others() {
        let mut store = seeded();
        store.toggle_completion(1);
        let others: Vec<Task> = store.tasks().iter().filter(|t| t.id != 1).cloned().collect();
        let removed = store.delete_task(1).unwrap();
        assert!(removed.completed);
        assert_eq!(store.tasks(), &others[..]);
        assert_eq!(store.progression().exp, 3300);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.tasks().to_vec();
        assert!(store.delete_task(42).is_none());
        assert_eq!(store.tasks(), &before[..]);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = seeded();
        let a = store.add_task(NewTask::new("a", Category::Chore, Priority::Normal)).unwrap();
        store.delete_task(a);
        let b = store.add_task(NewTask::new("b", Category::Chore, Priority::Normal)).unwrap();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_tasks_for_date_and_counts() {
        let mut store = seeded();
        let other = NaiveDate::from_ymd_opt(2025, 11, 23).unwrap();
        assert!(store.tasks_for_date(other).is_empty());
        let today = store.today_tasks();
        assert_eq!(total_count(&today), 4);
        assert_eq!(completed_count(&today), 1);
        store.toggle_completion(4);
        assert_eq!(completed_count(&store.today_tasks()), 2);
    }

    #[test]
    fn test_category_breakdown() {
        let store = seeded();
        let today = store.today_tasks();
        let stats = category_breakdown(&today);
        assert_eq!(stats.len(), 4);
        let mind = stats.iter().find(|s| s.category == Category::Mind).unwrap();
        assert_eq!((mind.count, mind.completed), (1, 1));
        let focus = stats.iter().find(|s| s.category == Category::Focus).unwrap();
        assert_eq!((focus.count, focus.completed), (1, 0));
        assert!(category_breakdown(&[]).iter().all(|s| s.count == 0));
    }

    #[test]
    fn test_progress_ratio_can_exceed_one() {
        let mut store = Store::new(day(), Progression::seed(), 1000);
        store.add_task(NewTask::new("a", Category::Focus, Priority::Normal));
        for _ in 0..4 {
            store.toggle_completion(1);
        }
        assert_eq!(store.progression().exp, 5240);
        assert!((store.progress_ratio() - 5240.0 / 5000.0).abs() < 1e-9);
        assert!(store.progress_ratio() > 1.0);
    }

    #[test]
    fn test_filter_completion() {
        let store = seeded();
        let today = store.today_tasks();
        let pending = filter_completion(&today, CompletionFilter::Pending);
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3, 4]);
        let done = filter_completion(&today, CompletionFilter::Completed);
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("研读道德经第三章", 9), "研读道德…");
        assert_eq!(truncate("研读道德经第三章", 4), "研…");
        assert_eq!(display_width(&truncate("寒月仙子法术天才", 10)), 9);
    }

    #[test]
    fn test_width_ignores_combining_marks() {
        assert_eq!(display_width("e\u{301}"), 1);
        assert_eq!(display_width("青云子"), 6);
        assert_eq!(pad("青云子", 10), "青云子    ");
        assert_eq!(display_width(&pad("e\u{301}", 4)), 4);
        assert_eq!(pad("toolongvalue", 4), "toolongvalue");
    }

    #[test]
    fn test_toggle_and_delete_hold_for_every_task() {
        let mut base = seeded();
        base.add_task(NewTask::new("吐纳", Category::Mind, Priority::Normal))
            .unwrap();
        let ids: Vec<u64> = base.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        for &id in &ids {
            let mut store = base.clone();
            let was_completed = store.get(id).unwrap().completed;
            let exp = store.progression().exp;
            let first = store.toggle_completion(id).unwrap();
            let after_first = store.progression().exp;
            assert_eq!(after_first - exp, if was_completed { 0 } else { 60 }, "task {id}");
            assert_eq!(first.exp_awarded, after_first - exp);

            let second = store.toggle_completion(id).unwrap();
            assert_eq!(store.get(id).unwrap().completed, was_completed, "task {id}");
            assert_eq!(store.progression().exp - after_first, second.exp_awarded);
            assert_eq!(second.exp_awarded, if was_completed { 60 } else { 0 }, "task {id}");

            let mut store = base.clone();
            let others: Vec<Task> = store.tasks().iter().filter(|t| t.id != id).cloned().collect();
            let exp = store.progression().exp;
            assert_eq!(store.delete_task(id).map(|t| t.id), Some(id));
            assert_eq!(store.tasks().len(), ids.len() - 1);
            assert_eq!(store.tasks(), &others[..]);
            assert_eq!(store.progression().exp, exp);
        }
    }
}
