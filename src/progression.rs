//! Rank and experience record.
//!
//! The record only ever gains experience through completion rewards. Rank,
//! stage and level are display labels: crossing `next_level_exp` does not
//! promote the cultivator, and the overflow is never consumed. Both gaps are
//! kept deliberately until a product decision is made about level-ups.

use serde::{Deserialize, Serialize};

/// Three static aptitude scores shown on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// 勤奋灵根
    pub diligence: u32,
    /// 心法灵根
    pub wisdom: u32,
    /// 体修灵根
    pub body: u32,
}

/// The cultivator's rank and experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub rank: String,
    pub stage: String,
    pub level: u32,
    pub exp: u64,
    pub next_level_exp: u64,
    pub attributes: Attributes,
}

impl Progression {
    /// Starting record for a new session.
    pub fn seed() -> Self {
        Progression {
            rank: "筑基".into(),
            stage: "中期".into(),
            level: 3,
            exp: 3240,
            next_level_exp: 5000,
            attributes: Attributes {
                diligence: 85,
                wisdom: 72,
                body: 68,
            },
        }
    }

    /// `exp / next_level_exp`, unclamped. A zero threshold gives 0.0.
    pub fn progress_ratio(&self) -> f64 {
        if self.next_level_exp == 0 {
            return 0.0;
        }
        self.exp as f64 / self.next_level_exp as f64
    }

    /// Ratio clamped into `0.0..=1.0` for gauges.
    pub fn display_ratio(&self) -> f64 {
        self.progress_ratio().clamp(0.0, 1.0)
    }

    /// Full rank title, e.g. "筑基 中期".
    pub fn title(&self) -> String {
        format!("{} {}", self.rank, self.stage)
    }

    /// The rank ladder with each step marked reached or not for this record.
    pub fn milestones(&self) -> Vec<Milestone> {
        RANK_LADDER
            .iter()
            .map(|&(level, name, threshold)| Milestone {
                level,
                name,
                threshold,
                reached: level <= self.level,
                current: level == self.level,
            })
            .collect()
    }
}

/// (level, realm, experience threshold)
const RANK_LADDER: [(u32, &str, u64); 6] = [
    (1, "凡人", 0),
    (2, "练气", 500),
    (3, "筑基", 2000),
    (4, "结丹", 5000),
    (5, "元婴", 10000),
    (6, "化神", 20000),
];

/// One step of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub level: u32,
    pub name: &'static str,
    pub threshold: u64,
    pub reached: bool,
    pub current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_unclamped() {
        let mut p = Progression::seed();
        assert!((p.progress_ratio() - 0.648).abs() < 1e-9);
        p.exp = 7500;
        assert!((p.progress_ratio() - 1.5).abs() < 1e-9);
        assert_eq!(p.display_ratio(), 1.0);
    }

    #[test]
    fn test_zero_threshold() {
        let mut p = Progression::seed();
        p.next_level_exp = 0;
        assert_eq!(p.progress_ratio(), 0.0);
    }

    #[test]
    fn test_milestones_follow_level_not_exp() {
        let mut p = Progression::seed();
        p.exp = 50_000;
        let ms = p.milestones();
        assert_eq!(ms.len(), 6);
        assert_eq!(ms.iter().filter(|m| m.reached).count(), 3);
        assert!(ms[2].current);
        assert!(!ms[3].reached);
    }
}
