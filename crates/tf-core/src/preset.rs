//! Session presets and the daily essentials goal.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::HistoryItem;
use crate::task::Task;
use crate::types::{Minutes, PresetId, TaskId};

/// A reusable session template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub duration: Minutes,
    pub color: String,
    pub accent: String,
    pub icon: String,
    /// Counts toward the daily essentials goal.
    #[serde(default)]
    pub is_essential: bool,
}

impl Preset {
    /// Creates a queue task from this preset.
    pub fn activate(&self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::generate(),
            name: self.name.clone(),
            duration: self.duration,
            color: self.color.clone(),
            accent: Some(self.accent.clone()),
            icon: Some(self.icon.clone()),
            created_at: now,
        }
    }
}

/// Presets seeded into a fresh store.
pub fn default_presets() -> Vec<Preset> {
    [
        ("p1", "沉浸工作", 60, "text-zinc-600", "#2563eb", "work", false),
        ("p2", "闲适时光", 30, "text-amber-900", "#f59e0b", "chat", false),
        ("p3", "畅快游戏", 90, "text-indigo-900", "#7c3aed", "game", true),
        ("p4", "静心冥想", 20, "text-teal-900", "#059669", "flow", true),
        ("p5", "自我提升", 45, "text-rose-900", "#e11d48", "read", true),
        ("p6", "燃脂运动", 40, "text-orange-900", "#0891b2", "gym", false),
    ]
    .into_iter()
    .filter_map(|(id, name, minutes, color, accent, icon, is_essential)| {
        Some(Preset {
            id: PresetId::new(id).ok()?,
            name: name.to_string(),
            duration: Minutes::new(minutes).ok()?,
            color: color.to_string(),
            accent: accent.to_string(),
            icon: icon.to_string(),
            is_essential,
        })
    })
    .collect()
}

/// Finds a preset by ID, falling back to an exact name match.
pub fn find_preset<'a>(presets: &'a [Preset], key: &str) -> Option<&'a Preset> {
    presets
        .iter()
        .find(|p| p.id.as_str() == key)
        .or_else(|| presets.iter().find(|p| p.name == key))
}

/// How many essential presets were done on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EssentialProgress {
    pub total: usize,
    pub current: usize,
}

impl EssentialProgress {
    pub const fn is_met(&self) -> bool {
        self.total > 0 && self.current >= self.total
    }

    /// Completion percentage, 0 when there are no essentials.
    #[expect(
        clippy::cast_precision_loss,
        reason = "essential counts are tiny"
    )]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.current as f64 / self.total as f64 * 100.0
    }
}

/// Counts distinct essential presets with a record on `today`, matched by name.
pub fn essential_progress(
    presets: &[Preset],
    history: &[HistoryItem],
    today: NaiveDate,
) -> EssentialProgress {
    let essentials: Vec<&Preset> = presets.iter().filter(|p| p.is_essential).collect();
    if essentials.is_empty() {
        return EssentialProgress {
            total: 0,
            current: 0,
        };
    }

    let done_today: HashSet<&str> = history
        .iter()
        .filter(|h| h.parsed_date() == Some(today))
        .map(|h| h.name.as_str())
        .collect();
    let current = essentials
        .iter()
        .filter(|p| done_today.contains(p.name.as_str()))
        .count();

    EssentialProgress {
        total: essentials.len(),
        current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HistoryId;
    use chrono::TimeZone;

    fn done(name: &str, date: &str) -> HistoryItem {
        HistoryItem {
            id: HistoryId::generate(),
            date: date.to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:30".to_string(),
            name: name.to_string(),
            note: String::new(),
            color: String::new(),
            accent: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).expect("valid test date")
    }

    #[test]
    fn defaults_have_three_essentials() {
        let presets = default_presets();
        assert_eq!(presets.len(), 6);
        assert_eq!(presets.iter().filter(|p| p.is_essential).count(), 3);
    }

    #[test]
    fn activate_copies_styling() {
        let presets = default_presets();
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 8, 0, 0).unwrap();
        let task = presets[4].activate(now);

        assert_eq!(task.name, "自我提升");
        assert_eq!(task.duration.get(), 45);
        assert_eq!(task.accent.as_deref(), Some("#e11d48"));
        assert_eq!(task.icon.as_deref(), Some("read"));
        assert_eq!(task.created_at, now);
    }

    #[test]
    fn find_by_id_or_name() {
        let presets = default_presets();
        assert_eq!(find_preset(&presets, "p4").unwrap().name, "静心冥想");
        assert_eq!(find_preset(&presets, "燃脂运动").unwrap().id.as_str(), "p6");
        assert!(find_preset(&presets, "missing").is_none());
    }

    #[test]
    fn progress_counts_distinct_essentials_today() {
        let presets = default_presets();
        let history = [
            done("静心冥想", "2024-04-02"),
            done("静心冥想", "2024/4/2"),
            done("畅快游戏", "2024-04-01"),
            done("沉浸工作", "2024-04-02"),
            done("自我提升", "not a date"),
        ];
        let progress = essential_progress(&presets, &history, today());

        assert_eq!(progress, EssentialProgress { total: 3, current: 1 });
        assert!(!progress.is_met());
        assert!((progress.percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn progress_is_met_when_all_done() {
        let presets = default_presets();
        let history = [
            done("畅快游戏", "2024-04-02"),
            done("静心冥想", "2024-04-02"),
            done("自我提升", "2024-04-02"),
        ];
        assert!(essential_progress(&presets, &history, today()).is_met());
    }

    #[test]
    fn no_essentials_means_empty_goal() {
        let mut presets = default_presets();
        for p in &mut presets {
            p.is_essential = false;
        }
        let progress = essential_progress(&presets, &[], today());
        assert_eq!(progress.total, 0);
        assert!(!progress.is_met());
        assert!(progress.percent().abs() < f64::EPSILON);
    }
}
