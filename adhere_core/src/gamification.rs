//! Dose streak tracking and achievement unlocks.
//!
//! The streak transition is a pure function of the previous state and the
//! dose timestamp; the store wraps it with per-user persistence and the
//! idempotent achievement unlock rules.

use crate::repo::{Collection, Record};
use crate::storage::Backend;
use crate::{Achievement, Result, StreakData};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Achievement rule-table entry
#[derive(Clone, Copy, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// All achievements the system can award
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first-dose",
        name: "First Step",
        description: "Take your first medication dose",
        icon: "🎯",
    },
    AchievementDef {
        id: "week-streak",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "🔥",
    },
    AchievementDef {
        id: "month-streak",
        name: "Monthly Master",
        description: "Maintain a 30-day streak",
        icon: "💪",
    },
    AchievementDef {
        id: "hundred-doses",
        name: "Century Club",
        description: "Take 100 doses total",
        icon: "💯",
    },
    AchievementDef {
        id: "perfect-week",
        name: "Perfect Week",
        description: "Complete all doses for 7 days",
        icon: "⭐",
    },
];

impl Record for Achievement {
    fn id(&self) -> &str {
        &self.id
    }
}

impl StreakData {
    /// Apply one recorded dose at `now`.
    ///
    /// Rules, in order:
    /// 1. No prior dose, or under 48h elapsed on a different calendar date:
    ///    the streak grows.
    /// 2. Same calendar date as the last dose: the streak is unchanged
    ///    (same-day doses never double-count).
    /// 3. Anything else: the streak resets to 1.
    pub fn record_dose(&mut self, now: DateTime<Utc>) {
        let consecutive = self.last_dose_date.map(|last| {
            now - last < Duration::hours(48) && now.date_naive() != last.date_naive()
        });

        match (self.last_dose_date, consecutive) {
            (None, _) | (_, Some(true)) => self.current_streak += 1,
            (Some(last), _) if now.date_naive() == last.date_naive() => {}
            _ => self.current_streak = 1,
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.total_doses_taken += 1;
        self.last_dose_date = Some(now);
    }
}

/// Rule table evaluated after each transition (exact-match thresholds).
///
/// `week-streak` and `perfect-week` both fire at a 7-day streak, preserving
/// the original system's literal behavior.
pub fn earned_achievements(streak: &StreakData) -> Vec<&'static AchievementDef> {
    let mut earned = Vec::new();
    if streak.total_doses_taken == 1 {
        earned.push(&ACHIEVEMENTS[0]); // first-dose
    }
    if streak.current_streak == 7 {
        earned.push(&ACHIEVEMENTS[1]); // week-streak
    }
    if streak.current_streak == 30 {
        earned.push(&ACHIEVEMENTS[2]); // month-streak
    }
    if streak.total_doses_taken == 100 {
        earned.push(&ACHIEVEMENTS[3]); // hundred-doses
    }
    if streak.current_streak == 7 {
        earned.push(&ACHIEVEMENTS[4]); // perfect-week
    }
    earned
}

/// Result of recording a dose
#[derive(Clone, Debug)]
pub struct DoseOutcome {
    pub streak: StreakData,
    /// Achievements newly unlocked by this dose
    pub unlocked: Vec<Achievement>,
}

/// Derives streak and achievement state from the dose-taken signal
pub struct GamificationStore {
    backend: Arc<dyn Backend>,
    user_id: String,
}

impl GamificationStore {
    pub fn new(backend: Arc<dyn Backend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
        }
    }

    fn streak_key(&self) -> String {
        format!("streak_{}", self.user_id)
    }

    fn achievement_collection(&self) -> Collection<Achievement> {
        Collection::new(format!("achievements_{}", self.user_id))
    }

    /// Current streak state (default when absent or unparseable)
    pub fn streak(&self) -> StreakData {
        let raw = match self.backend.read(&self.streak_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StreakData::default(),
            Err(e) => {
                tracing::warn!("Failed to read streak: {}. Using default.", e);
                return StreakData::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(streak) => streak,
            Err(e) => {
                tracing::warn!("Failed to parse streak: {}. Using default.", e);
                StreakData::default()
            }
        }
    }

    /// Unlocked achievements, in unlock order
    pub fn achievements(&self) -> Vec<Achievement> {
        self.achievement_collection().load(self.backend.as_ref())
    }

    /// Record a dose taken now
    pub fn record_dose_taken(&self) -> Result<DoseOutcome> {
        self.record_dose_taken_at(Utc::now())
    }

    /// Record a dose taken at a specific time (injectable for tests)
    pub fn record_dose_taken_at(&self, now: DateTime<Utc>) -> Result<DoseOutcome> {
        let mut streak = self.streak();
        streak.record_dose(now);

        let contents = serde_json::to_string(&streak)?;
        self.backend.write(&self.streak_key(), &contents)?;

        let collection = self.achievement_collection();
        let mut unlocked_all = collection.load(self.backend.as_ref());
        let mut newly_unlocked = Vec::new();

        for def in earned_achievements(&streak) {
            // Idempotent: an already-unlocked id is never added again
            if unlocked_all.iter().any(|a| a.id == def.id) {
                continue;
            }
            let achievement = Achievement {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                unlocked_at: now,
            };
            unlocked_all.push(achievement.clone());
            newly_unlocked.push(achievement);
            tracing::info!("Achievement unlocked: {}", def.name);
        }

        if !newly_unlocked.is_empty() {
            collection.store(self.backend.as_ref(), &unlocked_all)?;
        }

        tracing::debug!(
            "Dose recorded: streak {}, total {}",
            streak.current_streak,
            streak.total_doses_taken
        );

        Ok(DoseOutcome {
            streak,
            unlocked: newly_unlocked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use chrono::TimeZone;

    fn store() -> GamificationStore {
        GamificationStore::new(Arc::new(MemoryBackend::new()), "u1")
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_first_dose_starts_streak_and_unlocks() {
        let store = store();
        let outcome = store.record_dose_taken_at(at(1, 9)).unwrap();

        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.streak.total_doses_taken, 1);
        assert_eq!(outcome.unlocked.len(), 1);
        assert_eq!(outcome.unlocked[0].id, "first-dose");
    }

    #[test]
    fn test_same_day_dose_does_not_double_count() {
        let store = store();
        store.record_dose_taken_at(at(1, 9)).unwrap();
        let outcome = store.record_dose_taken_at(at(1, 21)).unwrap();

        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.streak.total_doses_taken, 2);
        // first-dose is not unlocked a second time
        assert!(outcome.unlocked.is_empty());
        assert_eq!(store.achievements().len(), 1);
    }

    #[test]
    fn test_seven_consecutive_days_unlocks_both_week_achievements() {
        let store = store();
        let mut last = None;
        for day in 1..=7 {
            last = Some(store.record_dose_taken_at(at(day, 9)).unwrap());
        }

        let outcome = last.unwrap();
        assert_eq!(outcome.streak.current_streak, 7);

        let ids: Vec<&str> = outcome.unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["week-streak", "perfect-week"]);
    }

    #[test]
    fn test_gap_resets_streak_to_one() {
        let store = store();
        store.record_dose_taken_at(at(1, 9)).unwrap();
        store.record_dose_taken_at(at(2, 9)).unwrap();

        // Two skipped days: 48h+ elapsed
        let outcome = store.record_dose_taken_at(at(5, 9)).unwrap();
        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.streak.longest_streak, 2);
        assert_eq!(outcome.streak.total_doses_taken, 3);
    }

    #[test]
    fn test_under_48h_on_different_date_counts_as_consecutive() {
        let store = store();
        // Late dose one day, early dose two calendar days later, 47h apart
        store.record_dose_taken_at(at(1, 23)).unwrap();
        let outcome = store.record_dose_taken_at(at(3, 22)).unwrap();
        assert_eq!(outcome.streak.current_streak, 2);
    }

    #[test]
    fn test_longest_streak_survives_reset() {
        let store = store();
        for day in 1..=3 {
            store.record_dose_taken_at(at(day, 9)).unwrap();
        }
        let outcome = store.record_dose_taken_at(at(10, 9)).unwrap();

        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.streak.longest_streak, 3);
    }

    #[test]
    fn test_month_streak_rule_fires_at_thirty() {
        let mut streak = StreakData::default();
        let start = at(1, 9);
        for i in 0..30 {
            streak.record_dose(start + Duration::days(i));
        }
        assert_eq!(streak.current_streak, 30);

        let ids: Vec<&str> = earned_achievements(&streak).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["month-streak"]);
    }

    #[test]
    fn test_hundred_doses_rule_is_exact_match() {
        let mut streak = StreakData {
            current_streak: 1,
            longest_streak: 5,
            last_dose_date: Some(at(1, 9)),
            total_doses_taken: 99,
        };
        streak.record_dose(at(1, 21));
        assert_eq!(streak.total_doses_taken, 100);

        let ids: Vec<&str> = earned_achievements(&streak).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["hundred-doses"]);

        // 101st dose no longer matches
        streak.record_dose(at(1, 22));
        assert!(earned_achievements(&streak).is_empty());
    }

    #[test]
    fn test_corrupted_streak_resets_to_default() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        backend.write("streak_u1", "{ broken").unwrap();

        let store = GamificationStore::new(backend, "u1");
        let outcome = store.record_dose_taken_at(at(1, 9)).unwrap();
        assert_eq!(outcome.streak.current_streak, 1);
    }

    #[test]
    fn test_streaks_are_per_user() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let alice = GamificationStore::new(backend.clone(), "alice");
        let bob = GamificationStore::new(backend.clone(), "bob");

        alice.record_dose_taken_at(at(1, 9)).unwrap();
        alice.record_dose_taken_at(at(2, 9)).unwrap();

        assert_eq!(alice.streak().current_streak, 2);
        assert_eq!(bob.streak().current_streak, 0);
        assert!(bob.achievements().is_empty());
    }
}
