//! Training plan configuration: level definitions and the fixed opening weeks.
//!
//! The plan is persisted together with the exercise list as a single
//! "plan document". Loading it validates every cross reference so that a
//! hand-edited file fails up front with `CorruptState` instead of at
//! schedule time.

use crate::catalog::{build_default_exercises, ExerciseCatalog};
use crate::types::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Weeks spent on each level before moving up (the last level is open-ended)
pub const DEFAULT_WEEKS_PER_LEVEL: u32 = 4;

/// Level definitions plus the hand-written templates for the first weeks
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub weeks_per_level: u32,
    pub levels: Vec<LevelDefinition>,
    /// Templates for weeks 1..=n, used verbatim while on level 1
    #[serde(default)]
    pub fixed_weeks: Vec<WeekTemplate>,
}

impl TrainingPlan {
    /// The level a (1-based) week number falls in
    ///
    /// Returns `None` only for a plan without levels, which validation rejects.
    pub fn level_for_week(&self, week: u32) -> Option<&LevelDefinition> {
        let idx = (week.max(1) - 1) / self.weeks_per_level.max(1);
        self.levels
            .get(idx as usize)
            .or_else(|| self.levels.last())
    }

    /// 1-based progression tier of a week
    ///
    /// Equal to the level number up to the last level, then keeps counting
    /// one tier per `weeks_per_level` weeks.
    pub fn tier_for_week(&self, week: u32) -> u32 {
        (week.max(1) - 1) / self.weeks_per_level.max(1) + 1
    }

    /// Starting layout for a generated week
    ///
    /// Levels built on the fixed weeks cycle through them, one per week of
    /// the level. `None` means the level template is used on its own.
    pub fn base_week(&self, week: u32) -> Option<&WeekTemplate> {
        let level = self.level_for_week(week)?;
        if level.base != WeekBase::FixedWeeks {
            return None;
        }
        let cycle = (week.max(1) - 1) % self.weeks_per_level.max(1);
        self.fixed_weeks.get(cycle as usize)
    }

    /// Fixed template for a week, if one is configured
    pub fn fixed_week(&self, week: u32) -> Option<&WeekTemplate> {
        if week == 0 {
            return None;
        }
        self.fixed_weeks.get(week as usize - 1)
    }

    /// Cross-check the plan against a catalog
    ///
    /// Returns a list of validation errors, or empty vec if valid.
    pub fn validate(&self, catalog: &ExerciseCatalog) -> Vec<String> {
        let mut errors = Vec::new();

        if self.weeks_per_level == 0 {
            errors.push("weeks_per_level must be at least 1".to_string());
        }
        if self.levels.is_empty() {
            errors.push("Plan defines no levels".to_string());
        }
        if self.fixed_weeks.len() > self.weeks_per_level as usize {
            errors.push(format!(
                "{} fixed weeks configured but level 1 only spans {} weeks",
                self.fixed_weeks.len(),
                self.weeks_per_level
            ));
        }

        for (i, level) in self.levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if level.level != expected {
                errors.push(format!(
                    "Level at position {} is numbered {} (expected {})",
                    i, level.level, expected
                ));
            }
            if level.intensity.sets == 0 || level.intensity.reps_min > level.intensity.reps_max {
                errors.push(format!("Level {} has an invalid intensity", level.level));
            }
            if level.min_training_days > 7 || level.abs_days_per_week > 7 {
                errors.push(format!(
                    "Level {} asks for more than 7 days per week",
                    level.level
                ));
            }
            if level.base == WeekBase::FixedWeeks
                && self.fixed_weeks.len() < self.weeks_per_level as usize
            {
                errors.push(format!(
                    "Level {} rotates through the fixed weeks but only {} of {} are configured",
                    level.level,
                    self.fixed_weeks.len(),
                    self.weeks_per_level
                ));
            }
            if level.training_days() == 0 {
                errors.push(format!("Level {} has no training days", level.level));
            }
            check_template(&level.template, catalog, &format!("level {}", level.level), &mut errors);
        }

        for (i, template) in self.fixed_weeks.iter().enumerate() {
            check_template(template, catalog, &format!("fixed week {}", i + 1), &mut errors);
        }

        if catalog.in_group(MuscleGroup::Forearms).next().is_none() {
            errors.push("Catalog has no forearm exercises".to_string());
        }
        if catalog
            .in_group(MuscleGroup::Abs)
            .all(|e| e.difficulty.is_advanced())
        {
            errors.push("Catalog has no basic abdominal exercises".to_string());
        }

        errors
    }

    /// The built-in 4-level progression
    pub fn builtin() -> Self {
        use MuscleGroup::*;

        fn week(days: [&[MuscleGroup]; 7]) -> WeekTemplate {
            WeekTemplate::from_days(days.map(|d| d.to_vec()))
        }

        let fixed_weeks = vec![
            week([&[Chest, Shoulders], &[], &[], &[Back, Arms], &[Legs, Abs], &[Cardio, Abs], &[]]),
            week([&[Chest, Arms], &[], &[], &[Back, Shoulders], &[Legs, Abs], &[Cardio, Abs], &[]]),
            week([&[Chest, Shoulders, Abs], &[], &[], &[Back, Arms], &[Legs], &[Cardio, Abs], &[]]),
            week([&[Chest, Arms], &[], &[], &[Back, Shoulders, Abs], &[Legs, Abs], &[Cardio], &[]]),
        ];

        let levels = vec![
            LevelDefinition {
                level: 1,
                name: "Beginner".into(),
                description: "4 workouts, 3 rest days".into(),
                template: fixed_weeks[0].clone(),
                base: WeekBase::LevelTemplate,
                abs_days_per_week: 2,
                min_training_days: 4,
                intensity: Intensity { sets: 3, reps_min: 8, reps_max: 12 },
            },
            LevelDefinition {
                level: 2,
                name: "Intermediate".into(),
                description: "5 workouts, 2 rest days".into(),
                template: week([&[], &[Shoulders, Abs], &[], &[], &[], &[], &[]]),
                base: WeekBase::FixedWeeks,
                abs_days_per_week: 3,
                min_training_days: 5,
                intensity: Intensity { sets: 3, reps_min: 10, reps_max: 12 },
            },
            LevelDefinition {
                level: 3,
                name: "Advanced".into(),
                description: "5 intensified workouts, 2 rest days (Wed, Sun)".into(),
                template: week([&[], &[Shoulders, Abs, Cardio], &[], &[], &[], &[], &[]]),
                base: WeekBase::FixedWeeks,
                abs_days_per_week: 3,
                min_training_days: 5,
                intensity: Intensity { sets: 4, reps_min: 10, reps_max: 12 },
            },
            LevelDefinition {
                level: 4,
                name: "Expert".into(),
                description: "6 workouts, 1 rest day (Sun)".into(),
                template: week([
                    &[Chest, Shoulders, Abs],
                    &[Back, Arms],
                    &[Legs, Abs],
                    &[Chest, Arms],
                    &[Back, Shoulders, Abs],
                    &[Legs, Cardio],
                    &[],
                ]),
                base: WeekBase::LevelTemplate,
                abs_days_per_week: 3,
                min_training_days: 6,
                intensity: Intensity { sets: 4, reps_min: 8, reps_max: 10 },
            },
        ];

        Self {
            weeks_per_level: DEFAULT_WEEKS_PER_LEVEL,
            levels,
            fixed_weeks,
        }
    }
}

fn check_template(
    template: &WeekTemplate,
    catalog: &ExerciseCatalog,
    label: &str,
    errors: &mut Vec<String>,
) {
    for day in template.days() {
        for group in day {
            if catalog.in_group(*group).next().is_none() {
                errors.push(format!(
                    "{} schedules {} but the catalog has no {} exercises",
                    label, group, group
                ));
            }
        }
    }
}

/// On-disk form of the exercise list and training plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDocument {
    pub exercises: Vec<Exercise>,
    pub plan: TrainingPlan,
}

impl PlanDocument {
    pub fn builtin() -> Self {
        Self {
            exercises: build_default_exercises(),
            plan: TrainingPlan::builtin(),
        }
    }

    pub fn from_parts(catalog: &ExerciseCatalog, plan: &TrainingPlan) -> Self {
        Self {
            exercises: catalog.exercises().to_vec(),
            plan: plan.clone(),
        }
    }

    /// Validate and split into a catalog and a plan
    pub fn into_parts(self) -> Result<(ExerciseCatalog, TrainingPlan)> {
        let catalog = ExerciseCatalog::new(self.exercises)?;
        let errors = self.plan.validate(&catalog);
        if !errors.is_empty() {
            return Err(Error::corrupt("plan document", errors.join("; ")));
        }
        Ok((catalog, self.plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plan_validates() {
        let (catalog, plan) = PlanDocument::builtin().into_parts().unwrap();
        assert!(plan.validate(&catalog).is_empty());
        assert_eq!(plan.levels.len(), 4);
        assert_eq!(plan.fixed_weeks.len(), 4);
    }

    #[test]
    fn test_level_for_week_boundaries() {
        let plan = TrainingPlan::builtin();
        let level = |w| plan.level_for_week(w).unwrap().level;
        assert_eq!(level(1), 1);
        assert_eq!(level(4), 1);
        assert_eq!(level(5), 2);
        assert_eq!(level(8), 2);
        assert_eq!(level(9), 3);
        assert_eq!(level(12), 3);
        assert_eq!(level(13), 4);
        assert_eq!(level(40), 4);
    }

    #[test]
    fn test_tier_keeps_counting_past_last_level() {
        let plan = TrainingPlan::builtin();
        assert_eq!(plan.tier_for_week(1), 1);
        assert_eq!(plan.tier_for_week(16), 4);
        assert_eq!(plan.tier_for_week(17), 5);
        assert_eq!(plan.level_for_week(17).unwrap().level, 4);
    }

    #[test]
    fn test_base_week_rotates_through_fixed_weeks() {
        let plan = TrainingPlan::builtin();
        assert!(plan.base_week(1).is_none());
        assert_eq!(plan.base_week(5), plan.fixed_week(1));
        assert_eq!(plan.base_week(6), plan.fixed_week(2));
        assert_eq!(plan.base_week(12), plan.fixed_week(4));
        // level 4 has its own layout
        assert!(plan.base_week(13).is_none());
    }

    #[test]
    fn test_rotation_without_enough_fixed_weeks_is_corrupt() {
        let mut doc = PlanDocument::builtin();
        doc.plan.fixed_weeks.truncate(2);
        assert!(doc.into_parts().unwrap_err().is_corrupt_state());
    }

    #[test]
    fn test_fixed_week_lookup() {
        let plan = TrainingPlan::builtin();
        assert!(plan.fixed_week(0).is_none());
        assert!(plan.fixed_week(4).is_some());
        assert!(plan.fixed_week(5).is_none());
    }

    #[test]
    fn test_plan_without_forearms_is_corrupt() {
        let mut doc = PlanDocument::builtin();
        doc.exercises
            .retain(|e| e.category != Category::Strength(MuscleGroup::Forearms));
        let err = doc.into_parts().unwrap_err();
        assert!(err.is_corrupt_state());
    }

    #[test]
    fn test_misnumbered_levels_are_corrupt() {
        let mut doc = PlanDocument::builtin();
        doc.plan.levels.swap(0, 1);
        assert!(doc.into_parts().unwrap_err().is_corrupt_state());
    }

    #[test]
    fn test_document_json_roundtrip() {
        let doc = PlanDocument::builtin();
        let json = serde_json::to_string_pretty(&doc).unwrap();
        let parsed: PlanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.plan, doc.plan);
        assert_eq!(parsed.exercises, doc.exercises);
    }
}
