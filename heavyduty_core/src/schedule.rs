//! Week schedule strategies.
//!
//! A week is either taken verbatim from a fixed template (the opening weeks
//! of level 1) or generated from the level's base template. Generation runs
//! in a fixed order:
//!
//! 1. start from the base layout without forearms: the level template, or
//!    for levels built on the fixed weeks, this week's fixed week with the
//!    level template filling its rest days
//! 2. level 2+: add one complementary group to each light day
//! 3. level 3+: convert rest days until the weekly volume target is met
//! 4. balance abdominal days to the level's target
//! 5. expand groups to exercises and append one rotating forearm exercise
//!
//! Complement tie-break: a day with fewer than three groups gets at most one
//! complement. Among the complements of its groups that are not already on
//! that day, the one trained least so far this week wins; equal counts go to
//! the group listed first on the day.

use crate::catalog::ExerciseCatalog;
use crate::types::*;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};

/// Days with this many groups are left alone when adding complements
const MAX_GROUPS_FOR_COMPLEMENT: usize = 3;

/// How a week's schedule is produced
#[derive(Clone, Copy, Debug)]
pub enum ScheduleStrategy<'a> {
    /// Hand-written template from configuration
    FixedWeek {
        week: u32,
        level: &'a LevelDefinition,
        template: &'a WeekTemplate,
    },
    /// Derived from the level's base template
    GeneratedLevel {
        week: u32,
        level: &'a LevelDefinition,
        /// Rotating fixed week the level builds on, if any
        base: Option<&'a WeekTemplate>,
    },
}

impl<'a> ScheduleStrategy<'a> {
    pub fn week(&self) -> u32 {
        match self {
            ScheduleStrategy::FixedWeek { week, .. } | ScheduleStrategy::GeneratedLevel { week, .. } => *week,
        }
    }

    pub fn level(&self) -> &'a LevelDefinition {
        match self {
            ScheduleStrategy::FixedWeek { level, .. } | ScheduleStrategy::GeneratedLevel { level, .. } => *level,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, ScheduleStrategy::FixedWeek { .. })
    }

    /// Muscle groups for each weekday, Monday first
    pub fn groups(&self) -> [Vec<MuscleGroup>; 7] {
        match self {
            ScheduleStrategy::FixedWeek { template, .. } => template.days().map(|d| d.to_vec()),
            ScheduleStrategy::GeneratedLevel { level, base, .. } => generate_groups(level, *base),
        }
    }

    /// Expand the week into concrete exercises
    pub fn build(&self, catalog: &ExerciseCatalog) -> Result<WeekPlan> {
        let week = self.week();
        let level = self.level();
        let groups = self.groups();

        let forearms: Vec<&Exercise> = catalog.in_group(MuscleGroup::Forearms).collect();

        let mut days = Vec::with_capacity(7);
        for (day_idx, (weekday, day_groups)) in WEEKDAYS.into_iter().zip(groups).enumerate() {
            let mut exercises = Vec::new();
            let mut seen = HashSet::new();

            for group in &day_groups {
                if *group == MuscleGroup::Forearms {
                    continue;
                }
                for exercise in group_exercises(catalog, *group, level.level) {
                    if seen.insert(exercise.id.as_str()) {
                        exercises.push(self.prescribe(exercise, *group));
                    }
                }
            }

            let wants_forearm = match self {
                ScheduleStrategy::FixedWeek { .. } => day_groups.contains(&MuscleGroup::Forearms),
                ScheduleStrategy::GeneratedLevel { .. } => !day_groups.is_empty(),
            };
            if wants_forearm {
                if forearms.is_empty() {
                    return Err(Error::NotFound("forearm exercises in catalog".into()));
                }
                let pick = forearm_index(week, day_idx, forearms.len());
                exercises.push(self.prescribe(forearms[pick], MuscleGroup::Forearms));
            }

            days.push(DayPlan {
                weekday,
                groups: day_groups,
                exercises,
            });
        }

        tracing::debug!(
            week,
            level = level.level,
            fixed = self.is_fixed(),
            "Built week plan"
        );

        Ok(WeekPlan {
            week,
            level: level.level,
            days,
        })
    }

    fn prescribe(&self, exercise: &Exercise, group: MuscleGroup) -> PlannedExercise {
        let (sets, reps) = match (self, group) {
            (ScheduleStrategy::GeneratedLevel { level, .. }, MuscleGroup::Abs)
            | (ScheduleStrategy::GeneratedLevel { level, .. }, MuscleGroup::Forearms) => {
                (level.intensity.sets, exercise.reps.clone())
            }
            (ScheduleStrategy::GeneratedLevel { level, .. }, g) if g != MuscleGroup::Cardio => {
                (level.intensity.sets, level.intensity.reps_label())
            }
            _ => (exercise.sets, exercise.reps.clone()),
        };
        PlannedExercise {
            id: exercise.id.clone(),
            name: exercise.name.clone(),
            group,
            sets,
            reps,
        }
    }
}

/// Index of the forearm exercise for a given week and weekday (0 = Monday)
pub fn forearm_index(week: u32, day_idx: usize, len: usize) -> usize {
    let slot = (week.max(1) as usize - 1) * 7 + day_idx;
    slot % len.max(1)
}

/// Catalog exercises filling a group slot at a given level
///
/// Abdominal slots draw on the basic set below level 3 and on basic plus
/// advanced from level 3 up.
fn group_exercises(
    catalog: &ExerciseCatalog,
    group: MuscleGroup,
    level: u32,
) -> impl Iterator<Item = &Exercise> + '_ {
    catalog
        .in_group(group)
        .filter(move |e| group != MuscleGroup::Abs || level >= 3 || !e.difficulty.is_advanced())
}

/// Generate weekday groups for a level (Monday first)
///
/// With a `base` week, the level template only contributes on the base's
/// rest days.
pub fn generate_groups(
    level: &LevelDefinition,
    base: Option<&WeekTemplate>,
) -> [Vec<MuscleGroup>; 7] {
    let own = level.template.days();
    let layout = match base {
        Some(base) => {
            let base = base.days();
            std::array::from_fn(|i| if base[i].is_empty() { own[i] } else { base[i] })
        }
        None => own,
    };
    let mut days: [Vec<MuscleGroup>; 7] = layout.map(|d| {
        d.iter()
            .copied()
            .filter(|g| *g != MuscleGroup::Forearms)
            .collect()
    });

    let mut counts: BTreeMap<MuscleGroup, u32> = BTreeMap::new();
    for group in days.iter().flatten() {
        *counts.entry(*group).or_default() += 1;
    }
    let count = |counts: &BTreeMap<MuscleGroup, u32>, g: MuscleGroup| counts.get(&g).copied().unwrap_or(0);

    if level.level >= 2 {
        for day in days.iter_mut() {
            if day.is_empty() || day.len() >= MAX_GROUPS_FOR_COMPLEMENT {
                continue;
            }
            let pick = day
                .iter()
                .filter_map(|g| g.complement())
                .filter(|c| !day.contains(c))
                .min_by_key(|c| count(&counts, *c));
            if let Some(group) = pick {
                day.push(group);
                *counts.entry(group).or_default() += 1;
            }
        }
    }

    if level.level >= 3 {
        while training_days(&days) < level.min_training_days as usize {
            let Some(rest) = days.iter_mut().find(|d| d.is_empty()) else {
                break;
            };
            let group = MuscleGroup::MAJOR
                .into_iter()
                .min_by_key(|g| count(&counts, *g))
                .unwrap_or(MuscleGroup::Legs);
            rest.push(group);
            rest.push(MuscleGroup::Cardio);
            *counts.entry(group).or_default() += 1;
            *counts.entry(MuscleGroup::Cardio).or_default() += 1;
        }
    }

    balance_abs(&mut days, level.abs_days_per_week as usize);
    days
}

fn training_days(days: &[Vec<MuscleGroup>; 7]) -> usize {
    days.iter().filter(|d| !d.is_empty()).count()
}

/// Make the number of training days that include abs match the target
fn balance_abs(days: &mut [Vec<MuscleGroup>; 7], target: usize) {
    let target = target.min(training_days(days));
    let with_abs = |days: &[Vec<MuscleGroup>; 7]| {
        days.iter().filter(|d| d.contains(&MuscleGroup::Abs)).count()
    };

    while with_abs(days) < target {
        let Some(day) = days
            .iter_mut()
            .filter(|d| !d.is_empty() && !d.contains(&MuscleGroup::Abs))
            .min_by_key(|d| d.len())
        else {
            break;
        };
        day.push(MuscleGroup::Abs);
    }

    while with_abs(days) > target {
        let Some(day) = days
            .iter_mut()
            .rev()
            .find(|d| d.contains(&MuscleGroup::Abs) && d.len() > 1)
        else {
            break;
        };
        day.retain(|g| *g != MuscleGroup::Abs);
    }
}
