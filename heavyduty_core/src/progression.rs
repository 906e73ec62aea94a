//! Progression engine: calendar dates to weeks, levels and day schedules.
//!
//! All queries are pure; the engine only borrows the catalog and plan.

use crate::catalog::ExerciseCatalog;
use crate::plan::TrainingPlan;
use crate::schedule::ScheduleStrategy;
use crate::types::*;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Fraction of a day's planned exercises needed for the day to count as done
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.80;

/// Name given to tiers beyond the last configured level
pub const MASTER_TIER_NAME: &str = "Master";

/// Tolerance for float comparisons against the threshold
const RATIO_EPSILON: f64 = 1e-9;

/// 1-based training week containing `date`
///
/// Weeks are counted in whole 7-day blocks from `start` itself, whatever
/// weekday that is. Dates before `start` clamp to week 1.
pub fn week_of(date: NaiveDate, start: NaiveDate) -> u32 {
    let days = (date - start).num_days();
    if days < 0 {
        return 1;
    }
    (days / 7) as u32 + 1
}

#[derive(Clone, Copy, Debug)]
pub struct ProgressionEngine<'a> {
    catalog: &'a ExerciseCatalog,
    plan: &'a TrainingPlan,
    threshold: f64,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(catalog: &'a ExerciseCatalog, plan: &'a TrainingPlan) -> Self {
        Self {
            catalog,
            plan,
            threshold: DEFAULT_COMPLETION_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &'a ExerciseCatalog {
        self.catalog
    }

    pub fn plan(&self) -> &'a TrainingPlan {
        self.plan
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn level_of(&self, week: u32) -> Result<&'a LevelDefinition> {
        self.plan
            .level_for_week(week)
            .ok_or_else(|| Error::corrupt("training plan", "no levels defined"))
    }

    /// Header information for a week
    ///
    /// Past the last level the schedule stays the same but the tier keeps
    /// counting, named `Master 2`, `Master 3` and so on.
    pub fn week_info(&self, week: u32) -> Result<WeekInfo> {
        let level = self.level_of(week)?;
        let week = week.max(1);
        let span = self.plan.weeks_per_level.max(1);
        let tier = self.plan.tier_for_week(week).max(level.level);
        let (level_name, description) = if tier > level.level {
            (
                format!("{} {}", MASTER_TIER_NAME, tier - level.level + 1),
                format!("Elite plan: {}", level.description),
            )
        } else {
            (level.name.clone(), level.description.clone())
        };
        Ok(WeekInfo {
            week,
            level: level.level,
            tier,
            level_name,
            description,
            week_in_level: (week - 1) % span + 1,
            weeks_completed: week - 1,
        })
    }

    /// Pick the schedule strategy for a week
    ///
    /// Level-1 weeks with a configured template are fixed; every other week
    /// is generated from its level.
    pub fn strategy_for(&self, week: u32) -> Result<ScheduleStrategy<'a>> {
        let week = week.max(1);
        let level = self.level_of(week)?;
        let strategy = match self.plan.fixed_week(week) {
            Some(template) if level.level == 1 => ScheduleStrategy::FixedWeek {
                week,
                level,
                template,
            },
            _ => ScheduleStrategy::GeneratedLevel {
                week,
                level,
                base: self.plan.base_week(week),
            },
        };
        Ok(strategy)
    }

    pub fn week_plan(&self, week: u32) -> Result<WeekPlan> {
        self.strategy_for(week)?.build(self.catalog)
    }

    /// The plan for `date` in a training block starting on `start`
    ///
    /// Rest days yield an empty exercise list, not an error.
    pub fn schedule_for(&self, date: NaiveDate, start: NaiveDate) -> Result<DaySchedule> {
        if date < start {
            return Err(Error::InvalidDate { date, start });
        }
        self.schedule_in_week(date, week_of(date, start))
    }

    /// The plan for `date` as if it fell in `week`
    ///
    /// Used to re-derive a day from a stored week snapshot.
    pub fn schedule_in_week(&self, date: NaiveDate, week: u32) -> Result<DaySchedule> {
        let plan = self.week_plan(week)?;
        let weekday = date.weekday();
        let (groups, exercises) = match plan.day(weekday) {
            Some(day) => (day.groups.clone(), day.exercises.clone()),
            None => (Vec::new(), Vec::new()),
        };
        Ok(DaySchedule {
            date,
            week: plan.week,
            level: plan.level,
            weekday,
            groups,
            exercises,
        })
    }

    /// Share of the day's planned exercises found in `completed`
    ///
    /// `None` on rest days, which never count toward streaks or averages.
    pub fn completion_ratio(
        &self,
        date: NaiveDate,
        start: NaiveDate,
        completed: &BTreeSet<String>,
    ) -> Result<Option<f64>> {
        Ok(self.schedule_for(date, start)?.completion_ratio(completed))
    }

    pub fn is_complete(&self, ratio: f64) -> bool {
        ratio + RATIO_EPSILON >= self.threshold
    }
}
