//! Aggregate statistics over the progress history.

use crate::catalog::ExerciseCatalog;
use crate::progress::{DayStatus, DaySummary, ProgressStore};
use crate::progression::ProgressionEngine;
use crate::types::MuscleGroup;
use crate::Result;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Per muscle group totals
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupStats {
    pub group: MuscleGroup,
    /// Completed exercise entries across all dates
    pub completed: usize,
    /// Dates with at least one completed exercise of this group
    pub days_trained: usize,
    /// Distinct exercises of this group ever completed
    pub unique_exercises: usize,
    /// Exercises of this group in the catalog
    pub catalog_size: usize,
}

/// Statistics for every schedulable group, in [`MuscleGroup::ALL`] order
///
/// Completed ids that are no longer in the catalog are ignored.
pub fn group_stats(progress: &ProgressStore, catalog: &ExerciseCatalog) -> Vec<GroupStats> {
    let mut completed: BTreeMap<MuscleGroup, usize> = BTreeMap::new();
    let mut days: BTreeMap<MuscleGroup, BTreeSet<NaiveDate>> = BTreeMap::new();
    let mut unique: BTreeMap<MuscleGroup, BTreeSet<&str>> = BTreeMap::new();

    for (date, record) in progress.records() {
        for id in &record.completed {
            let Some(group) = catalog.get(id).ok().and_then(|e| e.category.group()) else {
                continue;
            };
            *completed.entry(group).or_default() += 1;
            days.entry(group).or_default().insert(*date);
            unique.entry(group).or_default().insert(id.as_str());
        }
    }

    MuscleGroup::ALL
        .into_iter()
        .map(|group| GroupStats {
            group,
            completed: completed.get(&group).copied().unwrap_or(0),
            days_trained: days.get(&group).map_or(0, |d| d.len()),
            unique_exercises: unique.get(&group).map_or(0, |u| u.len()),
            catalog_size: catalog.in_group(group).count(),
        })
        .collect()
}

/// Monthly calendar roll-up
#[derive(Clone, Debug, PartialEq)]
pub struct MonthStats {
    pub training_days: usize,
    pub completed_days: usize,
    /// Mean ratio over training days; `None` when there were none
    pub average_ratio: Option<f64>,
}

impl MonthStats {
    /// Roll up a month's summaries up to and including `today`
    ///
    /// Rest days and days before the start date are left out.
    pub fn from_summary(summary: &[DaySummary], today: NaiveDate) -> Self {
        let mut training_days = 0;
        let mut completed_days = 0;
        let mut total = 0.0;

        for day in summary.iter().filter(|d| d.date <= today) {
            if let DayStatus::Training { ratio, complete, .. } = day.status {
                training_days += 1;
                total += ratio;
                if complete {
                    completed_days += 1;
                }
            }
        }

        Self {
            training_days,
            completed_days,
            average_ratio: (training_days > 0).then(|| total / training_days as f64),
        }
    }
}

/// Number of completed training days from the start date through `today`
pub fn total_workouts(
    progress: &ProgressStore,
    engine: &ProgressionEngine,
    today: NaiveDate,
) -> Result<usize> {
    Ok(progress
        .daily_ratios(engine, today)?
        .into_iter()
        .filter_map(|(_, ratio)| ratio)
        .filter(|r| engine.is_complete(*r))
        .count())
}

/// Completed training days per calendar month, oldest first
///
/// Every month from the start date through `today` appears, including
/// months with no completed workouts.
pub fn monthly_workouts(
    progress: &ProgressStore,
    engine: &ProgressionEngine,
    today: NaiveDate,
) -> Result<Vec<((i32, u32), usize)>> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for (date, ratio) in progress.daily_ratios(engine, today)? {
        let count = months.entry((date.year(), date.month())).or_default();
        if ratio.is_some_and(|r| engine.is_complete(r)) {
            *count += 1;
        }
    }
    Ok(months.into_iter().collect())
}
