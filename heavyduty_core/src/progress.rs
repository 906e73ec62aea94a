//! Completion tracking: which exercises were done on which date.
//!
//! Each record remembers the training week it was made in. When a record
//! from one week is touched under a different week (the start date moved),
//! its old completions are dropped so that one week's exercises never count
//! toward another week.

use crate::progression::{week_of, ProgressionEngine};
use crate::types::*;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Completed exercise ids for one date, with the week they were planned in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CompletionRecord {
    pub week: u32,
    #[serde(default)]
    pub completed: BTreeSet<String>,
}

/// Persisted progress document
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProgressStore {
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    days: BTreeMap<NaiveDate, CompletionRecord>,
    /// Best streak seen before the last reset
    #[serde(default)]
    longest_streak: u32,
}

/// Calendar cell for one date
#[derive(Clone, Debug, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub week: Option<u32>,
    pub level: Option<u32>,
    pub status: DayStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DayStatus {
    /// Before the start date, or no start date yet
    NotStarted,
    Rest,
    Training {
        ratio: f64,
        completed: usize,
        planned: usize,
        complete: bool,
        /// A record exists for the date, even if empty
        visited: bool,
    },
}

impl DaySummary {
    pub fn ratio(&self) -> Option<f64> {
        match self.status {
            DayStatus::Training { ratio, .. } => Some(ratio),
            _ => None,
        }
    }
}

impl ProgressStore {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        if self.start_date != Some(date) {
            tracing::info!(%date, "Training start date set");
        }
        self.start_date = Some(date);
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn records(&self) -> &BTreeMap<NaiveDate, CompletionRecord> {
        &self.days
    }

    pub fn record(&self, date: NaiveDate) -> Option<&CompletionRecord> {
        self.days.get(&date)
    }

    /// Completed ids for a date (empty when none)
    pub fn completed_on(&self, date: NaiveDate) -> BTreeSet<String> {
        self.days
            .get(&date)
            .map(|r| r.completed.clone())
            .unwrap_or_default()
    }

    fn require_start(&self) -> Result<NaiveDate> {
        self.start_date
            .ok_or_else(|| Error::InvalidInput("training start date is not set".into()))
    }

    /// Validate a mark/unmark request and return the current week for `date`
    fn check_mark(&self, engine: &ProgressionEngine, date: NaiveDate, id: &str) -> Result<u32> {
        if !engine.catalog().contains(id) {
            return Err(Error::InvalidInput(format!("unknown exercise id '{}'", id)));
        }
        let start = self.require_start()?;
        if date < start {
            return Err(Error::InvalidDate { date, start });
        }
        Ok(week_of(date, start))
    }

    fn record_for_week(&mut self, date: NaiveDate, week: u32) -> &mut CompletionRecord {
        let record = self.days.entry(date).or_insert_with(|| CompletionRecord {
            week,
            completed: BTreeSet::new(),
        });
        if record.week != week {
            tracing::warn!(
                %date,
                old_week = record.week,
                new_week = week,
                "Discarding completions planned for another week"
            );
            record.week = week;
            record.completed.clear();
        }
        record
    }

    /// Mark an exercise done; returns false if it was already marked
    pub fn mark(&mut self, engine: &ProgressionEngine, date: NaiveDate, id: &str) -> Result<bool> {
        let week = self.check_mark(engine, date, id)?;
        let inserted = self.record_for_week(date, week).completed.insert(id.to_string());
        tracing::debug!(%date, id, inserted, "Marked exercise");
        Ok(inserted)
    }

    /// Unmark an exercise; returns false if it was not marked
    ///
    /// The date keeps an (possibly empty) record so it still reads as visited.
    pub fn unmark(&mut self, engine: &ProgressionEngine, date: NaiveDate, id: &str) -> Result<bool> {
        let week = self.check_mark(engine, date, id)?;
        let removed = self.record_for_week(date, week).completed.remove(id);
        tracing::debug!(%date, id, removed, "Unmarked exercise");
        Ok(removed)
    }

    /// Schedule for `date`, honouring the stored week snapshot if there is one
    pub fn schedule_for(&self, engine: &ProgressionEngine, date: NaiveDate) -> Result<DaySchedule> {
        let start = self.require_start()?;
        if date < start {
            return Err(Error::InvalidDate { date, start });
        }
        match self.days.get(&date) {
            Some(record) => engine.schedule_in_week(date, record.week),
            None => engine.schedule_for(date, start),
        }
    }

    /// Completion ratio for a date; `None` on rest days
    pub fn completion_ratio(&self, engine: &ProgressionEngine, date: NaiveDate) -> Result<Option<f64>> {
        let schedule = self.schedule_for(engine, date)?;
        let empty = BTreeSet::new();
        let completed = self.days.get(&date).map_or(&empty, |r| &r.completed);
        Ok(schedule.completion_ratio(completed))
    }

    /// Ratio for every date from the start date through `today`
    ///
    /// Rest days carry `None`. Week plans are built once per week.
    pub fn daily_ratios(
        &self,
        engine: &ProgressionEngine,
        today: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>> {
        let Some(start) = self.start_date else {
            return Ok(Vec::new());
        };

        let mut plans: HashMap<u32, WeekPlan> = HashMap::new();
        let mut out = Vec::new();
        let empty = BTreeSet::new();

        for date in start.iter_days().take_while(|d| *d <= today) {
            let record = self.days.get(&date);
            let week = record.map_or_else(|| week_of(date, start), |r| r.week);
            if !plans.contains_key(&week) {
                plans.insert(week, engine.week_plan(week)?);
            }
            let ratio = plans
                .get(&week)
                .and_then(|plan| plan.day(date.weekday()))
                .and_then(|day| day.completion_ratio(record.map_or(&empty, |r| &r.completed)));
            out.push((date, ratio));
        }

        Ok(out)
    }

    /// Current and longest run of completed training days up to `today`
    ///
    /// Rest days neither extend nor break a run. An unfinished `today` does
    /// not break it either, since the day is still in progress.
    pub fn streak(&self, engine: &ProgressionEngine, today: NaiveDate) -> Result<StreakState> {
        let mut run = 0u32;
        let mut best = 0u32;

        for (date, ratio) in self.daily_ratios(engine, today)? {
            let Some(ratio) = ratio else {
                continue;
            };
            if engine.is_complete(ratio) {
                run += 1;
                best = best.max(run);
            } else if date != today {
                run = 0;
            }
        }

        Ok(StreakState {
            current: run,
            longest: best.max(self.longest_streak),
        })
    }

    /// Clear every completion record
    ///
    /// The start date survives, and the best streak so far is folded into
    /// the stored historical maximum. Callers must confirm before invoking.
    pub fn reset_all(&mut self, engine: &ProgressionEngine, today: NaiveDate) -> Result<()> {
        let streak = self.streak(engine, today)?;
        self.longest_streak = streak.longest;
        let cleared = self.days.len();
        self.days.clear();
        tracing::warn!(cleared, longest = self.longest_streak, "Reset all progress");
        Ok(())
    }

    pub fn day_summary(&self, engine: &ProgressionEngine, date: NaiveDate) -> Result<DaySummary> {
        if !self.start_date.is_some_and(|start| date >= start) {
            return Ok(DaySummary {
                date,
                week: None,
                level: None,
                status: DayStatus::NotStarted,
            });
        }

        let schedule = self.schedule_for(engine, date)?;
        let record = self.days.get(&date);
        let status = if schedule.is_training_day() {
            let empty = BTreeSet::new();
            let completed = record.map_or(&empty, |r| &r.completed);
            let ratio = schedule.completion_ratio(completed).unwrap_or(0.0);
            DayStatus::Training {
                ratio,
                completed: schedule.completed_count(completed),
                planned: schedule.planned_count(),
                complete: engine.is_complete(ratio),
                visited: record.is_some(),
            }
        } else {
            DayStatus::Rest
        };

        Ok(DaySummary {
            date,
            week: Some(schedule.week),
            level: Some(schedule.level),
            status,
        })
    }

    /// One summary per day of the month, in date order
    pub fn monthly_summary(
        &self,
        engine: &ProgressionEngine,
        year: i32,
        month: u32,
    ) -> Result<Vec<DaySummary>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidInput(format!("invalid month {}-{}", year, month)))?;
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|d| self.day_summary(engine, d))
            .collect()
    }
}
