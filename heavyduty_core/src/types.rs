//! Core domain types for the HeavyDuty training tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups, categories and difficulty tiers
//! - Exercises as stored in the catalog
//! - Level definitions and weekday templates
//! - Derived day/week schedules and streak state

use crate::{Error, Result};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Classification
// ============================================================================

/// Muscle group a strength exercise trains, or a schedule slot name
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Forearms,
    Abs,
    Cardio,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 8] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Legs,
        MuscleGroup::Forearms,
        MuscleGroup::Abs,
        MuscleGroup::Cardio,
    ];

    /// Groups eligible to fill a converted rest day, in tie-break order
    pub const MAJOR: [MuscleGroup; 5] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Legs,
    ];

    /// The group that pairs well with this one when a day is intensified
    pub fn complement(self) -> Option<MuscleGroup> {
        match self {
            MuscleGroup::Chest => Some(MuscleGroup::Shoulders),
            MuscleGroup::Back => Some(MuscleGroup::Arms),
            MuscleGroup::Shoulders => Some(MuscleGroup::Chest),
            MuscleGroup::Arms => Some(MuscleGroup::Abs),
            MuscleGroup::Legs => Some(MuscleGroup::Abs),
            MuscleGroup::Forearms | MuscleGroup::Abs | MuscleGroup::Cardio => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Arms => "arms",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Cardio => "cardio",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        MuscleGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == needle)
            .ok_or_else(|| Error::InvalidInput(format!("unknown muscle group: {}", s)))
    }
}

/// Catalog category of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WarmUp,
    Strength(MuscleGroup),
    Stretch,
    Mobility,
    Cardio,
}

impl Category {
    /// The schedule slot this category fills, if any
    pub fn group(self) -> Option<MuscleGroup> {
        match self {
            Category::Strength(g) => Some(g),
            Category::Cardio => Some(MuscleGroup::Cardio),
            Category::WarmUp | Category::Stretch | Category::Mobility => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::WarmUp => f.write_str("warm_up"),
            Category::Strength(g) => write!(f, "strength({})", g),
            Category::Stretch => f.write_str("stretch"),
            Category::Mobility => f.write_str("mobility"),
            Category::Cardio => f.write_str("cardio"),
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts `warm_up`, `stretch`, `mobility`, `cardio`, or a bare muscle
    /// group name meaning the strength category for that group.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        match needle.as_str() {
            "warm_up" | "warmup" => Ok(Category::WarmUp),
            "stretch" => Ok(Category::Stretch),
            "mobility" => Ok(Category::Mobility),
            "cardio" => Ok(Category::Cardio),
            other => other
                .parse::<MuscleGroup>()
                .map(Category::Strength)
                .map_err(|_| Error::InvalidInput(format!("unknown category: {}", s))),
        }
    }
}

/// Difficulty tier, ordered from easiest to hardest
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Tier 3 and above; separates the basic and advanced abdominal sets
    pub fn is_advanced(self) -> bool {
        self >= Difficulty::Advanced
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "1" => Ok(Difficulty::Beginner),
            "intermediate" | "2" => Ok(Difficulty::Intermediate),
            "advanced" | "3" => Ok(Difficulty::Advanced),
            "expert" | "4" => Ok(Difficulty::Expert),
            _ => Err(Error::InvalidInput(format!("unknown difficulty: {}", s))),
        }
    }
}

// ============================================================================
// Exercises
// ============================================================================

/// An exercise definition (e.g., "Dumbbell Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub equipment: BTreeSet<String>,
    pub sets: u32,
    /// Display string: a rep range ("8-12") or a duration ("30s")
    pub reps: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub safety_notes: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

// ============================================================================
// Levels and templates
// ============================================================================

/// Muscle groups per weekday; an empty day is a rest day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WeekTemplate {
    #[serde(default)]
    pub monday: Vec<MuscleGroup>,
    #[serde(default)]
    pub tuesday: Vec<MuscleGroup>,
    #[serde(default)]
    pub wednesday: Vec<MuscleGroup>,
    #[serde(default)]
    pub thursday: Vec<MuscleGroup>,
    #[serde(default)]
    pub friday: Vec<MuscleGroup>,
    #[serde(default)]
    pub saturday: Vec<MuscleGroup>,
    #[serde(default)]
    pub sunday: Vec<MuscleGroup>,
}

impl WeekTemplate {
    pub fn day(&self, weekday: Weekday) -> &[MuscleGroup] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Build a template from seven day lists, Monday first
    pub fn from_days(days: [Vec<MuscleGroup>; 7]) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = days;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }

    /// Day lists, Monday first
    pub fn days(&self) -> [&[MuscleGroup]; 7] {
        WEEKDAYS.map(|d| self.day(d))
    }

    pub fn training_days(&self) -> usize {
        self.days().iter().filter(|d| !d.is_empty()).count()
    }
}

/// Weekdays in calendar order, Monday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Sets and rep range applied to strength work at a level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intensity {
    pub sets: u32,
    pub reps_min: u32,
    pub reps_max: u32,
}

impl Intensity {
    pub fn reps_label(&self) -> String {
        if self.reps_min == self.reps_max {
            self.reps_min.to_string()
        } else {
            format!("{}-{}", self.reps_min, self.reps_max)
        }
    }
}

/// Where a generated week takes its starting layout from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekBase {
    /// The level's own template, every week
    #[default]
    LevelTemplate,
    /// The plan's fixed weeks in rotation; the level template only fills
    /// their rest days
    FixedWeeks,
}

/// One training level of the progression
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelDefinition {
    pub level: u32,
    pub name: String,
    pub description: String,
    pub template: WeekTemplate,
    #[serde(default)]
    pub base: WeekBase,
    /// How many training days per week should include abdominal work
    pub abs_days_per_week: u32,
    /// Weekly volume target; levels 3+ convert rest days until it is met
    pub min_training_days: u32,
    pub intensity: Intensity,
}

impl LevelDefinition {
    pub fn training_days(&self) -> usize {
        self.template.training_days()
    }
}

// ============================================================================
// Derived schedules
// ============================================================================

/// An exercise as prescribed for a specific day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedExercise {
    pub id: String,
    pub name: String,
    pub group: MuscleGroup,
    pub sets: u32,
    pub reps: String,
}

/// Groups and exercises for one weekday of a generated or fixed week
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayPlan {
    pub weekday: Weekday,
    pub groups: Vec<MuscleGroup>,
    pub exercises: Vec<PlannedExercise>,
}

impl DayPlan {
    /// Same rule as [`DaySchedule::completion_ratio`]
    pub fn completion_ratio(&self, completed: &BTreeSet<String>) -> Option<f64> {
        ratio_of(&self.exercises, completed)
    }
}

/// A full week of day plans, Monday first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekPlan {
    pub week: u32,
    pub level: u32,
    pub days: Vec<DayPlan>,
}

impl WeekPlan {
    pub fn day(&self, weekday: Weekday) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    pub fn training_days(&self) -> usize {
        self.days.iter().filter(|d| !d.exercises.is_empty()).count()
    }
}

/// The plan for a single calendar date; derived, never persisted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub week: u32,
    pub level: u32,
    pub weekday: Weekday,
    pub groups: Vec<MuscleGroup>,
    pub exercises: Vec<PlannedExercise>,
}

impl DaySchedule {
    pub fn is_training_day(&self) -> bool {
        !self.exercises.is_empty()
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.exercises.iter().map(|e| e.id.as_str())
    }

    /// |completed ∩ planned| / |planned|, or `None` on a rest day
    pub fn completion_ratio(&self, completed: &BTreeSet<String>) -> Option<f64> {
        ratio_of(&self.exercises, completed)
    }

    /// Number of distinct planned ids found in `completed`
    pub fn completed_count(&self, completed: &BTreeSet<String>) -> usize {
        let planned: BTreeSet<&str> = self.exercise_ids().collect();
        planned.iter().filter(|id| completed.contains(**id)).count()
    }

    pub fn planned_count(&self) -> usize {
        self.exercise_ids().collect::<BTreeSet<_>>().len()
    }
}

fn ratio_of(exercises: &[PlannedExercise], completed: &BTreeSet<String>) -> Option<f64> {
    if exercises.is_empty() {
        return None;
    }
    let planned: BTreeSet<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
    let done = planned.iter().filter(|id| completed.contains(**id)).count();
    Some(done as f64 / planned.len() as f64)
}

/// Summary of where a week sits in the progression
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekInfo {
    pub week: u32,
    /// Configured level whose schedule applies
    pub level: u32,
    /// Progression tier; equals `level` until weeks run past the last level
    pub tier: u32,
    pub level_name: String,
    pub description: String,
    /// 1-based position inside the current level's block of weeks
    pub week_in_level: u32,
    pub weeks_completed: u32,
}

/// Current and best run of completed training days
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
}
