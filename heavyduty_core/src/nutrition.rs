//! Nutrition calculator and per-day meal log.
//!
//! Energy needs use the Mifflin-St Jeor equation scaled by an activity
//! multiplier. Targets are split into macros by a goal-dependent ratio and
//! converted at 4/4/9 kcal per gram of protein/carbohydrate/fat.

use crate::config::NutritionConfig;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(Error::InvalidInput(format!("unknown sex: {}", s))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(Error::InvalidInput(format!("unknown activity level: {}", s))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    Maintain,
    #[serde(alias = "bulk")]
    Surplus,
    #[serde(alias = "cut")]
    Deficit,
}

/// Share of calories from protein, carbohydrate and fat
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Goal {
    pub fn macro_split(self) -> MacroSplit {
        match self {
            Goal::Maintain => MacroSplit { protein: 0.30, carbs: 0.40, fat: 0.30 },
            Goal::Surplus => MacroSplit { protein: 0.30, carbs: 0.50, fat: 0.20 },
            Goal::Deficit => MacroSplit { protein: 0.40, carbs: 0.30, fat: 0.30 },
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Goal::Maintain => "maintain",
            Goal::Surplus => "surplus",
            Goal::Deficit => "deficit",
        })
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "maintain" => Ok(Goal::Maintain),
            "surplus" | "bulk" => Ok(Goal::Surplus),
            "deficit" | "cut" => Ok(Goal::Deficit),
            _ => Err(Error::InvalidInput(format!("unknown goal: {}", s))),
        }
    }
}

/// User body data; numeric fields stay optional until the user fills them in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct NutritionProfile {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub activity: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
}

impl NutritionProfile {
    /// Check that weight, height and age are present and positive
    pub fn validate(&self) -> Result<()> {
        positive("weight_kg", self.weight_kg)?;
        positive("height_cm", self.height_cm)?;
        positive("age", self.age.map(f64::from))?;
        Ok(())
    }
}

fn positive(field: &str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(Error::InvalidInput(format!("{} must be positive, got {}", field, v))),
        None => Err(Error::InvalidInput(format!("{} is required", field))),
    }
}

/// Basal metabolic rate in kcal/day (Mifflin-St Jeor)
pub fn bmr(profile: &NutritionProfile) -> Result<f64> {
    let weight = positive("weight_kg", profile.weight_kg)?;
    let height = positive("height_cm", profile.height_cm)?;
    let age = positive("age", profile.age.map(f64::from))?;
    let sex_offset = match profile.sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    Ok(10.0 * weight + 6.25 * height - 5.0 * age + sex_offset)
}

/// Total daily energy expenditure
pub fn tdee(profile: &NutritionProfile) -> Result<f64> {
    Ok(bmr(profile)? * profile.activity.multiplier())
}

/// Daily calorie target for the profile's goal
///
/// Fails with `InvalidInput` instead of returning a target at or below
/// zero, which a very light or very old profile on a deficit can produce.
pub fn target_calories(profile: &NutritionProfile, offsets: &NutritionConfig) -> Result<f64> {
    let tdee = tdee(profile)?;
    let target = match profile.goal {
        Goal::Maintain => tdee,
        Goal::Surplus => tdee + offsets.surplus_kcal,
        Goal::Deficit => tdee - offsets.deficit_kcal,
    };
    if target <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "profile gives a non-positive calorie target ({:.0} kcal) for goal {}",
            target, profile.goal
        )));
    }
    Ok(target)
}

/// Calorie target and whole-gram macro targets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

pub fn macro_targets(profile: &NutritionProfile, offsets: &NutritionConfig) -> Result<MacroTargets> {
    let calories = target_calories(profile, offsets)?;
    let split = profile.goal.macro_split();
    Ok(MacroTargets {
        calories,
        protein_g: (calories * split.protein / KCAL_PER_G_PROTEIN).round(),
        carbs_g: (calories * split.carbs / KCAL_PER_G_CARBS).round(),
        fat_g: (calories * split.fat / KCAL_PER_G_FAT).round(),
    })
}

/// One logged meal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    pub label: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub time: Option<NaiveTime>,
}

impl MealEntry {
    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidInput("meal label must not be empty".into()));
        }
        for (field, value) in [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Summed intake for a day
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Intake divided by target, per macro (0 when the target is 0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroProgress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Persisted nutrition document: profile plus meals by date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct NutritionLog {
    #[serde(default)]
    profile: NutritionProfile,
    #[serde(default)]
    meals: BTreeMap<NaiveDate, Vec<MealEntry>>,
}

impl NutritionLog {
    pub fn profile(&self) -> &NutritionProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: NutritionProfile) -> Result<()> {
        profile.validate()?;
        self.profile = profile;
        tracing::info!("Nutrition profile updated");
        Ok(())
    }

    pub fn meals(&self) -> &BTreeMap<NaiveDate, Vec<MealEntry>> {
        &self.meals
    }

    pub fn meals_on(&self, date: NaiveDate) -> &[MealEntry] {
        self.meals.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn log_meal(&mut self, date: NaiveDate, entry: MealEntry) -> Result<()> {
        entry.validate()?;
        tracing::debug!(%date, label = %entry.label, "Logged meal");
        self.meals.entry(date).or_default().push(entry);
        Ok(())
    }

    /// Remove the meal at `index` (0-based, in logging order)
    pub fn remove_meal(&mut self, date: NaiveDate, index: usize) -> Result<MealEntry> {
        let entries = self
            .meals
            .get_mut(&date)
            .filter(|m| index < m.len())
            .ok_or_else(|| Error::NotFound(format!("meal #{} on {}", index + 1, date)))?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.meals.remove(&date);
        }
        Ok(removed)
    }

    pub fn daily_totals(&self, date: NaiveDate) -> DailyTotals {
        self.meals_on(date)
            .iter()
            .fold(DailyTotals::default(), |acc, m| DailyTotals {
                calories: acc.calories + m.calories,
                protein_g: acc.protein_g + m.protein_g,
                carbs_g: acc.carbs_g + m.carbs_g,
                fat_g: acc.fat_g + m.fat_g,
            })
    }

    pub fn progress_vs_target(
        &self,
        date: NaiveDate,
        profile: &NutritionProfile,
        offsets: &NutritionConfig,
    ) -> Result<MacroProgress> {
        let targets = macro_targets(profile, offsets)?;
        let totals = self.daily_totals(date);
        let ratio = |actual: f64, target: f64| if target > 0.0 { actual / target } else { 0.0 };
        Ok(MacroProgress {
            calories: ratio(totals.calories, targets.calories),
            protein: ratio(totals.protein_g, targets.protein_g),
            carbs: ratio(totals.carbs_g, targets.carbs_g),
            fat: ratio(totals.fat_g, targets.fat_g),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_profile() -> NutritionProfile {
        NutritionProfile {
            weight_kg: Some(80.0),
            height_cm: Some(180.0),
            age: Some(30),
            sex: Sex::Male,
            activity: ActivityLevel::Sedentary,
            goal: Goal::Maintain,
        }
    }

    fn meal(label: &str, calories: f64) -> MealEntry {
        MealEntry {
            label: label.into(),
            calories,
            protein_g: 30.0,
            carbs_g: 50.0,
            fat_g: 10.0,
            time: NaiveTime::from_hms_opt(12, 30, 0),
        }
    }

    #[test]
    fn test_bmr_reference_male() {
        assert_eq!(bmr(&reference_profile()).unwrap(), 1780.0);
    }

    #[test]
    fn test_bmr_female_offset() {
        let profile = NutritionProfile {
            sex: Sex::Female,
            ..reference_profile()
        };
        assert_eq!(bmr(&profile).unwrap(), 1780.0 - 166.0);
    }

    #[test]
    fn test_bmr_requires_positive_fields() {
        let missing = NutritionProfile {
            age: None,
            ..reference_profile()
        };
        assert!(matches!(bmr(&missing), Err(Error::InvalidInput(_))));

        let negative = NutritionProfile {
            weight_kg: Some(-1.0),
            ..reference_profile()
        };
        assert!(matches!(bmr(&negative), Err(Error::InvalidInput(_))));
        assert!(macro_targets(&negative, &NutritionConfig::default()).is_err());
    }

    #[test]
    fn test_goal_offsets() {
        let offsets = NutritionConfig::default();
        let tdee = 1780.0 * 1.2;
        let target = |goal| {
            target_calories(&NutritionProfile { goal, ..reference_profile() }, &offsets).unwrap()
        };
        assert!((target(Goal::Maintain) - tdee).abs() < 1e-9);
        assert!((target(Goal::Surplus) - (tdee + 300.0)).abs() < 1e-9);
        assert!((target(Goal::Deficit) - (tdee - 500.0)).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_target_is_rejected() {
        let offsets = NutritionConfig::default();
        let tiny = NutritionProfile {
            weight_kg: Some(30.0),
            height_cm: Some(120.0),
            age: Some(99),
            sex: Sex::Female,
            activity: ActivityLevel::Sedentary,
            goal: Goal::Deficit,
        };
        // BMR 394, TDEE 472.8, minus the 500 kcal deficit
        assert!(matches!(
            target_calories(&tiny, &offsets),
            Err(Error::InvalidInput(_))
        ));
        assert!(macro_targets(&tiny, &offsets).is_err());

        let maintain = NutritionProfile { goal: Goal::Maintain, ..tiny };
        assert!(target_calories(&maintain, &offsets).unwrap() > 0.0);
    }

    #[test]
    fn test_macros_sum_to_target() {
        let offsets = NutritionConfig::default();
        for goal in [Goal::Maintain, Goal::Surplus, Goal::Deficit] {
            let profile = NutritionProfile {
                goal,
                activity: ActivityLevel::Active,
                ..reference_profile()
            };
            let m = macro_targets(&profile, &offsets).unwrap();
            let kcal = m.protein_g * 4.0 + m.carbs_g * 4.0 + m.fat_g * 9.0;
            // each macro is within half a gram of exact
            assert!((kcal - m.calories).abs() <= 4.0 * 0.5 * 2.0 + 9.0 * 0.5, "{:?}", goal);
            let split = goal.macro_split();
            assert!((split.protein + split.carbs + split.fat - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_goal_aliases() {
        assert_eq!("bulk".parse::<Goal>().unwrap(), Goal::Surplus);
        assert_eq!("cut".parse::<Goal>().unwrap(), Goal::Deficit);
        let goal: Goal = serde_json::from_str("\"bulk\"").unwrap();
        assert_eq!(goal, Goal::Surplus);
    }

    #[test]
    fn test_meal_log_totals_and_removal() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut log = NutritionLog::default();
        log.log_meal(day, meal("Oats", 400.0)).unwrap();
        log.log_meal(day, meal("Chicken rice", 650.0)).unwrap();

        let totals = log.daily_totals(day);
        assert_eq!(totals.calories, 1050.0);
        assert_eq!(totals.protein_g, 60.0);

        let removed = log.remove_meal(day, 0).unwrap();
        assert_eq!(removed.label, "Oats");
        assert_eq!(log.meals_on(day).len(), 1);
        assert!(matches!(log.remove_meal(day, 5), Err(Error::NotFound(_))));

        log.remove_meal(day, 0).unwrap();
        assert!(log.meals().is_empty());
    }

    #[test]
    fn test_log_meal_validates() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut log = NutritionLog::default();
        assert!(log.log_meal(day, meal("  ", 100.0)).is_err());
        assert!(log.log_meal(day, meal("Bad", -5.0)).is_err());
        assert!(log.log_meal(day, meal("Bad", f64::NAN)).is_err());
        assert!(log.meals_on(day).is_empty());
    }

    #[test]
    fn test_progress_vs_target() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let offsets = NutritionConfig::default();
        let mut log = NutritionLog::default();
        log.set_profile(reference_profile()).unwrap();
        let target = target_calories(log.profile(), &offsets).unwrap();
        log.log_meal(day, meal("Half", target / 2.0)).unwrap();

        let progress = log.progress_vs_target(day, log.profile(), &offsets).unwrap();
        assert!((progress.calories - 0.5).abs() < 1e-9);
        assert!(progress.protein > 0.0);
    }

    #[test]
    fn test_set_profile_rejects_incomplete() {
        let mut log = NutritionLog::default();
        assert!(log.set_profile(NutritionProfile::default()).is_err());
        assert_eq!(log.profile(), &NutritionProfile::default());
    }
}
