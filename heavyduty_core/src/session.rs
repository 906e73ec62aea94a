//! Explicit session context over the data directory.
//!
//! A `Session` owns the loaded documents. Queries borrow it; each mutation
//! applies one logical change and writes the affected document back before
//! returning.

use crate::catalog::ExerciseCatalog;
use crate::config::Config;
use crate::export::{export_history, export_meals};
use crate::nutrition::{MealEntry, NutritionLog, NutritionProfile};
use crate::plan::{PlanDocument, TrainingPlan};
use crate::progress::ProgressStore;
use crate::progression::ProgressionEngine;
use crate::store::{load_json, load_or_recover, save_json, save_json_pretty};
use crate::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// File layout inside the data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub root: PathBuf,
    pub plan: PathBuf,
    pub progress: PathBuf,
    pub nutrition: PathBuf,
}

impl DataPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            plan: root.join("plan.json"),
            progress: root.join("progress.json"),
            nutrition: root.join("nutrition.json"),
        }
    }
}

/// Rows written by [`Session::export`]
#[derive(Clone, Debug)]
pub struct ExportSummary {
    pub history_path: PathBuf,
    pub history_rows: usize,
    pub meals_path: PathBuf,
    pub meal_rows: usize,
}

pub struct Session {
    paths: DataPaths,
    config: Config,
    catalog: ExerciseCatalog,
    plan: TrainingPlan,
    progress: ProgressStore,
    nutrition: NutritionLog,
    warnings: Vec<String>,
}

fn engine<'a>(
    catalog: &'a ExerciseCatalog,
    plan: &'a TrainingPlan,
    config: &Config,
) -> ProgressionEngine<'a> {
    ProgressionEngine::new(catalog, plan).with_threshold(config.progression.completion_threshold)
}

impl Session {
    /// Load every document from `data_dir`
    ///
    /// A missing plan document means the built-in plan; a corrupt one is an
    /// error. Corrupt progress or nutrition documents are moved aside and
    /// replaced by empty ones, with a warning kept in [`Session::warnings`].
    pub fn open(data_dir: &Path, config: Config) -> Result<Self> {
        config.validate()?;
        let paths = DataPaths::new(data_dir);
        std::fs::create_dir_all(&paths.root)?;

        let (catalog, plan) = match load_json::<PlanDocument>(&paths.plan, "plan document")? {
            Some(doc) => doc.into_parts()?,
            None => PlanDocument::builtin().into_parts()?,
        };

        let mut warnings = Vec::new();
        let progress = load_or_recover::<ProgressStore>(&paths.progress, "progress document")?;
        warnings.extend(progress.warning);
        let nutrition = load_or_recover::<NutritionLog>(&paths.nutrition, "nutrition document")?;
        warnings.extend(nutrition.warning);

        tracing::debug!(
            exercises = catalog.len(),
            levels = plan.levels.len(),
            "Opened session in {:?}",
            paths.root
        );

        Ok(Self {
            paths,
            config,
            catalog,
            plan,
            progress: progress.value,
            nutrition: nutrition.value,
            warnings,
        })
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    pub fn plan(&self) -> &TrainingPlan {
        &self.plan
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn nutrition(&self) -> &NutritionLog {
        &self.nutrition
    }

    /// Data-loss warnings raised while loading
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn engine(&self) -> ProgressionEngine<'_> {
        engine(&self.catalog, &self.plan, &self.config)
    }

    fn save_progress(&self) -> Result<()> {
        save_json(&self.paths.progress, &self.progress)
    }

    fn save_nutrition(&self) -> Result<()> {
        save_json(&self.paths.nutrition, &self.nutrition)
    }

    // ------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------

    pub fn set_start_date(&mut self, date: NaiveDate) -> Result<()> {
        self.progress.set_start_date(date);
        self.save_progress()
    }

    pub fn mark(&mut self, date: NaiveDate, id: &str) -> Result<bool> {
        let engine = engine(&self.catalog, &self.plan, &self.config);
        let changed = self.progress.mark(&engine, date, id)?;
        self.save_progress()?;
        Ok(changed)
    }

    pub fn unmark(&mut self, date: NaiveDate, id: &str) -> Result<bool> {
        let engine = engine(&self.catalog, &self.plan, &self.config);
        let changed = self.progress.unmark(&engine, date, id)?;
        self.save_progress()?;
        Ok(changed)
    }

    /// Clear all completion records; the caller is responsible for confirmation
    pub fn reset_all(&mut self, today: NaiveDate) -> Result<()> {
        let engine = engine(&self.catalog, &self.plan, &self.config);
        self.progress.reset_all(&engine, today)?;
        self.save_progress()
    }

    /// Set or clear (empty string) an exercise's video link and persist the plan
    pub fn save_video_url(&mut self, id: &str, url: &str) -> Result<()> {
        self.catalog.set_video_url(id, url)?;
        save_json_pretty(
            &self.paths.plan,
            &PlanDocument::from_parts(&self.catalog, &self.plan),
        )
    }

    // ------------------------------------------------------------------
    // Nutrition
    // ------------------------------------------------------------------

    pub fn set_profile(&mut self, profile: NutritionProfile) -> Result<()> {
        self.nutrition.set_profile(profile)?;
        self.save_nutrition()
    }

    pub fn log_meal(&mut self, date: NaiveDate, entry: MealEntry) -> Result<()> {
        self.nutrition.log_meal(date, entry)?;
        self.save_nutrition()
    }

    pub fn remove_meal(&mut self, date: NaiveDate, index: usize) -> Result<MealEntry> {
        let removed = self.nutrition.remove_meal(date, index)?;
        self.save_nutrition()?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Write `history.csv` and `meals.csv` into `dir`
    pub fn export(&self, dir: &Path, today: NaiveDate) -> Result<ExportSummary> {
        let history_path = dir.join("history.csv");
        let meals_path = dir.join("meals.csv");
        let history_rows = export_history(&self.progress, &self.engine(), today, &history_path)?;
        let meal_rows = export_meals(&self.nutrition, &meals_path)?;
        Ok(ExportSummary {
            history_path,
            history_rows,
            meals_path,
            meal_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_directory_uses_builtin_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = Session::open(temp_dir.path(), Config::default()).unwrap();
        assert!(session.warnings().is_empty());
        assert_eq!(session.plan(), &TrainingPlan::builtin());
        assert!(session.progress().start_date().is_none());
        // nothing is written until the first mutation
        assert!(!session.paths().progress.exists());
    }

    #[test]
    fn test_mutations_persist() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut session = Session::open(temp_dir.path(), Config::default()).unwrap();
            session.set_start_date(date(2025, 1, 6)).unwrap();
            assert!(session.mark(date(2025, 1, 6), "chest_pushup").unwrap());
            session
                .save_video_url("chest_pushup", "https://youtu.be/IODxDxX7oi4")
                .unwrap();
        }

        let session = Session::open(temp_dir.path(), Config::default()).unwrap();
        assert_eq!(session.progress().start_date(), Some(date(2025, 1, 6)));
        assert!(session
            .progress()
            .completed_on(date(2025, 1, 6))
            .contains("chest_pushup"));
        assert_eq!(
            session.catalog().get("chest_pushup").unwrap().video_url.as_deref(),
            Some("https://youtu.be/IODxDxX7oi4")
        );
    }

    #[test]
    fn test_corrupt_progress_recovers_with_warning() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("progress.json"), "not json").unwrap();

        let session = Session::open(temp_dir.path(), Config::default()).unwrap();
        assert_eq!(session.warnings().len(), 1);
        assert!(session.progress().records().is_empty());
        assert!(temp_dir.path().join("progress.json.corrupt").exists());
    }

    #[test]
    fn test_corrupt_plan_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("plan.json"), r#"{"exercises": []}"#).unwrap();

        let err = Session::open(temp_dir.path(), Config::default()).err().unwrap();
        assert!(err.is_corrupt_state());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.progression.completion_threshold = 0.0;
        assert!(matches!(
            Session::open(temp_dir.path(), config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_meals_persist_and_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let day = date(2025, 1, 6);
        let mut session = Session::open(temp_dir.path(), Config::default()).unwrap();
        session
            .log_meal(
                day,
                MealEntry {
                    label: "Eggs".into(),
                    calories: 300.0,
                    protein_g: 20.0,
                    carbs_g: 2.0,
                    fat_g: 22.0,
                    time: None,
                },
            )
            .unwrap();

        let mut reopened = Session::open(temp_dir.path(), Config::default()).unwrap();
        assert_eq!(reopened.nutrition().meals_on(day).len(), 1);
        assert_eq!(reopened.remove_meal(day, 0).unwrap().label, "Eggs");
        assert!(reopened.nutrition().meals_on(day).is_empty());
    }
}
