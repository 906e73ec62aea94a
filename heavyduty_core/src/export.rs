//! CSV export of training history and the meal log.
//!
//! Exports are full snapshots: each run truncates and rewrites the files,
//! then fsyncs them before reporting success.

use crate::nutrition::NutritionLog;
use crate::progress::{DayStatus, ProgressStore};
use crate::progression::ProgressionEngine;
use crate::Result;
use chrono::NaiveDate;
use std::fs::File;
use std::path::Path;

/// A row in the history CSV
#[derive(Debug, serde::Serialize)]
struct HistoryRow {
    date: NaiveDate,
    week: u32,
    level: u32,
    planned: usize,
    completed: usize,
    ratio: String,
    complete: bool,
}

/// A row in the meals CSV
#[derive(Debug, serde::Serialize)]
struct MealRow<'a> {
    date: NaiveDate,
    time: Option<String>,
    label: &'a str,
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
}

fn create_csv(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    Ok(csv::WriterBuilder::new().has_headers(true).from_writer(file))
}

fn finish_csv(writer: csv::Writer<File>) -> Result<()> {
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;
    Ok(())
}

/// Write one row per training day from the start date through `today`
///
/// Returns the number of rows written. Rest days are left out.
pub fn export_history(
    progress: &ProgressStore,
    engine: &ProgressionEngine,
    today: NaiveDate,
    path: &Path,
) -> Result<usize> {
    let mut writer = create_csv(path)?;
    let mut rows = 0;

    if let Some(start) = progress.start_date() {
        for date in start.iter_days().take_while(|d| *d <= today) {
            let summary = progress.day_summary(engine, date)?;
            let (Some(week), Some(level)) = (summary.week, summary.level) else {
                continue;
            };
            if let DayStatus::Training {
                ratio,
                completed,
                planned,
                complete,
                ..
            } = summary.status
            {
                writer.serialize(HistoryRow {
                    date,
                    week,
                    level,
                    planned,
                    completed,
                    ratio: format!("{:.3}", ratio),
                    complete,
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    finish_csv(writer)?;
    tracing::info!("Wrote {} history rows to {:?}", rows, path);
    Ok(rows)
}

/// Write every logged meal, ordered by date then logging order
pub fn export_meals(log: &NutritionLog, path: &Path) -> Result<usize> {
    let mut writer = create_csv(path)?;
    let mut rows = 0;

    for (date, meals) in log.meals() {
        for meal in meals {
            writer.serialize(MealRow {
                date: *date,
                time: meal.time.map(|t| t.format("%H:%M").to_string()),
                label: &meal.label,
                calories: meal.calories,
                protein_g: meal.protein_g,
                carbs_g: meal.carbs_g,
                fat_g: meal.fat_g,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    finish_csv(writer)?;
    tracing::info!("Wrote {} meal rows to {:?}", rows, path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::nutrition::MealEntry;
    use crate::plan::TrainingPlan;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_history_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");
        let plan = TrainingPlan::builtin();
        let engine = ProgressionEngine::new(default_catalog(), &plan);
        let mut store = ProgressStore::default();
        store.set_start_date(date(2025, 1, 6));
        store.mark(&engine, date(2025, 1, 6), "chest_pushup").unwrap();

        // Mon 6, Thu 9, Fri 10, Sat 11 in week 1
        let rows = export_history(&store, &engine, date(2025, 1, 12), &path).unwrap();
        assert_eq!(rows, 4);

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,week,level,planned,completed,ratio,complete"
        );
        assert!(lines.next().unwrap().starts_with("2025-01-06,1,1,8,1,0.125,false"));
    }

    #[test]
    fn test_history_export_without_start_is_header_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");
        let plan = TrainingPlan::builtin();
        let engine = ProgressionEngine::new(default_catalog(), &plan);
        let rows = export_history(&ProgressStore::default(), &engine, date(2025, 1, 12), &path)
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_meal_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("meals.csv");
        let mut log = NutritionLog::default();
        log.log_meal(
            date(2025, 1, 6),
            MealEntry {
                label: "Oats, milk".into(),
                calories: 400.0,
                protein_g: 20.0,
                carbs_g: 60.0,
                fat_g: 8.0,
                time: chrono::NaiveTime::from_hms_opt(7, 5, 0),
            },
        )
        .unwrap();

        assert_eq!(export_meals(&log, &path).unwrap(), 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,time,label,calories,protein_g,carbs_g,fat_g\n"));
        assert!(contents.contains("2025-01-06,07:05,\"Oats, milk\",400.0,20.0,60.0,8.0"));
    }
}
