//! Exercise catalog: lookup, filtering and the built-in exercise set.
//!
//! The catalog is loaded once per process and is read-only afterwards,
//! apart from attaching or clearing an exercise's video link.

use crate::types::*;
use crate::video::parse_video_url;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> =
    Lazy::new(|| ExerciseCatalog::from_trusted(build_default_exercises()));

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// Registry of exercise definitions in insertion order
#[derive(Clone, Debug)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    index: HashMap<String, usize>,
}

/// Optional criteria for [`ExerciseCatalog::filter`]; unset fields match anything
#[derive(Clone, Debug, Default)]
pub struct ExerciseFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    /// Exercise must use this equipment tag
    pub equipment: Option<String>,
    /// Case-insensitive substring of the display name
    pub name_contains: Option<String>,
}

impl ExerciseCatalog {
    /// Build a catalog, rejecting definitions that fail validation
    pub fn new(exercises: Vec<Exercise>) -> Result<Self> {
        let errors = validate_exercises(&exercises);
        if !errors.is_empty() {
            return Err(Error::corrupt("exercise catalog", errors.join("; ")));
        }
        Ok(Self::from_trusted(exercises))
    }

    fn from_trusted(exercises: Vec<Exercise>) -> Self {
        let index = exercises
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self { exercises, index }
    }

    pub fn get(&self, id: &str) -> Result<&Exercise> {
        self.index
            .get(id)
            .map(|&i| &self.exercises[i])
            .ok_or_else(|| Error::NotFound(format!("exercise '{}'", id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exercise> {
        self.exercises.iter()
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Lazily select exercises matching every set criterion
    ///
    /// The iterator yields in catalog order and can be cloned to restart.
    pub fn filter<'a>(
        &'a self,
        filter: &'a ExerciseFilter,
    ) -> impl Iterator<Item = &'a Exercise> + Clone + 'a {
        let needle = filter.name_contains.as_ref().map(|s| s.to_lowercase());
        self.exercises.iter().filter(move |e| {
            filter.category.map_or(true, |c| e.category == c)
                && filter.difficulty.map_or(true, |d| e.difficulty == d)
                && filter
                    .equipment
                    .as_ref()
                    .map_or(true, |tag| e.equipment.contains(tag))
                && needle
                    .as_ref()
                    .map_or(true, |n| e.name.to_lowercase().contains(n.as_str()))
        })
    }

    /// Exercises filling a schedule slot, in catalog order
    pub fn in_group(
        &self,
        group: MuscleGroup,
    ) -> impl Iterator<Item = &Exercise> + Clone + '_ {
        self.exercises
            .iter()
            .filter(move |e| e.category.group() == Some(group))
    }

    /// Attach or clear (empty string) the video link of one exercise
    pub fn set_video_url(&mut self, id: &str, url: &str) -> Result<()> {
        let link = parse_video_url(url)?;
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("exercise '{}'", id)))?;
        self.exercises[idx].video_url = link.map(|l| l.url().to_string());
        tracing::info!("Updated video link for {}", id);
        Ok(())
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty vec if valid.
    pub fn validate(&self) -> Vec<String> {
        validate_exercises(&self.exercises)
    }
}

impl<'a> IntoIterator for &'a ExerciseCatalog {
    type Item = &'a Exercise;
    type IntoIter = std::slice::Iter<'a, Exercise>;

    fn into_iter(self) -> Self::IntoIter {
        self.exercises.iter()
    }
}

fn validate_exercises(exercises: &[Exercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for e in exercises {
        if e.id.trim().is_empty() {
            errors.push(format!("Exercise '{}' has an empty id", e.name));
        }
        if e.name.trim().is_empty() {
            errors.push(format!("Exercise {} has an empty name", e.id));
        }
        if !seen.insert(e.id.as_str()) {
            errors.push(format!("Duplicate exercise id {}", e.id));
        }
        if e.category == Category::Strength(MuscleGroup::Cardio) {
            errors.push(format!(
                "Exercise {} uses strength(cardio); use the cardio category",
                e.id
            ));
        }
        if e.sets == 0 {
            errors.push(format!("Exercise {} has zero sets", e.id));
        }
        if let Some(ref url) = e.video_url {
            if let Err(err) = parse_video_url(url) {
                errors.push(format!("Exercise {}: {}", e.id, err));
            }
        }
    }

    errors
}

/// Builds the built-in exercise list
///
/// **Note**: For production use, prefer `default_catalog()` which returns a
/// cached reference. This function is retained for testing and for seeding
/// a fresh plan document.
pub fn build_default_exercises() -> Vec<Exercise> {
    use Difficulty::*;
    use MuscleGroup::*;

    let strength = Category::Strength;

    vec![
        // ====================================================================
        // Warm-up
        // ====================================================================
        ex("warmup_jumping_jacks", "Jumping Jacks", Category::WarmUp, Beginner, &["floor_space"], 2, "30s",
            "Jump feet out while raising arms overhead, then return. Keep a steady rhythm.",
            "Land softly on the balls of your feet."),
        ex("warmup_arm_circles", "Arm Circles", Category::WarmUp, Beginner, &[], 2, "20",
            "Extend arms to the sides and draw small circles, growing larger. Reverse halfway.",
            "Keep shoulders relaxed and away from the ears."),
        // ====================================================================
        // Chest
        // ====================================================================
        ex("chest_pushup", "Push-up", strength(Chest), Beginner, &["floor_space"], 3, "8-12",
            "Hands slightly wider than shoulders, body in a straight line. Lower chest to the floor and press back up.",
            "Do not let the hips sag. Drop to the knees if form breaks down."),
        ex("chest_db_bench_press", "Dumbbell Bench Press", strength(Chest), Intermediate, &["dumbbells", "bench"], 3, "8-12",
            "Lie on the bench, dumbbells over the chest. Lower to chest level with elbows at 45 degrees, press up.",
            "Keep feet planted and shoulder blades pinched together."),
        ex("chest_db_fly", "Dumbbell Fly", strength(Chest), Intermediate, &["dumbbells", "bench"], 3, "10-12",
            "With a slight bend in the elbows, open the arms wide until you feel a stretch, then bring them together.",
            "Use a light weight; do not lower past shoulder level."),
        ex("chest_barbell_bench_press", "Barbell Bench Press", strength(Chest), Advanced, &["barbell", "bench"], 4, "6-10",
            "Grip slightly wider than shoulders. Lower the bar to mid-chest under control and press to lockout.",
            "Always use a spotter or safety pins for heavy sets."),
        // ====================================================================
        // Back
        // ====================================================================
        ex("back_db_row", "One-arm Dumbbell Row", strength(Back), Beginner, &["dumbbells", "bench"], 3, "8-12",
            "Support one knee and hand on the bench. Pull the dumbbell to the hip, squeezing the shoulder blade.",
            "Keep the back flat; do not rotate the torso."),
        ex("back_bent_over_row", "Bent-over Dumbbell Row", strength(Back), Intermediate, &["dumbbells"], 3, "8-12",
            "Hinge at the hips with a flat back. Row both dumbbells toward the lower ribs.",
            "Brace the core to protect the lower back."),
        ex("back_superman", "Superman Hold", strength(Back), Beginner, &["floor_space"], 3, "12-15",
            "Lie face down, lift arms, chest and legs off the floor, hold briefly and lower.",
            "Lift only as high as is comfortable for the lower back."),
        // ====================================================================
        // Shoulders
        // ====================================================================
        ex("shoulders_db_press", "Dumbbell Shoulder Press", strength(Shoulders), Intermediate, &["dumbbells"], 3, "8-12",
            "Start with dumbbells at shoulder height and press overhead until the arms are straight.",
            "Avoid arching the lower back; keep ribs down."),
        ex("shoulders_lateral_raise", "Lateral Raise", strength(Shoulders), Beginner, &["dumbbells"], 3, "12-15",
            "Raise the dumbbells out to the sides up to shoulder height, lower slowly.",
            "Lead with the elbows and keep the weight light."),
        ex("shoulders_front_raise", "Front Raise", strength(Shoulders), Beginner, &["dumbbells"], 3, "10-12",
            "Raise the dumbbells in front of you to shoulder height with straight arms.",
            "Do not swing the weight."),
        ex("shoulders_pike_pushup", "Pike Push-up", strength(Shoulders), Intermediate, &["floor_space"], 3, "6-10",
            "From an inverted V position, bend the elbows to bring the head toward the floor, then press up.",
            "Lower slowly and keep the neck neutral."),
        // ====================================================================
        // Arms
        // ====================================================================
        ex("arms_biceps_curl", "Biceps Curl", strength(Arms), Beginner, &["dumbbells"], 3, "10-12",
            "Elbows pinned to your sides, curl the dumbbells up and lower under control.",
            "Do not swing the torso to move the weight."),
        ex("arms_hammer_curl", "Hammer Curl", strength(Arms), Beginner, &["dumbbells"], 3, "10-12",
            "Curl with a neutral grip, palms facing each other.",
            "Keep the wrists straight."),
        ex("arms_triceps_extension", "Overhead Triceps Extension", strength(Arms), Intermediate, &["dumbbells"], 3, "10-12",
            "Hold one dumbbell overhead with both hands, lower it behind the head, extend back up.",
            "Keep elbows pointing forward and move slowly."),
        ex("arms_bench_dips", "Bench Dips", strength(Arms), Intermediate, &["bench"], 3, "8-12",
            "Hands on the bench edge behind you, lower the hips by bending the elbows, then press up.",
            "Stop if you feel pain in the front of the shoulder."),
        ex("arms_concentration_curl", "Concentration Curl", strength(Arms), Intermediate, &["dumbbells", "bench"], 3, "10-12",
            "Seated, brace the elbow on the inner thigh and curl the dumbbell toward the shoulder.",
            "Keep the upper arm still."),
        // ====================================================================
        // Legs
        // ====================================================================
        ex("legs_goblet_squat", "Goblet Squat", strength(Legs), Beginner, &["dumbbells"], 3, "10-12",
            "Hold a dumbbell at the chest, squat down between the knees, stand back up.",
            "Knees track over the toes; keep the chest up."),
        ex("legs_lunge", "Alternating Lunge", strength(Legs), Beginner, &["floor_space"], 3, "10-12",
            "Step forward and lower until both knees are bent about 90 degrees, push back to standing.",
            "Keep the front knee behind the toes."),
        ex("legs_romanian_deadlift", "Romanian Deadlift", strength(Legs), Intermediate, &["dumbbells"], 3, "8-12",
            "Hinge at the hips with soft knees, lower the dumbbells along the legs, drive the hips forward.",
            "Never round the lower back."),
        ex("legs_calf_raise", "Standing Calf Raise", strength(Legs), Beginner, &["floor_space"], 3, "15-20",
            "Rise onto the toes, pause at the top and lower slowly.",
            "Hold onto a wall for balance if needed."),
        ex("legs_glute_bridge", "Glute Bridge", strength(Legs), Beginner, &["floor_space"], 3, "12-15",
            "Lying on your back with knees bent, drive the hips up and squeeze the glutes.",
            "Push through the heels, not the lower back."),
        // ====================================================================
        // Forearms
        // ====================================================================
        ex("forearms_wrist_curl", "Wrist Curl", strength(Forearms), Beginner, &["dumbbells", "bench"], 3, "15-20",
            "Forearms on the bench, palms up, curl the wrists upward.",
            "Use a light weight and a full range of motion."),
        ex("forearms_reverse_wrist_curl", "Reverse Wrist Curl", strength(Forearms), Beginner, &["dumbbells", "bench"], 3, "15-20",
            "Forearms on the bench, palms down, lift the back of the hands.",
            "Go lighter than for regular wrist curls."),
        // ====================================================================
        // Abs: basic set (tiers 1-2)
        // ====================================================================
        ex("abs_crunch", "Crunch", strength(Abs), Beginner, &["floor_space"], 3, "15-20",
            "Lying with knees bent, curl the shoulders off the floor and lower slowly.",
            "Do not pull on the neck."),
        ex("abs_plank", "Plank", strength(Abs), Beginner, &["floor_space"], 3, "30s",
            "Hold a straight line from head to heels on the forearms.",
            "Stop when the hips start to sag."),
        ex("abs_leg_raise", "Lying Leg Raise", strength(Abs), Intermediate, &["floor_space"], 3, "10-15",
            "Lying flat, raise straight legs to vertical and lower without touching the floor.",
            "Press the lower back into the floor throughout."),
        ex("abs_bicycle_crunch", "Bicycle Crunch", strength(Abs), Intermediate, &["floor_space"], 3, "20",
            "Alternate elbow to opposite knee while extending the other leg.",
            "Move slowly; rotate from the torso."),
        // ====================================================================
        // Abs: advanced set (tiers 3-4)
        // ====================================================================
        ex("abs_v_up", "V-up", strength(Abs), Advanced, &["floor_space"], 3, "10-12",
            "From lying flat, raise legs and torso together to touch the toes.",
            "Bend the knees if the lower back lifts."),
        ex("abs_weighted_russian_twist", "Weighted Russian Twist", strength(Abs), Advanced, &["dumbbells", "floor_space"], 3, "20",
            "Seated with feet raised, rotate a dumbbell from side to side.",
            "Keep the spine tall; do not round forward."),
        ex("abs_dragon_flag", "Dragon Flag", strength(Abs), Expert, &["bench"], 3, "5-8",
            "Grip the bench behind your head and lower a rigid body from vertical under control.",
            "Master leg raises first; abort if the lower back arches."),
        // ====================================================================
        // Cardio
        // ====================================================================
        ex("cardio_stationary_bike", "Stationary Bike", Category::Cardio, Beginner, &["stationary_bike"], 1, "20 min",
            "Ride at a moderate pace where you can still talk in short sentences.",
            "Adjust the seat so the knee is slightly bent at the bottom."),
        // ====================================================================
        // Stretch & mobility
        // ====================================================================
        ex("stretch_hamstring", "Standing Hamstring Stretch", Category::Stretch, Beginner, &[], 1, "30s",
            "Heel on a low step, hinge forward with a flat back until you feel the stretch.",
            "Never bounce."),
        ex("stretch_chest_doorway", "Doorway Chest Stretch", Category::Stretch, Beginner, &[], 1, "30s",
            "Forearms on a door frame, step through until the chest opens.",
            "Keep the stretch gentle."),
        ex("mobility_hip_circles", "Hip Circles", Category::Mobility, Beginner, &["floor_space"], 2, "10",
            "On all fours, draw large circles with one knee. Switch sides.",
            "Keep the pelvis level."),
        ex("mobility_thoracic_rotation", "Thoracic Rotation", Category::Mobility, Beginner, &["floor_space"], 2, "10",
            "Side-lying with knees bent, open the top arm across to the other side.",
            "Move within a pain-free range."),
    ]
}

#[allow(clippy::too_many_arguments)]
fn ex(
    id: &str,
    name: &str,
    category: Category,
    difficulty: Difficulty,
    equipment: &[&str],
    sets: u32,
    reps: &str,
    instructions: &str,
    safety_notes: &str,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        category,
        difficulty,
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        sets,
        reps: reps.into(),
        instructions: instructions.into(),
        safety_notes: safety_notes.into(),
        video_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_validates() {
        let errors = default_catalog().validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_get_and_not_found() {
        let catalog = default_catalog();
        assert_eq!(catalog.get("chest_pushup").unwrap().name, "Push-up");
        assert!(matches!(catalog.get("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_every_schedule_group_has_exercises() {
        let catalog = default_catalog();
        for group in MuscleGroup::ALL {
            assert!(
                catalog.in_group(group).count() >= 1,
                "No exercises for {}",
                group
            );
        }
        assert!(catalog
            .in_group(MuscleGroup::Abs)
            .any(|e| e.difficulty.is_advanced()));
    }

    #[test]
    fn test_filter_preserves_order_and_restarts() {
        let catalog = default_catalog();
        let filter = ExerciseFilter {
            category: Some(Category::Strength(MuscleGroup::Chest)),
            ..Default::default()
        };
        let it = catalog.filter(&filter);
        let first: Vec<&str> = it.clone().map(|e| e.id.as_str()).collect();
        let second: Vec<&str> = it.map(|e| e.id.as_str()).collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                "chest_pushup",
                "chest_db_bench_press",
                "chest_db_fly",
                "chest_barbell_bench_press"
            ]
        );
    }

    #[test]
    fn test_filter_combines_criteria() {
        let catalog = default_catalog();
        let filter = ExerciseFilter {
            difficulty: Some(Difficulty::Beginner),
            equipment: Some("dumbbells".into()),
            name_contains: Some("CURL".into()),
            ..Default::default()
        };
        let ids: Vec<&str> = catalog.filter(&filter).map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "arms_biceps_curl",
                "arms_hammer_curl",
                "forearms_wrist_curl",
                "forearms_reverse_wrist_curl"
            ]
        );
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let mut exercises = build_default_exercises();
        exercises.push(exercises[0].clone());
        let err = ExerciseCatalog::new(exercises).unwrap_err();
        assert!(err.is_corrupt_state());
    }

    #[test]
    fn test_set_video_url() {
        let mut catalog = ExerciseCatalog::new(build_default_exercises()).unwrap();
        catalog
            .set_video_url("chest_pushup", "https://youtu.be/IODxDxX7oi4")
            .unwrap();
        assert_eq!(
            catalog.get("chest_pushup").unwrap().video_url.as_deref(),
            Some("https://youtu.be/IODxDxX7oi4")
        );

        catalog.set_video_url("chest_pushup", "").unwrap();
        assert!(catalog.get("chest_pushup").unwrap().video_url.is_none());

        assert!(catalog.set_video_url("chest_pushup", "not a url").is_err());
        assert!(catalog
            .set_video_url("missing", "https://youtu.be/IODxDxX7oi4")
            .is_err());
    }
}
