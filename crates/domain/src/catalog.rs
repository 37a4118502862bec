use crate::{Exercise, Muscle, MuscleKey, Muscles, Stimulus};

/// The exercises every new exercise list starts with.
static EXERCISES: &[(&str, &[(Muscle, f64)])] = &[
    (
        "Back Extension",
        &[
            (Muscle::Hamstrings, 0.5),
            (Muscle::Glutes, 0.5),
            (Muscle::LowBack, 0.5),
        ],
    ),
    ("Leg Extension", &[(Muscle::Quads, 1.0)]),
    ("Hip Adductions", &[(Muscle::Glutes, 1.0)]),
    (
        "Dumbell Shoulder Press",
        &[(Muscle::Shoulders, 1.0), (Muscle::Triceps, 0.25)],
    ),
    (
        "Dumbell Row (Single Arm)",
        &[
            (Muscle::Back, 1.0),
            (Muscle::Biceps, 0.5),
            (Muscle::RearDelts, 0.5),
        ],
    ),
    ("Incline Bench Dumbell Bicep Curl", &[(Muscle::Biceps, 1.0)]),
    ("Lying Hamstring Curl", &[(Muscle::Hamstrings, 1.0)]),
    ("Sitting Hamstring Curl", &[(Muscle::Hamstrings, 1.0)]),
    (
        "Hammer Str Back-Supported Row",
        &[(Muscle::Back, 1.0), (Muscle::Biceps, 0.5)],
    ),
    ("Face Pull", &[(Muscle::Back, 0.5), (Muscle::RearDelts, 1.0)]),
    ("Tricep Pushdown", &[(Muscle::Triceps, 1.0)]),
    ("Machine Chest Fly (matrix)", &[(Muscle::Chest, 1.0)]),
    (
        "Machine Rear Delt Fly (matrix)",
        &[(Muscle::Back, 0.5), (Muscle::RearDelts, 1.0)],
    ),
    ("Calf Raise", &[(Muscle::Calves, 1.0)]),
    ("Hammer Strength Preacher Curl", &[(Muscle::Biceps, 1.0)]),
    ("Matrix Tricep Push Down", &[(Muscle::Triceps, 1.0)]),
    ("Hammer Strength Stack Row", &[]),
    (
        "Matrix Cable Row",
        &[(Muscle::Back, 1.0), (Muscle::Biceps, 0.5)],
    ),
    ("Bulgarian Split Squat", &[]),
];

#[must_use]
pub fn exercises() -> Vec<Exercise> {
    EXERCISES
        .iter()
        .map(|(name, muscles)| Exercise {
            name: (*name).to_string(),
            muscles: muscles
                .iter()
                .filter_map(|(muscle, stimulus)| {
                    Some((MuscleKey::from(*muscle), Stimulus::new(*stimulus).ok()?))
                })
                .collect::<Muscles>(),
        })
        .collect()
}
