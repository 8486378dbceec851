pub mod exercise;
pub mod log_entry;
pub mod workout;

pub use exercise::Exercise;
pub use log_entry::{LastSet, LogEntry, NewLogEntry};
pub use workout::{CreateWorkoutResponse, NewWorkout, WorkoutExists};
