pub mod scheduler;

pub use scheduler::{Generation, UpdateScheduler};
