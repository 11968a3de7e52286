pub mod planner;
pub mod scene;
pub mod scheduler;
