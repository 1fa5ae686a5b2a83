pub mod acquire;
pub mod manager;
pub mod recorder;
