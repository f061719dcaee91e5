//! Input module
//! Loads the employee roster and project requirement files

pub mod manager;

pub use manager::InputManager;
