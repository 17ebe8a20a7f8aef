pub mod instruction_model;
pub mod loader;
