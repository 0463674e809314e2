pub mod generate;
pub mod saved;
pub mod sections;
pub mod status;
