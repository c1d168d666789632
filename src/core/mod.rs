pub mod clock;
pub mod document;
pub mod errors;
pub mod formula;
pub mod id_generator;
pub mod services;
pub mod utils;
