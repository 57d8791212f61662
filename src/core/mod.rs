// Core modules: error modeling and payload loading.
pub mod error;
pub mod payload;
