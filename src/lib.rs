pub mod config;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod i18n;
pub mod process;
pub mod report;
pub mod runner;
pub mod stub;
pub mod template;
pub mod types;

// Re-export the localization macros
pub use crate::i18n::{t, t_with_args};
