pub mod config;
pub mod equiv;
pub mod meeting;
pub mod presets;
pub mod run;
pub mod simulate;
