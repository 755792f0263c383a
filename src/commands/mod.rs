pub mod completions;
pub mod config;
pub mod list;
pub mod observe;
pub mod run;
pub mod smoke;
