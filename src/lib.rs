pub mod binder;
pub mod catalog;
pub mod exec;
pub mod generate;
pub mod run;
pub mod shared;
pub mod templates;
