pub mod fortune;
pub mod history;
pub mod profile;
pub mod setup;
pub mod ui;
