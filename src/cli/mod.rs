pub mod app;
pub mod report;

pub use app::Cli;
pub use report::Report;
