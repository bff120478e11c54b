pub mod backup;
pub mod cli;
pub mod configure;
pub mod connection;
pub mod locator;
pub mod rewrite;
pub mod xml;
