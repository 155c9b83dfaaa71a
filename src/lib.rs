pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod store;
pub mod validate;
pub mod wrap;

pub use bot::run;
