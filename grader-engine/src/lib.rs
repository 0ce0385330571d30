#![deny(clippy::all)]

pub mod config;
pub mod engine;
pub mod grade;
pub mod judge;
pub mod lang;
pub mod verdict;
pub mod workspace;

pub use self::config::Config;
pub use self::engine::Engine;
pub use self::grade::grade;
pub use self::judge::Judge;
