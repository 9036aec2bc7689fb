pub mod aggregate;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod fix;
pub mod logfile;
pub mod model;
pub mod parsers;
pub mod report;
pub mod runner;
pub mod spinner;
pub mod store;
pub mod theme;
pub mod track;
pub mod trend;
