pub mod aggregation;
pub mod chart;
pub mod cli;
pub mod config;
pub mod controller;
pub mod export_registry;
pub mod exporters;
pub mod storage;
