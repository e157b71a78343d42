pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod logstore;
pub mod lrs;
pub mod pipeline;
pub mod recipes;
pub mod run;
