pub mod cli;
pub mod db;
pub mod model;
pub mod parser;
pub mod util;
pub mod workflow;
