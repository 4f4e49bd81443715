#[macro_use] extern crate serde_derive;

pub mod config;
pub mod db;
pub mod errors;
pub mod form;
pub mod import;
pub mod load;
pub mod mstmap;
pub mod resolve;
pub mod types;
