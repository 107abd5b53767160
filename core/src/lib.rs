pub mod day;
pub mod db;
pub mod models;
pub mod service;
