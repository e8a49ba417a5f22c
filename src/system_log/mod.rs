pub mod builder;
pub mod db;
pub mod models;
