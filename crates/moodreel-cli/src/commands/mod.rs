pub mod budget;
pub mod config;
pub mod creator;
pub mod data;
pub mod feed;
pub mod helpers;
pub mod run;
