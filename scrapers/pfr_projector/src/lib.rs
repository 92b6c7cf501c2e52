pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod player;
pub mod prompt;
pub mod quarterback;
pub mod rankings;
pub mod session;
pub mod sheet;
pub mod skill_player;
pub mod team;
pub mod team_stats;
pub mod types;
pub mod workbook;
