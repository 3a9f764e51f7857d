pub mod config_cmd;
pub mod doctor;
pub mod evaluate;
pub mod input;
pub mod plan;
