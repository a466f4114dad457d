pub mod chat;
pub mod generate;
pub mod remove_bg;
