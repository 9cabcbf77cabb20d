pub mod command;
pub mod file;
pub mod ini;
pub mod streams;
