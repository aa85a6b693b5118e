pub mod config;
pub mod dirty;
pub mod document;
pub mod history;
pub mod script;
pub mod session;
pub mod stack;
pub mod undo;
