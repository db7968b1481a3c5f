pub mod chat;
pub mod matcher;
pub mod providers;
pub mod shell;
pub mod showcase;
pub mod tfidf;

pub use shell::{render, Event, Shell, ShellSettings, View};
