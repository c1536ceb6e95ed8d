// Launcher module for crontab generation and scheduler handoff

pub mod engine;

pub use engine::LauncherEngine;
