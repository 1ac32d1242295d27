pub mod analyze;
pub mod health;
pub mod monitor;
pub mod scenes;
pub mod tts;
