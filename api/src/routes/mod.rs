pub mod analyze;
pub mod health;
pub mod scenes;
pub mod tts;

#[cfg(test)]
pub(crate) mod test_support;
