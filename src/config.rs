//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "timer-board")]
#[command(about = "A local countdown-timer board for tabletop and card-game events")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File the board is saved to between runs
    #[arg(short, long, default_value = "timer-board.json")]
    pub data_file: PathBuf,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(50..))]
    pub tick_ms: u64,

    /// Save the board every N seconds while timers are running
    #[arg(long, default_value = "15")]
    pub autosave: u64,

    /// Text-to-speech program, called as `<program> -v <voice> <text>`
    #[arg(long, default_value = "espeak-ng")]
    pub tts_program: String,

    /// Audio player for announcement clips, called as `<program> <file>`
    #[arg(long, default_value = "paplay")]
    pub player_program: String,

    /// Disable all audio output
    #[arg(long)]
    pub mute: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave.max(1))
    }

    /// Speech and clip programs to detect, unless muted
    pub fn audio_programs(&self) -> (Option<String>, Option<String>) {
        if self.mute {
            return (None, None);
        }
        let non_empty = |program: &str| Some(program.trim().to_string()).filter(|p| !p.is_empty());
        (non_empty(&self.tts_program), non_empty(&self.player_program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["timer-board"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
        assert_eq!(
            config.audio_programs(),
            (Some("espeak-ng".to_string()), Some("paplay".to_string()))
        );
    }

    #[test]
    fn mute_and_overrides() {
        let config = Config::try_parse_from([
            "timer-board",
            "--mute",
            "-v",
            "--tick-ms",
            "250",
            "--data-file",
            "/tmp/board.json",
        ])
        .unwrap();
        assert_eq!(config.audio_programs(), (None, None));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.data_file, PathBuf::from("/tmp/board.json"));
    }

    #[test]
    fn tick_interval_has_a_floor() {
        assert!(Config::try_parse_from(["timer-board", "--tick-ms", "5"]).is_err());
    }
}
