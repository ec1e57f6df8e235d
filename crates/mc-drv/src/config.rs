//! Command-line configuration (§6.3).
//!
//! Hand-rolled over `std::env::args()`: nothing else in the dependency
//! stack pulls in a CLI-parsing crate, so this follows suit rather than
//! introducing one just for a single positional argument and four flags.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub emit_ll: bool,
    pub emit_o: bool,
    /// Clamped to `0..=3`; default `2`.
    pub opt_level: u8,
}

#[derive(Debug, Clone)]
pub struct UsageError(String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}

const USAGE: &str = "usage: mc [--emit-ll] [--emit-o] [(--|-)O0|O1|O2|O3] <input-file>";

impl Config {
    pub fn parse(args: &[String]) -> Result<Config, UsageError> {
        let mut emit_ll = false;
        let mut emit_o = false;
        let mut opt_level: u8 = 2;
        let mut input_file: Option<PathBuf> = None;

        for arg in args {
            match arg.as_str() {
                "--emit-ll" => emit_ll = true,
                "--emit-o" => emit_o = true,
                _ if is_opt_level_flag(arg) => {
                    opt_level = opt_level_from_flag(arg).min(3);
                }
                _ if arg.starts_with('-') => {
                    return Err(UsageError(format!("unrecognized option `{arg}`\n{USAGE}")));
                }
                _ => {
                    if input_file.is_some() {
                        return Err(UsageError(format!("multiple input files given\n{USAGE}")));
                    }
                    input_file = Some(PathBuf::from(arg));
                }
            }
        }

        let input_file = input_file.ok_or_else(|| UsageError(format!("no input file\n{USAGE}")))?;
        Ok(Config { input_file, emit_ll, emit_o, opt_level })
    }
}

fn is_opt_level_flag(arg: &str) -> bool {
    let stripped = arg.trim_start_matches("--").trim_start_matches('-');
    matches!(stripped, "O0" | "O1" | "O2" | "O3") && (arg.starts_with("--") || arg.starts_with('-'))
}

fn opt_level_from_flag(arg: &str) -> u8 {
    let stripped = arg.trim_start_matches("--").trim_start_matches('-');
    stripped.trim_start_matches('O').parse().unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_a_bare_input_file_with_defaults() {
        let config = Config::parse(&args(&["main.m"])).unwrap();
        assert_eq!(config.input_file, PathBuf::from("main.m"));
        assert!(!config.emit_ll);
        assert!(!config.emit_o);
        assert_eq!(config.opt_level, 2);
    }

    #[test]
    fn accepts_single_and_double_dash_opt_levels() {
        assert_eq!(Config::parse(&args(&["-O0", "main.m"])).unwrap().opt_level, 0);
        assert_eq!(Config::parse(&args(&["--O3", "main.m"])).unwrap().opt_level, 3);
    }

    #[test]
    fn recognizes_emit_flags() {
        let config = Config::parse(&args(&["--emit-ll", "--emit-o", "main.m"])).unwrap();
        assert!(config.emit_ll);
        assert!(config.emit_o);
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(Config::parse(&args(&["--bogus", "main.m"])).is_err());
    }

    #[test]
    fn rejects_missing_input_file() {
        assert!(Config::parse(&args(&["--emit-ll"])).is_err());
    }

    #[test]
    fn rejects_multiple_input_files() {
        assert!(Config::parse(&args(&["a.m", "b.m"])).is_err());
    }
}
