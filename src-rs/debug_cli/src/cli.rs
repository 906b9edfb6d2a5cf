use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_PRINCIPAL: &str = "debug-cli";

pub fn parse_config() -> CLIConfig {
    let args: Vec<String> = env::args().skip(1).collect();
    apply_args(
        CLIConfig {
            base_url: env_or("SPECGEN_URL", DEFAULT_URL.to_string()),
            principal: env_or("SPECGEN_PRINCIPAL", DEFAULT_PRINCIPAL.to_string()),
            poll_interval: env_u64("SPECGEN_POLL_SECS", 2),
        },
        &args,
    )
}

fn apply_args(mut cfg: CLIConfig, args: &[String]) -> CLIConfig {
    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--principal" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.principal = value.clone();
                    idx += 1;
                }
            }
            "--poll" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.poll_interval = parsed.max(1);
                    }
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    cfg
}

/// Splits `a | b | c` command arguments, dropping empty trailing parts.
pub fn pipe_args(rest: &str) -> Vec<String> {
    rest.split('|')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn env_or(key: &str, fallback: String) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback,
    }
}

fn env_u64(key: &str, fallback: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CLIConfig {
        CLIConfig {
            base_url: DEFAULT_URL.to_string(),
            principal: DEFAULT_PRINCIPAL.to_string(),
            poll_interval: 2,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let args: Vec<String> = ["--base", "http://h:1", "--principal", "alice", "--poll", "0", "--bogus"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cfg = apply_args(base(), &args);
        assert_eq!(cfg.base_url, "http://h:1");
        assert_eq!(cfg.principal, "alice");
        assert_eq!(cfg.poll_interval, 1);
    }

    #[test]
    fn pipe_args_trim_and_skip_blanks() {
        assert_eq!(pipe_args(" AX40 | area, grade |  "), vec!["AX40", "area, grade"]);
        assert!(pipe_args("").is_empty());
    }
}
