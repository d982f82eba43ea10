//! Build script for sysclock-runtime
//!
//! Handles configuration merging:
//! 1. Start with per-platform library defaults.
//! 2. If SYSCLOCK_CONFIG_RS env var is set, parse the user's config file.
//! 3. Merge user values over defaults (user wins).
//! 4. Generate OUT_DIR/sysclock_merged_config.rs
//!
//! User only needs to specify values they want to change.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration parameter definition
struct ConfigParam {
    name: &'static str,
    rust_type: &'static str,
    default_value: &'static str,
}

/// Per-platform defaults for the WaitCore constants named in the design
/// doc's "platform abstraction" notes. Linux gets a futex-backed
/// condvar via parking_lot-style primitives so its floor is tighter;
/// everything else falls back to a generic condvar with a coarser
/// floor.
#[cfg(target_os = "linux")]
const CLOCK_MIN_WAIT_TIME_NS_DEFAULT: &str = "100";

#[cfg(all(unix, not(target_os = "linux")))]
const CLOCK_MIN_WAIT_TIME_NS_DEFAULT: &str = "500";

#[cfg(not(unix))]
const CLOCK_MIN_WAIT_TIME_NS_DEFAULT: &str = "1_000";

/// All configuration parameters with their defaults
const CONFIG_PARAMS: &[ConfigParam] = &[
    ConfigParam {
        name: "CLOCK_MIN_WAIT_TIME_NS",
        rust_type: "u64",
        // filled in at runtime below, see `main`
        default_value: "0",
    },
    ConfigParam {
        name: "CLOCK_NANOSLEEP_CEILING_NS",
        rust_type: "u64",
        default_value: "500_000", // 500us
    },
    ConfigParam {
        name: "CLOCK_COARSE_WAIT_SWITCH_NS",
        rust_type: "u64",
        default_value: "2_000_000", // 2ms
    },
    ConfigParam {
        name: "CLOCK_OVERSHOOT_REDUCTION_NS",
        rust_type: "u64",
        default_value: "500_000", // 500us
    },
];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("sysclock_merged_config.rs");

    let mut config: HashMap<&str, String> = CONFIG_PARAMS
        .iter()
        .map(|p| (p.name, p.default_value.to_string()))
        .collect();
    config.insert(
        "CLOCK_MIN_WAIT_TIME_NS",
        CLOCK_MIN_WAIT_TIME_NS_DEFAULT.to_string(),
    );

    if let Ok(user_path) = env::var("SYSCLOCK_CONFIG_RS") {
        println!("cargo:rerun-if-changed={}", user_path);

        match fs::read_to_string(&user_path) {
            Ok(content) => {
                parse_and_merge(&content, &mut config);
                println!("cargo:warning=Using custom config: {}", user_path);
            }
            Err(e) => {
                println!(
                    "cargo:warning=Failed to read SYSCLOCK_CONFIG_RS ({}): {}",
                    user_path, e
                );
            }
        }
    }

    println!("cargo:rerun-if-env-changed=SYSCLOCK_CONFIG_RS");

    let output = generate_config(&config);
    fs::write(&dest_path, &output).expect("Failed to write merged config");
}

/// Parse user's config file and merge values into config map
fn parse_and_merge(content: &str, config: &mut HashMap<&str, String>) {
    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if !line.starts_with("pub const ") {
            continue;
        }

        if let Some((name, value)) = parse_const_line(line) {
            if let Some(param) = CONFIG_PARAMS.iter().find(|p| p.name == name) {
                config.insert(param.name, value);
            } else {
                println!("cargo:warning=Unknown config parameter: {}", name);
            }
        }
    }
}

/// Parse a single const line and return (name, value)
fn parse_const_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("pub const ")?.trim();

    let colon_pos = rest.find(':')?;
    let name = rest[..colon_pos].trim().to_string();

    let eq_pos = rest.find('=')?;
    let semi_pos = rest.rfind(';').unwrap_or(rest.len());

    let value = rest[eq_pos + 1..semi_pos].trim().to_string();

    Some((name, value))
}

/// Generate the merged config Rust file
fn generate_config(config: &HashMap<&str, String>) -> String {
    let mut output = String::new();

    output.push_str("// Auto-generated by build.rs - do not edit\n");
    output.push_str("// Configuration merged from per-platform library defaults");

    if env::var("SYSCLOCK_CONFIG_RS").is_ok() {
        output.push_str(" and the user's override file");
    }
    output.push_str("\n\n");

    for param in CONFIG_PARAMS {
        let value = config.get(param.name).unwrap();
        output.push_str(&format!(
            "pub const {}: {} = {};\n",
            param.name, param.rust_type, value
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_const_line() {
        let result = parse_const_line("pub const CLOCK_MIN_WAIT_TIME_NS: u64 = 200;");
        assert_eq!(
            result,
            Some(("CLOCK_MIN_WAIT_TIME_NS".into(), "200".into()))
        );
    }

    #[test]
    fn test_parse_and_merge() {
        let mut config: HashMap<&str, String> = HashMap::new();
        config.insert("CLOCK_MIN_WAIT_TIME_NS", "100".into());

        let user_config = r#"
            // Custom config
            pub const CLOCK_MIN_WAIT_TIME_NS: u64 = 250;
        "#;

        parse_and_merge(user_config, &mut config);

        assert_eq!(
            config.get("CLOCK_MIN_WAIT_TIME_NS"),
            Some(&"250".to_string())
        );
    }
}
