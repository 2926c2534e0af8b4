use super::{
    apply_config, discover_config, load_config_file, parse_duration_value,
    types::{ConfigFile, DurationValue},
};
use clap::{CommandFactory, FromArgMatches};
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::tempdir;

use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult, ConfigError};

fn parse_with_matches(argv: &[&str]) -> AppResult<(ProbeArgs, clap::ArgMatches)> {
    let matches = ProbeArgs::command().try_get_matches_from(argv)?;
    let args = ProbeArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("dialtrail.toml");
    let content = r#"
target = "example.com:80"
vus = 3
iterations = 5
blacklist = ["10.0.0.0/8", "fd00::/8"]
dns_ttl = "30s"
timeout = 2

[hosts]
"example.com" = "192.0.2.10"

[tags]
scenario = "smoke"
"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.target.as_deref() != Some("example.com:80") || config.vus != Some(3) {
        return Err(AppError::config("Unexpected target/vus"));
    }
    let hosts = config
        .hosts
        .as_ref()
        .ok_or_else(|| AppError::config("Expected hosts"))?;
    if hosts.get("example.com").map(String::as_str) != Some("192.0.2.10") {
        return Err(AppError::config("Unexpected hosts"));
    }
    if config.blacklist.as_ref().map(Vec::len) != Some(2) {
        return Err(AppError::config("Unexpected blacklist"));
    }
    Ok(())
}

#[test]
fn parse_json_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("dialtrail.json");
    std::fs::write(
        &path,
        r#"{"target": "[::1]:8080", "users": 2, "blocklist": ["127.0.0.0/8"], "nodelay": true}"#,
    )?;

    let config = load_config_file(&path)?;
    if config.target.as_deref() != Some("[::1]:8080")
        || config.vus != Some(2)
        || config.nodelay != Some(true)
    {
        return Err(AppError::config("Unexpected JSON config"));
    }
    if config.blacklist.as_ref().map(Vec::len) != Some(1) {
        return Err(AppError::config("Expected blocklist alias"));
    }
    Ok(())
}

#[test]
fn discovery_prefers_toml_over_json() -> AppResult<()> {
    let dir = tempdir()?;
    if discover_config(dir.path()).is_some() {
        return Err(AppError::config("Empty directory must not yield a config"));
    }

    let json = dir.path().join("dialtrail.json");
    std::fs::write(&json, "{}")?;
    if discover_config(dir.path()).as_deref() != Some(json.as_path()) {
        return Err(AppError::config("Expected the JSON fallback"));
    }

    let toml = dir.path().join("dialtrail.toml");
    std::fs::write(&toml, "")?;
    if discover_config(dir.path()).as_deref() != Some(toml.as_path()) {
        return Err(AppError::config("Expected TOML to win over JSON"));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("dialtrail.yaml");
    std::fs::write(&path, "target: example.com:80")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(_) => Err(AppError::config("Expected unsupported extension")),
    }
}

#[test]
fn apply_config_fills_unset_options() -> AppResult<()> {
    let (mut args, matches) = parse_with_matches(&["dialtrail"])?;
    let config = ConfigFile {
        target: Some("example.com:443".to_owned()),
        vus: Some(8),
        hosts: Some(BTreeMap::from([(
            "example.com".to_owned(),
            "10.0.0.5".to_owned(),
        )])),
        blacklist: Some(vec!["10.0.0.0/8".to_owned()]),
        dns_ttl: Some(DurationValue::Text("1m".to_owned())),
        connect_timeout: Some(DurationValue::Seconds(2)),
        tags: Some(BTreeMap::from([("env".to_owned(), "ci".to_owned())])),
        ..ConfigFile::default()
    };

    apply_config(&mut args, &matches, &config)?;

    if args.target.as_deref() != Some("example.com:443") || args.vus.get() != 8 {
        return Err(AppError::config("Unexpected target/vus"));
    }
    if args.hosts.len() != 1 || args.blacklist.len() != 1 {
        return Err(AppError::config("Unexpected hosts/blacklist"));
    }
    if args.dns_ttl != Duration::from_secs(60) || args.connect_timeout != Duration::from_secs(2)
    {
        return Err(AppError::config("Unexpected durations"));
    }
    if args.tags != [("env".to_owned(), "ci".to_owned())] {
        return Err(AppError::config("Unexpected tags"));
    }
    Ok(())
}

#[test]
fn cli_values_win_over_config() -> AppResult<()> {
    let (mut args, matches) = parse_with_matches(&[
        "dialtrail",
        "--target",
        "cli.test:80",
        "--vus",
        "2",
        "--blacklist",
        "192.168.0.0/16",
    ])?;
    let config = ConfigFile {
        target: Some("config.test:80".to_owned()),
        vus: Some(16),
        blacklist: Some(vec!["10.0.0.0/8".to_owned()]),
        ..ConfigFile::default()
    };

    apply_config(&mut args, &matches, &config)?;

    if args.target.as_deref() != Some("cli.test:80") || args.vus.get() != 2 {
        return Err(AppError::config("CLI target/vus must win"));
    }
    let range = args
        .blacklist
        .first()
        .ok_or_else(|| AppError::config("Expected blacklist"))?;
    if range.to_string() != "192.168.0.0/16" {
        return Err(AppError::config("CLI blacklist must win"));
    }
    Ok(())
}

#[test]
fn apply_config_rejects_invalid_entries() -> AppResult<()> {
    let (mut args, matches) = parse_with_matches(&["dialtrail"])?;
    let config = ConfigFile {
        blacklist: Some(vec!["10.0.0.0/99".to_owned()]),
        ..ConfigFile::default()
    };
    if !matches!(
        apply_config(&mut args, &matches, &config),
        Err(AppError::Config(ConfigError::InvalidBlacklist { .. }))
    ) {
        return Err(AppError::config("Expected InvalidBlacklist"));
    }

    let config = ConfigFile {
        vus: Some(0),
        ..ConfigFile::default()
    };
    if !matches!(
        apply_config(&mut args, &matches, &config),
        Err(AppError::Config(ConfigError::FieldMustBePositive { field: "vus" }))
    ) {
        return Err(AppError::config("Expected FieldMustBePositive"));
    }
    Ok(())
}

#[test]
fn duration_values_parse_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5s", Duration::from_secs(5)),
        ("7", Duration::from_secs(7)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::config(format!("Unexpected duration for {}", input)));
        }
    }
    for input in ["", "ms", "0s", "5d"] {
        if parse_duration_value(input).is_ok() {
            return Err(AppError::config(format!("Expected error for '{}'", input)));
        }
    }
    Ok(())
}
