#![forbid(unsafe_code)]

//! Cascade Demo Showcase
//!
//! Walks a deterministic alert feed through the whole selection flow:
//! search, pick, project to a filter map, match records, persist and restore.
//!
//! # Running
//!
//! ```sh
//! cargo run -p cascade-demo-showcase
//! CASCADE_DEMO_QUERY=pool CASCADE_DEMO_MODE=single cargo run -p cascade-demo-showcase
//! CASCADE_LOG=cascade=debug cargo run -p cascade-demo-showcase
//! ```
//!
//! # Environment
//!
//! - `CASCADE_DEMO_QUERY`: search query (default `crit`)
//! - `CASCADE_DEMO_MODE`: `single`, `single-toggle` or `multi` (default `multi`)
//! - `CASCADE_LOG`: tracing filter directives (default `info`)

mod data;

use std::error::Error;
use std::io::{self, Write};

use cascade::{Cascader, CascaderConfig, CascaderPersistState, KeyPath, OptionNode, SelectMode};
use tracing_subscriber::EnvFilter;

type DemoResult<T> = std::result::Result<T, Box<dyn Error>>;

const FEED_SEED: u64 = 0x00c0_ffee;
const FEED_SIZE: usize = 40;
const DEFAULT_QUERY: &str = "crit";

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DemoConfig {
    query: String,
    mode: SelectMode,
}

impl DemoConfig {
    fn from_env() -> DemoResult<Self> {
        Self::from_vars(
            std::env::var("CASCADE_DEMO_QUERY").ok(),
            std::env::var("CASCADE_DEMO_MODE").ok(),
        )
    }

    fn from_vars(query: Option<String>, mode: Option<String>) -> DemoResult<Self> {
        let mode = match mode {
            Some(raw) => raw.parse()?,
            None => SelectMode::Multi,
        };
        Ok(Self {
            query: query.unwrap_or_else(|| DEFAULT_QUERY.to_owned()),
            mode,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CASCADE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_tree(out: &mut impl Write, nodes: &[OptionNode], depth: usize) -> io::Result<()> {
    for node in nodes {
        let marker = if node.is_disabled() { " (disabled)" } else { "" };
        writeln!(out, "{:indent$}- {}{marker}", "", node.label(), indent = depth * 2)?;
        write_tree(out, node.children(), depth + 1)?;
    }
    Ok(())
}

fn run(config: &DemoConfig, out: &mut impl Write) -> DemoResult<()> {
    tracing::info!(query = %config.query, mode = config.mode.as_str(), "cascade demo starting");

    let mut cascader = Cascader::try_new(
        data::alert_tree(),
        CascaderConfig::default()
            .with_mode(config.mode)
            .with_persistence_id("alerts"),
    )?;
    let alerts = data::alert_feed(FEED_SEED, FEED_SIZE);

    writeln!(out, "== visible options for {:?}", config.query)?;
    let visible = cascader.visible(&config.query);
    write_tree(out, visible.roots(), 0)?;

    let mut state = cascader.empty_state();
    for hit in cascader.search(&config.query) {
        if hit.disabled {
            tracing::info!(path = %hit.path, "skipping disabled hit");
            continue;
        }
        state = cascader.pick(&state, &hit.path);
    }
    state = cascader.pick(&state, &KeyPath::from(["status", "active"]));

    writeln!(out, "== selected")?;
    for label in cascader.labels(&state) {
        writeln!(out, "  {label}")?;
    }

    let filter = cascader.filter_map(&state);
    writeln!(out, "== filter map\n  {}", serde_json::to_string(&filter)?)?;

    let matched = filter.filter(&alerts);
    writeln!(out, "== {} of {} alerts match", matched.len(), alerts.len())?;
    for alert in &matched {
        writeln!(out, "  {}", serde_json::to_string(alert)?)?;
    }

    let saved = cascader.save_state(&state, &config.query);
    let json = saved.to_json()?;
    writeln!(out, "== persisted under {}\n  {json}", cascader.state_key())?;

    cascader.set_tree(data::alert_tree());
    let restored = cascader.restore_state(&CascaderPersistState::from_json(&json)?);
    tracing::info!(
        restored = restored.len(),
        unchanged = restored == state,
        "cascade demo finished"
    );
    Ok(())
}

fn main() -> DemoResult<()> {
    init_tracing();
    let config = DemoConfig::from_env()?;
    run(&config, &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_multi_and_crit() {
        let config = DemoConfig::from_vars(None, None).expect("default config");
        assert_eq!(config.query, DEFAULT_QUERY);
        assert_eq!(config.mode, SelectMode::Multi);
    }

    #[test]
    fn config_parses_mode_names() {
        let config = DemoConfig::from_vars(Some("pool".to_owned()), Some("single-toggle".to_owned()))
            .expect("toggle config");
        assert_eq!(config.query, "pool");
        assert_eq!(config.mode, SelectMode::Single { toggle: true });
        assert!(DemoConfig::from_vars(None, Some("sideways".to_owned())).is_err());
    }

    #[test]
    fn config_from_env_reads_the_same_variables() {
        let expected = DemoConfig::from_vars(
            std::env::var("CASCADE_DEMO_QUERY").ok(),
            std::env::var("CASCADE_DEMO_MODE").ok(),
        );
        match (DemoConfig::from_env(), expected) {
            (Ok(actual), Ok(expected)) => assert_eq!(actual, expected),
            (Err(_), Err(_)) => {}
            (actual, expected) => panic!("from_env {actual:?} != from_vars {expected:?}"),
        }
    }

    #[test]
    fn run_prints_every_stage() {
        let config = DemoConfig::from_vars(None, None).expect("default config");
        let mut out = Vec::new();
        run(&config, &mut out).expect("demo run");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert!(text.contains("== visible options for \"crit\""));
        assert!(text.contains("- Severity"));
        assert!(text.contains("  Severity / Critical"));
        assert!(text.contains("  Status / Active"));
        assert!(text.contains(r#"{"severity":"critical","status":"active"}"#));
        assert!(text.contains("alerts match"));
        assert!(text.contains("== persisted under Cascader/alerts"));
    }

    #[test]
    fn run_in_single_mode_keeps_last_pick() {
        let config = DemoConfig::from_vars(Some("warn".to_owned()), Some("single".to_owned()))
            .expect("single config");
        let mut out = Vec::new();
        run(&config, &mut out).expect("demo run");
        let text = String::from_utf8(out).expect("utf-8 output");
        assert!(text.contains(r#"{"status":"active"}"#));
        assert!(!text.contains("  Severity / Warning"));
    }
}
