//! ---
//! reop_section: "06-testing-qa"
//! reop_subsection: "integration-tests"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Validation tests for the shipped configuration examples."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;
use std::str::FromStr;

use reop_common::config::AppConfig;

fn read(path: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let full = Path::new(manifest_dir).join("..").join(path);
    fs::read_to_string(&full)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", full.display(), err))
}

#[test]
fn example_configs_carry_frontmatter_headers() {
    for config in ["configs/example.dev.toml", "configs/example.prod.toml"] {
        let content = read(config);
        assert!(
            content.starts_with("# ---"),
            "{config} must include frontmatter header"
        );
    }
}

#[test]
fn example_dev_config_parses_and_pins_a_seed() {
    let config =
        AppConfig::from_str(&read("configs/example.dev.toml")).expect("dev config parses");
    assert_eq!(config.site.name, "dev-microgrid");
    assert_eq!(config.feed.seed, Some(42));
    assert_eq!(config.feed.interval.as_secs(), 5);
}

#[test]
fn example_prod_config_parses_without_a_seed() {
    let config =
        AppConfig::from_str(&read("configs/example.prod.toml")).expect("prod config parses");
    assert_eq!(config.site.name, "microgrid-alpha");
    assert!(config.feed.seed.is_none());
    assert!(config.metrics.enabled);
    assert!(config.api.enabled);
}
