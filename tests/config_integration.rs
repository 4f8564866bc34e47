//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `sift.toml` drives the include strategy of
//! repositories and factories.

mod common;

use std::io::Write;
use std::sync::Arc;

use sift::prelude::*;
use sift::query::{ErrorCode, SiftConfig};
use sift_memory::{MemoryContext, MemoryContextFactory};

use common::{CUSTOMER, Order, seeded_store};

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config = SiftConfig::from_str("").expect("Failed to parse config");
    assert_eq!(config.include_strategy(), IncludeStrategy::Cached);
    assert_eq!(config.logging.level, "warn");
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config_str = r#"
        [evaluator]
        include_strategy = "direct"

        [logging]
        level = "debug"
        format = "pretty"
    "#;

    let config = SiftConfig::from_str(config_str).expect("Failed to parse config");
    assert_eq!(config.include_strategy(), IncludeStrategy::Direct);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "pretty");
}

/// Test loading configuration from a file
#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "[evaluator]\ninclude_strategy = \"direct\"").expect("Failed to write config");

    let config = SiftConfig::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.include_strategy(), IncludeStrategy::Direct);
}

/// Test a missing file is a configuration error
#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = SiftConfig::from_file(dir.path().join("sift.toml")).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test unknown strategies and fields are rejected
#[test]
fn test_config_invalid() {
    let err = SiftConfig::from_str("[evaluator]\ninclude_strategy = \"eager\"").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err = SiftConfig::from_str("[evaluator]\ncache_size = 10").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test repositories and factories built from configuration
#[tokio::test]
async fn test_config_drives_repositories() {
    let config = SiftConfig::from_str("[evaluator]\ninclude_strategy = \"direct\"").unwrap();

    let factory = ContextRepositoryFactory::from_config(MemoryContextFactory::new(seeded_store()), &config);
    assert_eq!(factory.strategy(), IncludeStrategy::Direct);

    let context = Arc::new(MemoryContext::new(seeded_store()));
    let orders: Repository<Order, _> = Repository::from_config(context, &config);
    let spec = Specification::builder()
        .r#where(Filter::eq("customer_id", 2))
        .include(&CUSTOMER)
        .build();
    assert_eq!(orders.count(&spec, CancellationToken::new()).await.unwrap(), 3);
    assert_eq!(orders.list(&spec, CancellationToken::new()).await.unwrap().len(), 3);
}
