use super::Config;
use crate::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_empty_config_uses_defaults() {
    let cfg = Config::parse("").unwrap();
    assert_eq!(cfg.api_base, "https://docs.googleapis.com/v1");
    assert_eq!(cfg.token_env, "DOCSMITH_ACCESS_TOKEN");
    assert_eq!(cfg.code_font, "Courier New");
    assert_eq!(cfg.max_nesting, 32);
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let cfg = Config::parse("code_font = \"JetBrains Mono\"\nmax_nesting = 8\n").unwrap();
    assert_eq!(cfg.code_font, "JetBrains Mono");
    assert_eq!(cfg.max_nesting, 8);
    assert_eq!(cfg.api_base, "https://docs.googleapis.com/v1");
}

#[test]
fn test_load_explicit_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "api_base = \"http://localhost:8080/v1\"").unwrap();

    let cfg = Config::load(Some(file.path())).unwrap();
    assert_eq!(cfg.api_base, "http://localhost:8080/v1");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(Some(&dir.path().join("nope.toml")));
    assert!(matches!(result, Err(Error::Io(_))), "Got {result:?}");
}

#[test]
fn test_malformed_config_is_an_error() {
    let result = Config::parse("max_nesting = = 3");
    assert!(matches!(result, Err(Error::Config(_))), "Got {result:?}");
}

#[test]
fn test_access_token_from_environment() {
    let mut cfg = Config::parse("").unwrap();
    cfg.token_env = "DOCSMITH_TEST_TOKEN_PRESENT".to_string();
    std::env::set_var(&cfg.token_env, "  secret \n");
    assert_eq!(cfg.access_token().unwrap(), "secret");

    cfg.token_env = "DOCSMITH_TEST_TOKEN_ABSENT".to_string();
    assert!(matches!(
        cfg.access_token(),
        Err(Error::MissingToken(name)) if name == "DOCSMITH_TEST_TOKEN_ABSENT"
    ));
}
