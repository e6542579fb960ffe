use super::*;

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_CFG_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_CFG_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_unset_or_invalid_returns_none() {
    assert_eq!(env_bool("__TEST_CFG_SURELY_UNSET_77__"), None);
    let key = "__TEST_CFG_INVALID_78__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// required
// =============================================================================

#[test]
fn required_rejects_unset_variable() {
    assert!(matches!(required("__TEST_CFG_MISSING_42__"), Err(ConfigError::Missing(_))));
}

#[test]
fn required_rejects_blank_value() {
    let key = "__TEST_CFG_BLANK_43__";
    unsafe { std::env::set_var(key, "   ") };
    let result = required(key);
    unsafe { std::env::remove_var(key) };
    assert!(matches!(result, Err(ConfigError::Missing(_))));
}

#[test]
fn missing_error_names_the_variable() {
    let Err(error) = required("__TEST_CFG_NAMED_44__") else {
        panic!("expected missing");
    };
    assert!(error.to_string().contains("__TEST_CFG_NAMED_44__"));
}
