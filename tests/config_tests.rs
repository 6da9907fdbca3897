use membership_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("DATABASE_URL");
    env::remove_var("HTTP_PORT");
    env::remove_var("TELEGRAM_GROUP_ID");
    env::remove_var("DEFAULT_ADMIN_TELEGRAM_ID");
    env::remove_var("UPLOADS_DIR");
    env::remove_var("MEMBERSHIP_FEE");
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("TELEGRAM_GROUP_ID", "-1001234567890");
    env::set_var("DEFAULT_ADMIN_TELEGRAM_ID", "424242");
    env::set_var("UPLOADS_DIR", "./proofs");
    env::set_var("MEMBERSHIP_FEE", "75000");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.group_id, Some(-1001234567890));
    assert_eq!(config.default_admin_id.as_deref(), Some("424242"));
    assert_eq!(config.uploads_dir, "./proofs");
    assert_eq!(config.membership_fee, 75000);

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    // Only set required token, let others use defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/membership.db");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.group_id, None);
    assert_eq!(config.default_admin_id, None);
    assert_eq!(config.uploads_dir, "./uploads");
    assert_eq!(config.membership_fee, 50000);

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("HTTP_PORT", "invalid_port");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid HTTP_PORT"));

    clear_env();
}

#[test]
fn test_config_invalid_group_id() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("TELEGRAM_GROUP_ID", "not-a-chat-id");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid TELEGRAM_GROUP_ID"));

    clear_env();
}

#[test]
fn test_config_invalid_membership_fee() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("MEMBERSHIP_FEE", "fifty thousand");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid MEMBERSHIP_FEE"));

    clear_env();
}

#[test]
fn test_config_port_edge_cases() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    // Test port 0
    env::set_var("HTTP_PORT", "0");
    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 0);

    // Test max port
    env::set_var("HTTP_PORT", "65535");
    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 65535);

    // Test negative port (should fail)
    env::set_var("HTTP_PORT", "-1");
    let result = Config::from_env();
    assert!(result.is_err());

    clear_env();
}

#[test]
fn test_config_empty_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    // Test empty token (should fail)
    env::set_var("TELEGRAM_BOT_TOKEN", "");
    let result = Config::from_env();
    assert!(result.is_err());

    // Empty optional values fall back to their defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("DATABASE_URL", "");
    env::set_var("TELEGRAM_GROUP_ID", "");
    env::set_var("DEFAULT_ADMIN_TELEGRAM_ID", "");
    env::set_var("UPLOADS_DIR", "");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:./data/membership.db");
    assert_eq!(config.group_id, None);
    assert_eq!(config.default_admin_id, None);
    assert_eq!(config.uploads_dir, "./uploads");

    clear_env();
}

#[test]
fn test_config_whitespace_handling() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "  token_with_spaces  ");
    env::set_var("DATABASE_URL", "  sqlite:spaced.db  ");
    env::set_var("HTTP_PORT", "  3000  ");
    env::set_var("TELEGRAM_GROUP_ID", "  -100123  ");
    env::set_var("MEMBERSHIP_FEE", "  60000  ");

    let config = Config::from_env().unwrap();

    // Environment variables should preserve whitespace as-is
    assert_eq!(config.telegram_bot_token, "  token_with_spaces  ");
    assert_eq!(config.database_url, "  sqlite:spaced.db  ");
    // Numeric values should be parsed with whitespace trimmed
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.group_id, Some(-100123));
    assert_eq!(config.membership_fee, 60000);

    clear_env();
}
