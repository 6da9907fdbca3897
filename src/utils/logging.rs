use tracing::{info, warn};

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}

/// Logs an incoming member interaction with consistent format
pub fn log_member_event(event: &str, telegram_id: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("MEMBER: {} by {} - {}", event, telegram_id, d),
        None => info!("MEMBER: {} by {}", event, telegram_id),
    }
}

/// Logs admin actions with consistent format
pub fn log_admin_action(action: &str, admin_id: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("ADMIN: {} by {} - {}", action, admin_id, d),
        None => info!("ADMIN: {} by {}", action, admin_id),
    }
}

/// Logs validation errors with consistent format
pub fn log_validation_error(field: &str, value: &str, error: &str, telegram_id: &str) {
    warn!(
        "VALIDATION_ERROR: {} field '{}' invalid: {} - member {}",
        field, value, error, telegram_id
    );
}

/// Logs outbound notification failures with consistent format
pub fn log_notification_failure(kind: &str, recipient: &str, error: &str) {
    warn!("NOTIFY_FAIL: {} to {} failed: {}", kind, recipient, error);
}

/// Logs scheduled sweep results with consistent format
pub fn log_sweep_result(sweep: &str, matched: usize, notified: usize) {
    info!(
        "SWEEP: {} matched {} member(s), notified {}",
        sweep, matched, notified
    );
}
