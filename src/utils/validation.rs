use anyhow::{anyhow, Result};

pub fn validate_full_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Full name cannot be empty"));
    }

    if name.len() > 100 {
        return Err(anyhow!("Full name cannot be longer than 100 characters"));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Full name cannot contain line breaks"));
    }

    Ok(name.to_string())
}

/// Accepts an optional leading `+` followed by 10 to 13 digits.
/// Whitespace is stripped before validation; the stripped form is returned.
pub fn validate_phone_number(phone: &str) -> Result<String> {
    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();

    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Phone number must contain only digits"));
    }

    if digits.len() < 10 || digits.len() > 13 {
        return Err(anyhow!("Phone number must be 10 to 13 digits long"));
    }

    Ok(stripped)
}

pub fn validate_rejection_reason(reason: &str) -> Result<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(anyhow!("Rejection reason cannot be empty"));
    }

    Ok(reason.to_string())
}

pub fn validate_template_value(value: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(anyhow!("Template value cannot be empty"));
    }

    Ok(value.to_string())
}
