use crate::database::models::TemplateKey;

/// Admin actions carried in inline-button callback data.
///
/// `encode` and `parse` are the only places the wire strings appear, so a
/// keyboard and its handler cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Pending,
    Users,
    Expiring,
    Texts,
    EditText(TemplateKey),
    Approve(i64),
    Reject(i64),
}

impl AdminAction {
    pub fn encode(&self) -> String {
        match self {
            AdminAction::Pending => "admin_pending".to_string(),
            AdminAction::Users => "admin_users".to_string(),
            AdminAction::Expiring => "admin_expiring".to_string(),
            AdminAction::Texts => "admin_texts".to_string(),
            AdminAction::EditText(key) => format!("edit_text_{}", key.as_str()),
            AdminAction::Approve(member_id) => format!("approve_{}", member_id),
            AdminAction::Reject(member_id) => format!("reject_{}", member_id),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "admin_pending" => return Some(AdminAction::Pending),
            "admin_users" => return Some(AdminAction::Users),
            "admin_expiring" => return Some(AdminAction::Expiring),
            "admin_texts" => return Some(AdminAction::Texts),
            _ => {}
        }

        if let Some(raw) = data.strip_prefix("edit_text_") {
            return TemplateKey::parse(raw).map(AdminAction::EditText);
        }
        if let Some(raw) = data.strip_prefix("approve_") {
            return raw.parse().ok().map(AdminAction::Approve);
        }
        if let Some(raw) = data.strip_prefix("reject_") {
            return raw.parse().ok().map(AdminAction::Reject);
        }
        None
    }
}
