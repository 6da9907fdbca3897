use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::bot::actions::AdminAction;
use crate::database::models::TemplateKey;
use crate::services::notifier::Controls;

pub const BTN_PAYMENT_STATUS: &str = "📤 To'lov holatim";
pub const BTN_MAKE_PAYMENT: &str = "💰 To'lovni amalga oshirish";
pub const BTN_ABOUT: &str = "📎 Bot haqida";
pub const BTN_CONTACT: &str = "📞 Aloqa";
pub const BTN_ADMIN_PANEL: &str = "🔐 Admin Panel";
pub const BTN_ADMIN_TEXTS: &str = "📝 Xabarlar";
pub const BTN_ADMIN_STATS: &str = "📊 Statistika";

pub fn markup_for(controls: &Controls) -> ReplyMarkup {
    match controls {
        Controls::MemberMenu { show_payment } => {
            ReplyMarkup::Keyboard(member_menu(*show_payment))
        }
        Controls::PaymentButton => ReplyMarkup::Keyboard(payment_keyboard()),
        Controls::ApproveReject { member_id } => {
            ReplyMarkup::InlineKeyboard(approve_reject(*member_id))
        }
    }
}

pub fn member_menu(show_payment: bool) -> KeyboardMarkup {
    let mut rows = vec![vec![KeyboardButton::new(BTN_PAYMENT_STATUS)]];
    if show_payment {
        rows.push(vec![KeyboardButton::new(BTN_MAKE_PAYMENT)]);
    }
    rows.push(vec![
        KeyboardButton::new(BTN_ABOUT),
        KeyboardButton::new(BTN_CONTACT),
    ]);
    KeyboardMarkup::new(rows).resize_keyboard(true)
}

pub fn admin_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_ADMIN_PANEL)],
        vec![
            KeyboardButton::new(BTN_ADMIN_TEXTS),
            KeyboardButton::new(BTN_ADMIN_STATS),
        ],
    ])
    .resize_keyboard(true)
}

pub fn payment_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_MAKE_PAYMENT)],
        vec![KeyboardButton::new(BTN_PAYMENT_STATUS)],
    ])
    .resize_keyboard(true)
}

pub fn approve_reject(member_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Tasdiqlash", AdminAction::Approve(member_id).encode()),
        InlineKeyboardButton::callback("❌ Rad etish", AdminAction::Reject(member_id).encode()),
    ]])
}

/// Inline admin panel shown behind the reply-keyboard admin button.
pub fn admin_panel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "⏳ Kutilayotgan to'lovlar",
            AdminAction::Pending.encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "👥 A'zolar ro'yxati",
            AdminAction::Users.encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "⚠️ Muddati tugayotganlar",
            AdminAction::Expiring.encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "📝 Xabar matnlari",
            AdminAction::Texts.encode(),
        )],
    ])
}

pub fn template_list() -> InlineKeyboardMarkup {
    let rows = TemplateKey::ALL
        .iter()
        .map(|key| {
            vec![InlineKeyboardButton::callback(
                key.display_name(),
                AdminAction::EditText(*key).encode(),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}
