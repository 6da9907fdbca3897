pub mod admin;
pub mod member;
pub mod text_template;

pub use admin::*;
pub use member::*;
pub use text_template::*;
