pub mod actions;
pub mod admin;
pub mod handlers;
pub mod keyboards;
pub mod replies;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Mavjud buyruqlar:")]
pub enum Command {
    #[command(description = "ro'yxatdan o'tish yoki menyuni ochish")]
    Start,
}
