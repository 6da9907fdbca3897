pub mod callback;
pub mod message;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::bot::replies::PendingReplies;
use crate::database::connection::DatabaseManager;
use crate::services::registration::RegistrationFlow;
use crate::services::workflow::ApprovalWorkflow;

/// Shared state handed to every update handler.
pub struct BotContext {
    pub db: DatabaseManager,
    pub flow: RegistrationFlow,
    pub workflow: Arc<ApprovalWorkflow>,
    pub pending: PendingReplies,
    pub uploads_dir: String,
    pub membership_fee: i64,
}

pub struct BotHandler {
    ctx: Arc<BotContext>,
}

impl BotHandler {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    pub fn schema(&self) -> UpdateHandler<teloxide::RequestError> {
        use teloxide::dispatching::UpdateFilterExt;

        let ctx_command = self.ctx.clone();
        let ctx_message = self.ctx.clone();
        let ctx_callback = self.ctx.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, ctx).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(move |bot, msg| {
                let ctx = ctx_message.clone();
                async move { message::message_handler(bot, msg, ctx).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |bot, q| {
                let ctx = ctx_callback.clone();
                async move { callback::callback_handler(bot, q, ctx).await }
            }))
    }
}
