use log::info;
use teloxide::prelude::*;

use crate::bot::{BotContext, Command, TelegramBot};
use crate::engine::{Event, EventKind};
use crate::localization::Lang;

pub struct CommandHandler;

impl CommandHandler {
    pub async fn handle_command(ctx: BotContext, msg: Message, cmd: Command) -> ResponseResult<()> {
        let Some(user) = msg.from.as_ref() else {
            return Ok(());
        };
        let lang = Lang::from_code(user.language_code.as_deref());

        let kind = match cmd {
            Command::Start => {
                info!(
                    "User {} ({}) started the bot",
                    user.id.0,
                    user.username.as_deref().unwrap_or("no username")
                );
                EventKind::Start
            }
            Command::Admin => EventKind::AdminPanel,
        };

        let event = Event {
            sender_id: user.id.0 as i64,
            chat_id: msg.chat.id.0,
            lang,
            kind,
        };
        let actions = ctx.engine.handle(event).await;
        TelegramBot::deliver(&ctx, lang, actions, None).await;
        Ok(())
    }
}
