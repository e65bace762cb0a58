use log::{debug, info};
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage,
};
use url::Url;

use crate::bot::{BotContext, TelegramBot};
use crate::engine::{ButtonAction, Event, EventKind, Keyboard, MessageRef};
use crate::localization::Lang;

pub struct CallbackHandler;

impl CallbackHandler {
    fn get_message_ref(message: &MaybeInaccessibleMessage) -> MessageRef {
        let (chat_id, message_id) = match message {
            MaybeInaccessibleMessage::Regular(msg) => (msg.chat.id, msg.id),
            MaybeInaccessibleMessage::Inaccessible(msg) => (msg.chat.id, msg.message_id),
        };
        MessageRef {
            chat_id: chat_id.0,
            message_id: message_id.0,
        }
    }

    pub fn create_activate_keyboard(lang: Lang) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            lang.button_activate(),
            ButtonAction::Activate.callback_data(),
        )]])
    }

    pub fn create_subscribe_keyboard(lang: Lang, invite_link: Option<&Url>) -> InlineKeyboardMarkup {
        let mut rows = Vec::new();
        if let Some(link) = invite_link {
            rows.push(vec![InlineKeyboardButton::url(
                lang.button_join_channel(),
                link.clone(),
            )]);
        }
        rows.push(vec![InlineKeyboardButton::callback(
            lang.button_check_subscription(),
            ButtonAction::CheckSubscription.callback_data(),
        )]);
        InlineKeyboardMarkup::new(rows)
    }

    pub fn create_admin_keyboard(lang: Lang) -> InlineKeyboardMarkup {
        let add_button = InlineKeyboardButton::callback(
            lang.button_admin_add(),
            ButtonAction::AdminAddMovie.callback_data(),
        );
        let list_button = InlineKeyboardButton::callback(
            lang.button_admin_list(),
            ButtonAction::AdminListMovies.callback_data(),
        );
        let delete_button = InlineKeyboardButton::callback(
            lang.button_admin_delete(),
            ButtonAction::AdminDeleteMovie.callback_data(),
        );

        InlineKeyboardMarkup::new(vec![vec![add_button], vec![list_button], vec![delete_button]])
    }

    pub fn render_keyboard(
        keyboard: Keyboard,
        lang: Lang,
        invite_link: Option<&Url>,
    ) -> InlineKeyboardMarkup {
        match keyboard {
            Keyboard::Activate => Self::create_activate_keyboard(lang),
            Keyboard::Subscribe => Self::create_subscribe_keyboard(lang, invite_link),
            Keyboard::AdminMenu => Self::create_admin_keyboard(lang),
        }
    }

    pub async fn handle_callback_query(
        ctx: BotContext,
        query: CallbackQuery,
    ) -> ResponseResult<()> {
        let lang = Lang::from_code(query.from.language_code.as_deref());

        let action = query
            .data
            .as_deref()
            .and_then(ButtonAction::from_callback_data);

        match (action, &query.message) {
            (Some(action), Some(message)) => {
                let message = Self::get_message_ref(message);
                info!(
                    "User {} pressed {}",
                    query.from.id.0,
                    action.callback_data()
                );

                let event = Event {
                    sender_id: query.from.id.0 as i64,
                    chat_id: message.chat_id,
                    lang,
                    kind: EventKind::Button { action, message },
                };
                let actions = ctx.engine.handle(event).await;
                TelegramBot::deliver(&ctx, lang, actions, Some(query.id.as_str())).await;
            }
            _ => {
                debug!(
                    "Ignoring callback {:?} from user {}",
                    query.data, query.from.id.0
                );
                ctx.bot.answer_callback_query(&query.id).await?;
            }
        }
        Ok(())
    }
}
