use log::{error, info, warn};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;
use url::Url;

use crate::config::BotConfig;
use crate::engine::{Action, ConversationEngine, Event, EventKind, MessageRef, Reply};
use crate::handlers::{CallbackHandler, CommandHandler};
use crate::localization::Lang;
use crate::movie_store::MovieStore;
use crate::subscription::{MembershipLookup, SubscriptionOracle};
use crate::user_session::SessionManager;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "open the admin panel")]
    Admin,
}

pub struct TelegramBot {
    bot: Arc<Bot>,
    engine: Arc<ConversationEngine>,
    invite_link: Option<Url>,
}

#[derive(Clone)]
pub struct BotContext {
    pub bot: Arc<Bot>,
    pub engine: Arc<ConversationEngine>,
    pub invite_link: Option<Url>,
}

impl TelegramBot {
    pub async fn new(config: &BotConfig) -> Self {
        let bot = Arc::new(Bot::new(&config.bot_token));
        let store = Arc::new(MovieStore::open(&config.movies_file).await);
        info!(
            "Serving {} movie codes from {}",
            store.len().await,
            config.movies_file.display()
        );

        let lookup: Arc<dyn MembershipLookup> = bot.clone();
        let oracle = Arc::new(SubscriptionOracle::new(&config.required_channels, lookup));
        if oracle.channels().is_empty() {
            info!("No required channels configured, subscription gate is disabled");
        }

        let engine = Arc::new(ConversationEngine::new(
            store,
            SessionManager::new(),
            oracle,
            config.admin_id,
        ));

        Self {
            bot,
            engine,
            invite_link: config.invite_link.clone(),
        }
    }

    pub async fn run(&self) {
        info!("Starting Telegram bot...");

        let ctx = BotContext {
            bot: self.bot.clone(),
            engine: self.engine.clone(),
            invite_link: self.invite_link.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint({
                let ctx = ctx.clone();
                move |query: CallbackQuery| {
                    let ctx = ctx.clone();
                    async move { CallbackHandler::handle_callback_query(ctx, query).await }
                }
            }))
            .branch(
                Update::filter_message()
                    .branch(dptree::entry().filter_command::<Command>().endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message, cmd: Command| {
                            let ctx = ctx.clone();
                            async move { CommandHandler::handle_command(ctx, msg, cmd).await }
                        }
                    }))
                    .branch(dptree::endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message| {
                            let ctx = ctx.clone();
                            async move { Self::handle_message(ctx, msg).await }
                        }
                    })),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .error_handler(
                teloxide::error_handlers::LoggingErrorHandler::with_custom_text(
                    "An error from the update listener",
                ),
            )
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_message(ctx: BotContext, msg: Message) -> ResponseResult<()> {
        let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
            return Ok(());
        };
        let lang = Lang::from_code(user.language_code.as_deref());

        let event = Event {
            sender_id: user.id.0 as i64,
            chat_id: msg.chat.id.0,
            lang,
            kind: EventKind::Text(text.to_string()),
        };
        let actions = ctx.engine.handle(event).await;
        Self::deliver(&ctx, lang, actions, None).await;
        Ok(())
    }

    /// executes engine actions; delivery failures are logged and never retried
    pub async fn deliver(
        ctx: &BotContext,
        lang: Lang,
        actions: Vec<Action>,
        callback_id: Option<&str>,
    ) {
        for request in plan_delivery(actions, callback_id) {
            match request {
                Outgoing::Send { chat_id, reply } => {
                    let mut request = ctx
                        .bot
                        .send_message(ChatId(chat_id), reply.text)
                        .parse_mode(ParseMode::Html);
                    if let Some(keyboard) = reply.keyboard {
                        request = request.reply_markup(CallbackHandler::render_keyboard(
                            keyboard,
                            lang,
                            ctx.invite_link.as_ref(),
                        ));
                    }
                    if let Err(e) = request.await {
                        error!("Failed to send message to chat {}: {}", chat_id, e);
                    }
                }
                Outgoing::Edit { message, reply } => {
                    let mut request = ctx
                        .bot
                        .edit_message_text(
                            ChatId(message.chat_id),
                            MessageId(message.message_id),
                            reply.text,
                        )
                        .parse_mode(ParseMode::Html);
                    if let Some(keyboard) = reply.keyboard {
                        request = request.reply_markup(CallbackHandler::render_keyboard(
                            keyboard,
                            lang,
                            ctx.invite_link.as_ref(),
                        ));
                    }
                    if let Err(e) = request.await {
                        error!(
                            "Failed to edit message {} in chat {}: {}",
                            message.message_id, message.chat_id, e
                        );
                    }
                }
                Outgoing::AnswerCallback { callback_id, alert } => {
                    let mut request = ctx.bot.answer_callback_query(callback_id.as_str());
                    if let Some(text) = alert {
                        request = request.text(text).show_alert(true);
                    }
                    if let Err(e) = request.await {
                        error!("Failed to answer callback query {}: {}", callback_id, e);
                    }
                }
            }
        }
    }
}

/// one Telegram request derived from the engine's actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Send { chat_id: i64, reply: Reply },
    Edit { message: MessageRef, reply: Reply },
    AnswerCallback {
        callback_id: String,
        alert: Option<String>,
    },
}

/// Orders the requests for one handled update.
/// A pressed button is answered exactly once: with the first alert if the engine
/// produced one, otherwise with an empty answer after everything else.
pub fn plan_delivery(actions: Vec<Action>, callback_id: Option<&str>) -> Vec<Outgoing> {
    let mut requests = Vec::with_capacity(actions.len() + 1);
    let mut callback_answered = false;

    for action in actions {
        match action {
            Action::Send { chat_id, reply } => requests.push(Outgoing::Send { chat_id, reply }),
            Action::Edit { message, reply } => requests.push(Outgoing::Edit { message, reply }),
            Action::Alert { text } => match callback_id {
                None => error!("Alert '{}' has no callback query to answer", text),
                Some(_) if callback_answered => {
                    warn!("Callback already answered, dropping alert '{}'", text)
                }
                Some(id) => {
                    requests.push(Outgoing::AnswerCallback {
                        callback_id: id.to_string(),
                        alert: Some(text),
                    });
                    callback_answered = true;
                }
            },
        }
    }

    if let (Some(id), false) = (callback_id, callback_answered) {
        requests.push(Outgoing::AnswerCallback {
            callback_id: id.to_string(),
            alert: None,
        });
    }

    requests
}
