/// supported languages for the bot UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ru,
}

impl Lang {
    /// creates Lang from Telegram's language_code (e.g., "ru", "en", "uk")
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("ru") => Lang::Ru,
            _ => Lang::En,
        }
    }
}

// =============================================================================
// Start and activation
// =============================================================================

impl Lang {
    pub fn greeting(&self) -> &'static str {
        match self {
            Lang::En => {
                "Hi! 👋\n\n\
                I can tell you the movie title by the code from a video.\n\
                Press <b>Activate</b> below, then just send me a code (for example: A123)."
            }
            Lang::Ru => {
                "Привет! 👋\n\n\
                Я помогу тебе узнать название фильма по коду из видео.\n\
                Нажми <b>Активировать</b> ниже, а потом просто отправь мне код (например: A123)."
            }
        }
    }

    pub fn activated(&self) -> &'static str {
        match self {
            Lang::En => "✅ Bot activated!\n\nNow send me a code from the video.",
            Lang::Ru => "✅ Бот активирован!\n\nТеперь отправь мне код из видео.",
        }
    }

    pub fn activation_required(&self) -> &'static str {
        match self {
            Lang::En => "☝️ Please activate the bot first by pressing the button below.",
            Lang::Ru => "☝️ Сначала активируй бота, нажав кнопку ниже.",
        }
    }
}

// =============================================================================
// Code lookup and subscription
// =============================================================================

impl Lang {
    pub fn code_not_found(&self) -> &'static str {
        match self {
            Lang::En => "❌ I couldn't find that code. Check that you typed it correctly.",
            Lang::Ru => "❌ Не нашёл такой код. Проверь, правильно ли ты его ввёл.",
        }
    }

    /// `code` and `title` must already be HTML-escaped
    pub fn movie_title(&self, code: &str, title: &str) -> String {
        match self {
            Lang::En => format!("🎬 Movie title for code <b>{}</b>:\n\n<b>{}</b>", code, title),
            Lang::Ru => format!("🎬 Название фильма по коду <b>{}</b>:\n\n<b>{}</b>", code, title),
        }
    }

    pub fn subscribe_prompt(&self) -> &'static str {
        match self {
            Lang::En => {
                "To see the movie title, please subscribe to the channel 👇\n\n\
                After subscribing, press «✅ I subscribed»."
            }
            Lang::Ru => {
                "Чтобы узнать название фильма, нужно подписаться на канал 👇\n\n\
                После подписки нажми кнопку «✅ Я подписался»."
            }
        }
    }

    pub fn not_subscribed_alert(&self) -> &'static str {
        match self {
            Lang::En => "You haven't subscribed to the channel yet 🙏",
            Lang::Ru => "Ты ещё не подписался на канал 🙏",
        }
    }

    pub fn subscription_confirmed(&self) -> &'static str {
        match self {
            Lang::En => {
                "Subscription confirmed ✅\n\
                Now just send me a code from the video and I'll tell you the movie title. 🎬"
            }
            Lang::Ru => {
                "Подписка есть ✅\n\
                Теперь просто отправь код из видео, и я скажу название фильма. 🎬"
            }
        }
    }

    pub fn pending_code_mismatch(&self) -> &'static str {
        match self {
            Lang::En => {
                "You're subscribed ✅\n\
                But something went wrong with the code. Please send it again."
            }
            Lang::Ru => {
                "Ты подписан ✅\n\
                Но что-то пошло не так с кодом. Отправь код ещё раз, пожалуйста."
            }
        }
    }
}

// =============================================================================
// Admin panel
// =============================================================================

impl Lang {
    pub fn admin_access_denied(&self) -> &'static str {
        match self {
            Lang::En => "You don't have access to the admin panel.",
            Lang::Ru => "У тебя нет доступа к админ-панели.",
        }
    }

    pub fn admin_no_access_alert(&self) -> &'static str {
        match self {
            Lang::En => "No access.",
            Lang::Ru => "Нет доступа.",
        }
    }

    pub fn admin_panel(&self) -> &'static str {
        match self {
            Lang::En => "🛠 Admin panel:",
            Lang::Ru => "🛠 Админ-панель:",
        }
    }

    pub fn admin_add_prompt(&self) -> &'static str {
        match self {
            Lang::En => "Adding a movie.\n\nSend the movie code (for example: <b>A123</b>).",
            Lang::Ru => "Режим добавления фильма.\n\nОтправь код фильма (например: <b>A123</b>).",
        }
    }

    pub fn admin_code_empty(&self) -> &'static str {
        match self {
            Lang::En => "The code can't be empty. Send the movie code.",
            Lang::Ru => "Код не может быть пустым. Отправь код фильма.",
        }
    }

    pub fn admin_code_saved(&self, code: &str) -> String {
        match self {
            Lang::En => format!("Code <b>{}</b> saved. Now send the movie title.", code),
            Lang::Ru => format!("Код <b>{}</b> сохранён. Теперь отправь название фильма.", code),
        }
    }

    pub fn admin_movie_added(&self, code: &str, title: &str) -> String {
        match self {
            Lang::En => format!(
                "✅ Movie added:\nCode: <b>{}</b>\nTitle: <b>{}</b>",
                code, title
            ),
            Lang::Ru => format!(
                "✅ Фильм добавлен:\nКод: <b>{}</b>\nНазвание: <b>{}</b>",
                code, title
            ),
        }
    }

    pub fn admin_delete_prompt(&self) -> &'static str {
        match self {
            Lang::En => "Deleting a movie.\n\nSend the code of the movie to delete.",
            Lang::Ru => "Режим удаления фильма.\n\nОтправь код фильма, который нужно удалить.",
        }
    }

    pub fn admin_movie_deleted(&self, code: &str, title: &str) -> String {
        match self {
            Lang::En => format!("🗑 Movie deleted:\nCode: <b>{}</b>\nTitle: <b>{}</b>", code, title),
            Lang::Ru => format!("🗑 Фильм удалён:\nКод: <b>{}</b>\nНазвание: <b>{}</b>", code, title),
        }
    }

    pub fn admin_movie_not_found(&self, code: &str) -> String {
        match self {
            Lang::En => format!("❌ No movie with code <b>{}</b>.", code),
            Lang::Ru => format!("❌ Фильма с кодом <b>{}</b> нет.", code),
        }
    }

    pub fn admin_list_empty(&self) -> &'static str {
        match self {
            Lang::En => "The movie list is empty.",
            Lang::Ru => "Список фильмов пуст.",
        }
    }

    pub fn admin_list_header(&self, limit: usize) -> String {
        match self {
            Lang::En => format!("📃 Movie list (first {}):\n", limit),
            Lang::Ru => format!("📃 Список фильмов (первые {}):\n", limit),
        }
    }
}

// =============================================================================
// Button labels
// =============================================================================

impl Lang {
    pub fn button_activate(&self) -> &'static str {
        match self {
            Lang::En => "🚀 Activate",
            Lang::Ru => "🚀 Активировать",
        }
    }

    pub fn button_join_channel(&self) -> &'static str {
        match self {
            Lang::En => "Go to channel",
            Lang::Ru => "Перейти в канал",
        }
    }

    pub fn button_check_subscription(&self) -> &'static str {
        match self {
            Lang::En => "✅ I subscribed",
            Lang::Ru => "✅ Я подписался",
        }
    }

    pub fn button_admin_add(&self) -> &'static str {
        match self {
            Lang::En => "➕ Add movie",
            Lang::Ru => "➕ Добавить фильм",
        }
    }

    pub fn button_admin_list(&self) -> &'static str {
        match self {
            Lang::En => "📃 List codes",
            Lang::Ru => "📃 Список кодов",
        }
    }

    pub fn button_admin_delete(&self) -> &'static str {
        match self {
            Lang::En => "🗑 Delete movie",
            Lang::Ru => "🗑 Удалить фильм",
        }
    }
}
