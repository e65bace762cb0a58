use std::sync::Arc;

use movie_code_bot::engine::{Action, ButtonAction, Keyboard};
use movie_code_bot::localization::Lang;
use movie_code_bot::movie_store::{MovieCode, MovieStore};
use movie_code_bot::subscription::MembershipStatus;
use movie_code_bot::user_session::UserSession;

use super::test_utils::{self, TestAssertions};
use super::{TestBot, ADMIN_ID};

const USER_ID: i64 = 42;

fn code(raw: &str) -> MovieCode {
    MovieCode::parse(raw).unwrap()
}

#[tokio::test]
async fn test_start_greets_without_activating() {
    let test_bot = TestBot::with_default_channel().await;

    let actions = test_bot.bot.dispatch(test_utils::start(USER_ID)).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert_eq!(reply.text, Lang::En.greeting());
    assert_eq!(reply.keyboard, Some(Keyboard::Activate));
    assert_eq!(test_bot.session(USER_ID).await, UserSession::default());
}

#[tokio::test]
async fn test_unactivated_user_gets_activation_prompt() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert_eq!(reply.text, Lang::En.activation_required());
    assert_eq!(reply.keyboard, Some(Keyboard::Activate));
    assert!(!test_bot.bot.chat_received_message_containing(USER_ID, "Бойцовский клуб"));

    // nothing was looked up or remembered
    assert_eq!(test_bot.membership.call_count(), 0);
    assert!(test_bot.session(USER_ID).await.pending_code.is_none());
    assert_eq!(test_bot.store().len().await, 3);
}

#[tokio::test]
async fn test_activation_then_lookup() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);

    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::Activate))
        .await;
    let reply = TestAssertions::single_edit(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.activated());
    assert!(test_bot.session(USER_ID).await.activated);

    // lowercase and padded input still matches the uppercase key
    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "  a123 ")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.movie_title("A123", "Бойцовский клуб"));
    assert_eq!(reply.keyboard, None);
}

#[tokio::test]
async fn test_unknown_code() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "Q000")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert_eq!(reply.text, Lang::En.code_not_found());
    assert_eq!(test_bot.membership.call_count(), 0);
    assert!(test_bot.session(USER_ID).await.pending_code.is_none());
}

#[tokio::test]
async fn test_subscription_round_trip() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Left);

    // not subscribed: code is held back
    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "b415")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.subscribe_prompt());
    assert_eq!(reply.keyboard, Some(Keyboard::Subscribe));
    assert_eq!(test_bot.session(USER_ID).await.pending_code, Some(code("B415")));

    // confirming too early only shows an alert
    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
        .await;
    assert_eq!(
        TestAssertions::single_alert(&actions),
        Lang::En.not_subscribed_alert()
    );
    assert_eq!(test_bot.session(USER_ID).await.pending_code, Some(code("B415")));

    // after joining, the held code resolves
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);
    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
        .await;
    let reply = TestAssertions::single_edit(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.movie_title("B415", "Начало"));
    assert!(test_bot.session(USER_ID).await.pending_code.is_none());

    // a second press has nothing pending
    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
        .await;
    let reply = TestAssertions::single_edit(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.subscription_confirmed());
    assert_eq!(test_bot.bot.alerts().len(), 1);
}

#[tokio::test]
async fn test_stale_pending_code() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;

    test_bot.bot.dispatch(test_utils::text(USER_ID, "C777")).await;
    assert_eq!(test_bot.session(USER_ID).await.pending_code, Some(code("C777")));

    test_bot.store().delete("C777").await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);

    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
        .await;
    let reply = TestAssertions::single_edit(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.pending_code_mismatch());
    assert!(test_bot.session(USER_ID).await.pending_code.is_none());
}

#[tokio::test]
async fn test_subscribed_lookup_keeps_pending_code() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;

    test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "B415")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);
    assert_eq!(reply.text, Lang::En.movie_title("B415", "Начало"));
    assert_eq!(test_bot.session(USER_ID).await.pending_code, Some(code("A123")));
}

#[tokio::test]
async fn test_lookup_failure_fails_closed() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);
    test_bot.membership.set_failing(true);

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert_eq!(reply.text, Lang::En.subscribe_prompt());
    assert_eq!(test_bot.session(USER_ID).await.pending_code, Some(code("A123")));
    assert_eq!(test_bot.membership.call_count(), 1);
}

#[tokio::test]
async fn test_restricted_non_member_is_not_subscribed() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;
    test_bot
        .membership
        .set_status(USER_ID, MembershipStatus::Restricted { is_member: false });

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    assert_eq!(
        TestAssertions::single_send(&actions, USER_ID).text,
        Lang::En.subscribe_prompt()
    );

    test_bot
        .membership
        .set_status(USER_ID, MembershipStatus::Restricted { is_member: true });
    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    assert_eq!(
        TestAssertions::single_send(&actions, USER_ID).text,
        Lang::En.movie_title("A123", "Бойцовский клуб")
    );
}

#[tokio::test]
async fn test_no_required_channels_skips_lookup() {
    let test_bot = TestBot::new(&[]).await;
    test_bot.activate(USER_ID).await;
    test_bot.membership.set_failing(true);

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "c777")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert_eq!(reply.text, Lang::En.movie_title("C777", "Матрица"));
    assert_eq!(test_bot.membership.call_count(), 0);

    let actions = test_bot
        .bot
        .dispatch(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
        .await;
    assert_eq!(
        TestAssertions::single_edit(&actions, USER_ID).text,
        Lang::En.subscription_confirmed()
    );
}

#[tokio::test]
async fn test_admin_skips_activation() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.membership.set_status(ADMIN_ID, MembershipStatus::Creator);

    let actions = test_bot.bot.dispatch(test_utils::text(ADMIN_ID, "a123")).await;
    let reply = TestAssertions::single_send(&actions, ADMIN_ID);

    assert_eq!(reply.text, Lang::En.movie_title("A123", "Бойцовский клуб"));
    assert!(!test_bot.session(ADMIN_ID).await.activated);
}

#[tokio::test]
async fn test_title_is_html_escaped() {
    let test_bot = TestBot::new(&[]).await;
    test_bot.activate(USER_ID).await;
    test_bot
        .store()
        .put(code("T1"), "Tom & Jerry <Reboot>".to_string())
        .await;

    let actions = test_bot.bot.dispatch(test_utils::text(USER_ID, "t1")).await;
    let reply = TestAssertions::single_send(&actions, USER_ID);

    assert!(reply.text.contains("Tom &amp; Jerry &lt;Reboot&gt;"));
    assert!(!reply.text.contains("<Reboot>"));
}

#[tokio::test]
async fn test_double_confirm_is_serialized() {
    let test_bot = TestBot::with_default_channel().await;
    test_bot.activate(USER_ID).await;
    test_bot.bot.dispatch(test_utils::text(USER_ID, "A123")).await;
    test_bot.membership.set_status(USER_ID, MembershipStatus::Member);

    let engine = test_bot.bot.engine.clone();
    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move {
            engine
                .handle(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
                .await
        }
    });
    let second = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move {
            engine
                .handle(test_utils::press(USER_ID, ButtonAction::CheckSubscription))
                .await
        }
    });

    let mut texts: Vec<String> = [first.await.unwrap(), second.await.unwrap()]
        .iter()
        .map(|actions| match actions.as_slice() {
            [Action::Edit { reply, .. }] => reply.text.clone(),
            other => panic!("Expected a single edit, got {:?}", other),
        })
        .collect();
    texts.sort();

    let mut expected = vec![
        Lang::En.movie_title("A123", "Бойцовский клуб"),
        Lang::En.subscription_confirmed().to_string(),
    ];
    expected.sort();
    assert_eq!(texts, expected);
    assert!(test_bot.session(USER_ID).await.pending_code.is_none());
}

#[tokio::test]
async fn test_store_snapshot_survives_restart() {
    let test_bot = TestBot::new(&[]).await;
    test_bot
        .store()
        .put(code("r2d2"), "Star Wars".to_string())
        .await;

    let reopened = MovieStore::open(&test_bot.snapshot_path).await;
    assert_eq!(reopened.get("R2D2").await.as_deref(), Some("Star Wars"));
    assert_eq!(reopened.len().await, 4);
}
