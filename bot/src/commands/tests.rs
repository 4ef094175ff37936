use discord_client::Snowflake;
use echo_db::MessageRecord;

use super::*;
use crate::paginator::{ARROW_LEFT, ARROW_RIGHT};
use crate::render::ECHO_COLORS;
use crate::testing::{Call, test_state};

const GUILD: Snowflake = Snowflake(1);
const GENERAL: Snowflake = Snowflake(10);
const RANDOM: Snowflake = Snowflake(11);

fn invocation() -> Invocation {
    Invocation {
        user_id: Snowflake(42),
        author_name: "alice".into(),
        channel_id: GENERAL,
        guild_id: Some(GUILD),
    }
}

fn record(message_id: u64, channel: &str) -> MessageRecord {
    MessageRecord {
        message_id,
        author: "bob".into(),
        content: "original".into(),
        color: 0xB0C0FF,
        channel: channel.into(),
        created_at: 1_700_000_000,
    }
}

mod parsing {
    use super::*;

    #[test]
    fn ignores_unprefixed_messages() {
        assert!(parse("repeat hi", "_").is_none());
        assert!(parse("_", "_").is_none());
        assert!(parse("", "_").is_none());
    }

    #[test]
    fn repeat_keeps_the_whole_text() {
        assert_eq!(
            parse("_repeat hello  there world", "_").unwrap().unwrap(),
            Command::Repeat {
                message: "hello  there world".into()
            }
        );
    }

    #[test]
    fn repeat_without_text_is_usage() {
        let err = parse("_repeat   ", "_").unwrap().unwrap_err();
        assert_eq!(
            err.user_message().as_deref(),
            Some("Usage: `_repeat <message>`")
        );
    }

    #[test]
    fn history_page_defaults_to_one() {
        assert_eq!(
            parse("_history", "_").unwrap().unwrap(),
            Command::History { page: 1 }
        );
        assert_eq!(
            parse("_history 3", "_").unwrap().unwrap(),
            Command::History { page: 3 }
        );
        assert_eq!(
            parse("_history -2", "_").unwrap().unwrap(),
            Command::History { page: -2 }
        );
        assert!(matches!(
            parse("_history two", "_").unwrap(),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn oversized_numbers_parse_as_out_of_range() {
        assert_eq!(
            parse("_history 99999999999999999999", "_").unwrap().unwrap(),
            Command::History { page: i64::MAX }
        );
        assert_eq!(
            parse("_history -99999999999999999999", "_").unwrap().unwrap(),
            Command::History { page: i64::MIN }
        );
        assert_eq!(
            parse("_delete_message 99999999999999999999999", "_")
                .unwrap()
                .unwrap(),
            Command::DeleteMessage {
                message_id: u64::MAX
            }
        );
        assert!(parse("_delete_message -3", "_").unwrap().is_err());
    }

    #[test]
    fn edit_message_needs_id_and_content() {
        assert_eq!(
            parse("_edit_message 123 new words here", "_").unwrap().unwrap(),
            Command::EditMessage {
                message_id: 123,
                new_content: "new words here".into()
            }
        );
        for bad in ["_edit_message", "_edit_message 123", "_edit_message abc text"] {
            assert!(
                matches!(parse(bad, "_").unwrap(), Err(CommandError::Usage(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn delete_and_clear() {
        assert_eq!(
            parse("_delete_message 77", "_").unwrap().unwrap(),
            Command::DeleteMessage { message_id: 77 }
        );
        assert!(parse("_delete_message", "_").unwrap().is_err());
        assert_eq!(
            parse("_clear_history", "_").unwrap().unwrap(),
            Command::ClearHistory
        );
    }

    #[test]
    fn unknown_command_is_not_user_visible() {
        let err = parse("_dance now", "_").unwrap().unwrap_err();
        assert!(matches!(&err, CommandError::UnknownCommand(name) if name == "dance"));
        assert!(err.user_message().is_none());
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(parse("!help", "!").unwrap().unwrap(), Command::Help);
        assert!(parse("_help", "!").is_none());
    }

    #[test]
    fn help_lists_every_command() {
        let text = help_text("_");
        for name in [
            "repeat",
            "history",
            "edit_message",
            "delete_message",
            "clear_history",
        ] {
            assert!(text.contains(&format!("`_{name}")), "{name} missing");
        }
    }
}

#[tokio::test]
async fn repeat_sends_echo_then_records_it() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");

    repeat(&state, &invocation(), "hello world").await.unwrap();

    let sent = platform.sent_embeds();
    assert_eq!(sent.len(), 1);
    let (channel_id, embed) = &sent[0];
    assert_eq!(*channel_id, GENERAL);
    assert_eq!(embed.title.as_deref(), Some("Echo"));
    assert_eq!(embed.description.as_deref(), Some("hello world"));

    let records = state.db().list_records(0, 5).unwrap();
    assert_eq!(records.len(), 1);
    let stored = &records[0];
    assert_eq!(stored.author, "alice");
    assert_eq!(stored.content, "hello world");
    assert_eq!(stored.channel, "general");
    assert!(ECHO_COLORS.contains(&stored.color));
    assert_eq!(embed.color, Some(stored.color));
}

#[tokio::test]
async fn repeat_in_direct_message_records_placeholder_channel() {
    let (state, _platform) = test_state();
    let mut inv = invocation();
    inv.guild_id = None;

    repeat(&state, &inv, "psst").await.unwrap();

    let records = state.db().list_records(0, 5).unwrap();
    assert_eq!(records[0].channel, crate::platform::DIRECT_MESSAGE_CHANNEL);
}

#[tokio::test]
async fn echo_then_history_shows_quoted_content() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");

    repeat(&state, &invocation(), "remember me").await.unwrap();
    history(&state, &invocation(), 1).await.unwrap();

    let sent = platform.sent_embeds();
    let page = &sent[1].1;
    assert_eq!(page.title.as_deref(), Some("Message History (Page 1/1)"));
    assert_eq!(page.fields.len(), 1);
    assert_eq!(page.fields[0].value, "\"remember me\" in #general");
    assert!(page.fields[0].name.starts_with("alice (at "));
    // Single page: no navigation
    assert!(
        !platform
            .calls()
            .iter()
            .any(|c| matches!(c, Call::AddReaction { .. }))
    );
}

#[tokio::test]
async fn history_out_of_range_sends_nothing() {
    let (state, platform) = test_state();
    for i in 1..=6 {
        state.db().insert_record(&record(i, "general")).unwrap();
    }

    for page in [0, 3, -1] {
        let err = history(&state, &invocation(), page).await.unwrap_err();
        assert_eq!(
            err.user_message().as_deref(),
            Some("Invalid page number! There are 2 pages available.")
        );
    }
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn history_with_huge_page_number_reports_invalid_page() {
    let (state, platform) = test_state();
    state.db().insert_record(&record(1, "general")).unwrap();

    let command = parse("_history 99999999999999999999", "_").unwrap().unwrap();
    let err = execute(&state, &invocation(), command).await.unwrap_err();
    report_failure(&state, &invocation(), "history", err).await;

    assert_eq!(
        platform.texts(),
        ["Invalid page number! There are 1 pages available."]
    );
}

#[tokio::test]
async fn history_on_empty_store_is_invalid() {
    let (state, platform) = test_state();
    let err = history(&state, &invocation(), 1).await.unwrap_err();
    assert!(matches!(err, CommandError::InvalidPage { total_pages: 0 }));
    assert!(platform.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn multi_page_history_adds_arrows_and_waits() {
    let (state, platform) = test_state();
    for i in 1..=6 {
        state.db().insert_record(&record(i, "general")).unwrap();
    }

    history(&state, &invocation(), 1).await.unwrap();

    let calls = platform.calls();
    let reactions: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::AddReaction { emoji, .. } => Some(emoji.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(reactions, [ARROW_LEFT, ARROW_RIGHT]);
    assert_eq!(state.reactions().active_routes(), 0);
}

#[tokio::test]
async fn edit_updates_store_then_remote() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");
    platform.add_channel(Some(GUILD), RANDOM, "random");
    platform.add_message(RANDOM, Snowflake(300));
    state.db().insert_record(&record(300, "random")).unwrap();

    edit_message(&state, &invocation(), 300, "revised").await.unwrap();

    let stored = state.db().find_record(300).unwrap().unwrap();
    assert_eq!(stored.content, "revised");
    let before = record(300, "random");
    assert_eq!(stored.color, before.color);
    assert_eq!(stored.channel, before.channel);
    assert_eq!(stored.author, before.author);
    assert_eq!(stored.created_at, before.created_at);

    let calls = platform.calls();
    let edited = calls
        .iter()
        .find_map(|c| match c {
            Call::EditEmbed {
                channel_id,
                message_id,
                embed,
            } => Some((*channel_id, *message_id, embed.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(edited.0, RANDOM);
    assert_eq!(edited.1, Snowflake(300));
    assert_eq!(edited.2.title.as_deref(), Some("Echo (Edited)"));
    assert_eq!(edited.2.description.as_deref(), Some("revised"));
    assert_eq!(edited.2.color, Some(0xB0C0FF));
    assert_eq!(platform.texts(), ["Message 300 has been updated!"]);
}

#[tokio::test]
async fn edit_missing_record_mutates_nothing() {
    let (state, platform) = test_state();
    state.db().insert_record(&record(1, "general")).unwrap();

    let err = edit_message(&state, &invocation(), 2, "x").await.unwrap_err();

    assert!(matches!(err, CommandError::NotFound));
    assert_eq!(err.user_message().as_deref(), Some("Message not found!"));
    assert_eq!(state.db().find_record(1).unwrap().unwrap().content, "original");
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn edit_with_vanished_channel_keeps_store_write() {
    let (state, platform) = test_state();
    state.db().insert_record(&record(5, "archived")).unwrap();

    let err = edit_message(&state, &invocation(), 5, "late").await.unwrap_err();

    assert!(matches!(err, CommandError::ChannelNotFound));
    assert_eq!(state.db().find_record(5).unwrap().unwrap().content, "late");
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn edit_outside_guild_cannot_resolve_channel() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");
    state.db().insert_record(&record(5, "general")).unwrap();
    let mut inv = invocation();
    inv.guild_id = None;

    let err = edit_message(&state, &inv, 5, "dm").await.unwrap_err();
    assert!(matches!(err, CommandError::ChannelNotFound));
}

#[tokio::test]
async fn edit_with_deleted_remote_message() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");
    state.db().insert_record(&record(8, "general")).unwrap();

    let err = edit_message(&state, &invocation(), 8, "gone").await.unwrap_err();

    assert!(matches!(err, CommandError::RemoteMessageNotFound));
    assert_eq!(
        err.user_message().as_deref(),
        Some("Could not find the original message in the channel.")
    );
    assert_eq!(state.db().find_record(8).unwrap().unwrap().content, "gone");
}

#[tokio::test]
async fn delete_removes_one_record_and_one_remote_message() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");
    platform.add_message(GENERAL, Snowflake(20));
    state.db().insert_record(&record(20, "general")).unwrap();
    state.db().insert_record(&record(21, "general")).unwrap();

    delete_message(&state, &invocation(), 20).await.unwrap();

    assert!(state.db().find_record(20).unwrap().is_none());
    assert_eq!(state.db().count_records().unwrap(), 1);
    let deletes: Vec<_> = platform
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Delete { .. }))
        .collect();
    assert_eq!(
        deletes,
        [Call::Delete {
            channel_id: GENERAL,
            message_id: Snowflake(20)
        }]
    );
    assert_eq!(platform.texts(), ["Message 20 has been deleted!"]);
}

#[tokio::test]
async fn delete_missing_record_mutates_nothing() {
    let (state, platform) = test_state();
    state.db().insert_record(&record(1, "general")).unwrap();

    let err = delete_message(&state, &invocation(), 99).await.unwrap_err();

    assert!(matches!(err, CommandError::NotFound));
    assert_eq!(state.db().count_records().unwrap(), 1);
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn ids_beyond_storable_range_are_not_found() {
    let (state, platform) = test_state();
    state.db().insert_record(&record(1, "general")).unwrap();

    for content in [
        "_delete_message 18446744073709551615",
        "_edit_message 9223372036854775808 hello",
    ] {
        let command = parse(content, "_").unwrap().unwrap();
        let name = command.name();
        let err = execute(&state, &invocation(), command).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound), "{content}: {err:?}");
        report_failure(&state, &invocation(), name, err).await;
    }

    assert_eq!(
        platform.texts(),
        ["Message not found!", "Message not found!"]
    );
    assert_eq!(state.db().count_records().unwrap(), 1);
}

#[tokio::test]
async fn delete_with_deleted_remote_message_keeps_record_gone() {
    let (state, platform) = test_state();
    platform.add_channel(Some(GUILD), GENERAL, "general");
    state.db().insert_record(&record(30, "general")).unwrap();

    let err = delete_message(&state, &invocation(), 30).await.unwrap_err();

    assert!(matches!(err, CommandError::RemoteMessageNotFound));
    assert!(state.db().find_record(30).unwrap().is_none());
}

#[tokio::test]
async fn clear_history_is_idempotent() {
    let (state, platform) = test_state();
    for i in 1..=3 {
        state.db().insert_record(&record(i, "general")).unwrap();
    }

    clear_history(&state, &invocation()).await.unwrap();
    assert_eq!(state.db().count_records().unwrap(), 0);
    clear_history(&state, &invocation()).await.unwrap();
    assert_eq!(state.db().count_records().unwrap(), 0);

    assert_eq!(
        platform.texts(),
        ["Message history cleared!", "Message history cleared!"]
    );
    assert!(
        !platform
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Delete { .. }))
    );
}

#[tokio::test]
async fn execute_help_replies_with_command_list() {
    let (state, platform) = test_state();
    execute(&state, &invocation(), Command::Help).await.unwrap();
    let texts = platform.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Commands:"));
}

#[tokio::test]
async fn report_failure_replies_only_for_user_errors() {
    let (state, platform) = test_state();

    report_failure(&state, &invocation(), "edit_message", CommandError::NotFound).await;
    report_failure(
        &state,
        &invocation(),
        "repeat",
        CommandError::Platform(discord_client::DiscordError::Timeout),
    )
    .await;

    assert_eq!(platform.texts(), ["Message not found!"]);
}
