mod support;

use std::sync::{Arc, atomic::Ordering};

use moodmix::openai::{
    MAX_ATTEMPTS, RecommendError, Recommender, SYSTEM_PROMPT, build_messages, interpret_reply,
};
use support::{FailingChat, MOCK_REPLY, ScriptedChat};

#[tokio::test]
async fn test_recommend_parses_first_reply() {
    let chat = Arc::new(ScriptedChat::new(&[MOCK_REPLY]));
    let recommender = Recommender::new(chat.clone());

    let recommendation = recommender.recommend("happy songs").await.unwrap();

    assert_eq!(recommendation.playlist_name, "Mock Playlist");
    assert_eq!(recommendation.songs.len(), 3);
    assert_eq!(chat.calls(), 1);
}

#[tokio::test]
async fn test_recommend_accepts_python_literal() {
    let chat = Arc::new(ScriptedChat::new(&[
        "{ 'Playlist name': 'MMCat Tunes', 'Songs': ['Memory by Elaine Paige', 'Stray Cat Strut by Stray Cats', 'Cool for Cats by Squeeze'] }",
    ]));
    let recommender = Recommender::new(chat);

    let recommendation = recommender.recommend("songs about cats").await.unwrap();

    assert_eq!(recommendation.playlist_name, "MMCat Tunes");
    assert_eq!(recommendation.songs[1], "Stray Cat Strut by Stray Cats");
}

#[tokio::test]
async fn test_recommend_retries_exactly_three_times() {
    let chat = Arc::new(ScriptedChat::new(&["I'd rather not."]));
    let recommender = Recommender::new(chat.clone());

    let err = recommender.recommend("anything").await.unwrap_err();

    assert!(matches!(err, RecommendError::Unparsable { attempts: 3 }));
    assert_eq!(chat.calls(), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn test_recommend_succeeds_on_second_attempt() {
    let chat = Arc::new(ScriptedChat::new(&["{Playlist: oops", MOCK_REPLY]));
    let recommender = Recommender::new(chat.clone());

    let recommendation = recommender.recommend("happy songs").await.unwrap();

    assert_eq!(recommendation.playlist_name, "Mock Playlist");
    assert_eq!(chat.calls(), 2);
}

#[tokio::test]
async fn test_recommend_wrong_shape_counts_as_attempt() {
    let chat = Arc::new(ScriptedChat::new(&[
        r#"{"name": "MMNope", "tracks": []}"#,
        MOCK_REPLY,
    ]));
    let recommender = Recommender::new(chat.clone());

    assert!(recommender.recommend("happy songs").await.is_ok());
    assert_eq!(chat.calls(), 2);
}

#[tokio::test]
async fn test_recommend_upstream_failure_is_not_retried() {
    let chat = Arc::new(FailingChat::default());
    let recommender = Recommender::new(chat.clone());

    let err = recommender.recommend("happy songs").await.unwrap_err();

    assert!(matches!(err, RecommendError::Upstream(_)));
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recommend_rejects_blank_description() {
    let chat = Arc::new(ScriptedChat::new(&[MOCK_REPLY]));
    let recommender = Recommender::new(chat.clone());

    let err = recommender.recommend("   ").await.unwrap_err();

    assert!(matches!(err, RecommendError::EmptyDescription));
    assert_eq!(chat.calls(), 0);
}

#[test]
fn test_build_messages() {
    let messages = build_messages("late night drive");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[0].content, SYSTEM_PROMPT);
    assert_eq!(messages[1].role, "user");
    assert!(messages[1].content.contains("late night drive"));
    assert!(messages[1].content.contains("Playlist name"));
    assert!(messages[1].content.contains("MM"));
}

#[test]
fn test_interpret_reply_rejects_non_string_songs() {
    assert!(interpret_reply(r#"{"Playlist name": "MMX", "Songs": [1, 2]}"#).is_err());
    assert!(interpret_reply(r#"{"Playlist name": "", "Songs": ["A by B"]}"#).is_err());
    assert!(interpret_reply(r#"["A by B"]"#).is_err());
}
