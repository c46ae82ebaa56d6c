use crate::test_utils::{TestEnv, integer, read_available};

#[tokio::test]
async fn test_subscribe_counts_channels_per_session() {
    let env = TestEnv::new_primary();
    let mut client = env.client(45001).await;

    assert_eq!(
        env.exec(&mut client.session, &["SUBSCRIBE", "news"]).await,
        "*3\r\n$9\r\nsubscribe\r\n$4\r\nnews\r\n:1\r\n"
    );
    assert!(client.session.subscribed);

    // one push per channel, counts increasing in argument order
    assert_eq!(
        env.exec(&mut client.session, &["SUBSCRIBE", "sport", "weather"])
            .await,
        "*3\r\n$9\r\nsubscribe\r\n$5\r\nsport\r\n:2\r\n*3\r\n$9\r\nsubscribe\r\n$7\r\nweather\r\n:3\r\n"
    );
}

#[tokio::test]
async fn test_subscribing_twice_is_idempotent() {
    let env = TestEnv::new_primary();
    let mut client = env.client(45002).await;

    env.exec(&mut client.session, &["SUBSCRIBE", "news"]).await;

    assert_eq!(
        env.exec(&mut client.session, &["SUBSCRIBE", "news"]).await,
        "*3\r\n$9\r\nsubscribe\r\n$4\r\nnews\r\n:1\r\n"
    );
}

#[tokio::test]
async fn test_publish_delivers_to_subscribers() {
    let env = TestEnv::new_primary();
    let mut subscriber = env.client(45003).await;
    let mut publisher = env.client(45004).await;

    env.exec(&mut subscriber.session, &["SUBSCRIBE", "ch"]).await;

    assert_eq!(
        env.exec(&mut publisher.session, &["PUBLISH", "ch", "hi"]).await,
        integer(1)
    );
    assert_eq!(
        read_available(&mut subscriber.peer).await,
        "*3\r\n$7\r\nmessage\r\n$2\r\nch\r\n$2\r\nhi\r\n"
    );
}

#[tokio::test]
async fn test_publish_to_channel_without_subscribers() {
    let env = TestEnv::new_primary();
    let mut publisher = env.client(45005).await;

    assert_eq!(
        env.exec(&mut publisher.session, &["PUBLISH", "void", "hello"])
            .await,
        integer(0)
    );
}

#[tokio::test]
async fn test_messages_arrive_in_publish_order() {
    let env = TestEnv::new_primary();
    let mut subscriber = env.client(45006).await;
    let mut publisher = env.client(45007).await;

    env.exec(&mut subscriber.session, &["SUBSCRIBE", "ch"]).await;

    for message in ["one", "two", "three"] {
        env.exec(&mut publisher.session, &["PUBLISH", "ch", message])
            .await;
    }

    let received = read_available(&mut subscriber.peer).await;
    let first = received.find("one").unwrap();
    let second = received.find("two").unwrap();
    let third = received.find("three").unwrap();

    assert!(first < second && second < third);
}

#[tokio::test]
async fn test_unsubscribe_named_and_all() {
    let env = TestEnv::new_primary();
    let mut client = env.client(45008).await;

    env.exec(&mut client.session, &["SUBSCRIBE", "a", "b"]).await;

    // named channel, plus one never subscribed to
    assert_eq!(
        env.exec(&mut client.session, &["UNSUBSCRIBE", "a", "zzz"]).await,
        "*3\r\n$11\r\nunsubscribe\r\n$1\r\na\r\n:1\r\n*3\r\n$11\r\nunsubscribe\r\n$3\r\nzzz\r\n:1\r\n"
    );
    assert!(client.session.subscribed);

    // removing the last channel leaves subscribed mode
    assert_eq!(
        env.exec(&mut client.session, &["UNSUBSCRIBE"]).await,
        "*3\r\n$11\r\nunsubscribe\r\n$1\r\nb\r\n:0\r\n"
    );
    assert!(!client.session.subscribed);

    // allowed again: normal commands
    assert_eq!(
        env.exec(&mut client.session, &["SET", "k", "v"]).await,
        "+OK\r\n"
    );
}

#[tokio::test]
async fn test_subscribed_mode_gates_commands() {
    let env = TestEnv::new_primary();
    let mut client = env.client(45009).await;

    env.exec(&mut client.session, &["SUBSCRIBE", "news"]).await;

    assert_eq!(
        env.exec(&mut client.session, &["GET", "k"]).await,
        "-ERR Can't execute 'get': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context\r\n"
    );
    assert_eq!(
        env.exec(&mut client.session, &["SET", "k", "v"]).await,
        "-ERR Can't execute 'set': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context\r\n"
    );
}

#[tokio::test]
async fn test_ping_in_subscribed_mode_is_a_push_pair() {
    let env = TestEnv::new_primary();
    let mut client = env.client(45010).await;

    assert_eq!(env.exec(&mut client.session, &["PING"]).await, "+PONG\r\n");

    env.exec(&mut client.session, &["SUBSCRIBE", "news"]).await;

    assert_eq!(
        env.exec(&mut client.session, &["PING"]).await,
        "*2\r\n$4\r\npong\r\n$0\r\n\r\n"
    );
}
