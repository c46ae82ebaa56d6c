use crate::test_utils::{TestEnv, integer, simple};

#[tokio::test]
async fn test_multi_queues_and_exec_folds_replies() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44001).await;

    assert_eq!(env.exec(&mut client.session, &["MULTI"]).await, simple("OK"));
    assert_eq!(
        env.exec(&mut client.session, &["INCR", "c"]).await,
        simple("QUEUED")
    );
    assert_eq!(
        env.exec(&mut client.session, &["INCR", "c"]).await,
        simple("QUEUED")
    );

    // nothing ran yet
    assert!(env.shared.store.read().await.get("c").is_none());

    assert_eq!(
        env.exec(&mut client.session, &["EXEC"]).await,
        "*2\r\n:1\r\n:2\r\n"
    );
    assert_eq!(env.exec(&mut client.session, &["INCR", "c"]).await, integer(3));
}

#[tokio::test]
async fn test_exec_with_empty_queue() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44002).await;

    env.exec(&mut client.session, &["MULTI"]).await;
    assert_eq!(env.exec(&mut client.session, &["EXEC"]).await, "*0\r\n");
}

#[tokio::test]
async fn test_discard_clears_the_queue() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44003).await;

    env.exec(&mut client.session, &["MULTI"]).await;
    env.exec(&mut client.session, &["SET", "x", "1"]).await;

    assert_eq!(env.exec(&mut client.session, &["DISCARD"]).await, simple("OK"));
    assert!(env.shared.store.read().await.get("x").is_none());

    // the session is back to normal execution
    assert_eq!(
        env.exec(&mut client.session, &["SET", "x", "2"]).await,
        simple("OK")
    );
}

#[tokio::test]
async fn test_transaction_control_errors() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44004).await;

    assert_eq!(
        env.exec(&mut client.session, &["EXEC"]).await,
        "-ERR EXEC without MULTI\r\n"
    );
    assert_eq!(
        env.exec(&mut client.session, &["DISCARD"]).await,
        "-ERR DISCARD without MULTI\r\n"
    );

    env.exec(&mut client.session, &["MULTI"]).await;
    assert_eq!(
        env.exec(&mut client.session, &["MULTI"]).await,
        "-ERR MULTI calls can not be nested\r\n"
    );
}

#[tokio::test]
async fn test_exec_keeps_going_past_failing_commands() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44005).await;

    env.exec(&mut client.session, &["SET", "word", "pear"]).await;

    env.exec(&mut client.session, &["MULTI"]).await;
    env.exec(&mut client.session, &["INCR", "word"]).await;
    env.exec(&mut client.session, &["SET", "after", "yes"]).await;

    let reply = env.exec(&mut client.session, &["EXEC"]).await;

    assert_eq!(
        reply,
        "*2\r\n-ERR value is not an integer or out of range\r\n+OK\r\n"
    );
    assert!(env.shared.store.read().await.get("after").is_some());
}

#[tokio::test]
async fn test_malformed_commands_are_rejected_at_queue_time() {
    let env = TestEnv::new_primary();
    let mut client = env.client(44006).await;

    env.exec(&mut client.session, &["MULTI"]).await;

    assert_eq!(
        env.exec(&mut client.session, &["GET"]).await,
        "-ERR wrong number of arguments for 'get' command\r\n"
    );
    assert_eq!(
        env.exec(&mut client.session, &["NOSUCHCOMMAND"]).await,
        "-ERR unknown command\r\n"
    );

    // the rejected commands are not in the queue
    assert_eq!(env.exec(&mut client.session, &["EXEC"]).await, "*0\r\n");
}
