use crate::test_utils::{TestEnv, bulk, bulk_array, integer, null};

#[tokio::test]
async fn test_zadd_reports_new_membership_only() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43001).await;

    assert_eq!(
        env.exec(&mut client.session, &["ZADD", "board", "10", "alice"])
            .await,
        integer(1)
    );
    // score update on an existing member
    assert_eq!(
        env.exec(&mut client.session, &["ZADD", "board", "25", "alice"])
            .await,
        integer(0)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZSCORE", "board", "alice"])
            .await,
        bulk("25")
    );
}

#[tokio::test]
async fn test_zadd_rejects_invalid_scores() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43002).await;

    for score in ["ten", "nan", ""] {
        assert_eq!(
            env.exec(&mut client.session, &["ZADD", "board", score, "alice"])
                .await,
            "-ERR value is not a valid float\r\n",
            "score {:?}",
            score
        );
    }
}

#[tokio::test]
async fn test_zrank_follows_score_then_lexicographic_order() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43003).await;

    env.exec(&mut client.session, &["ZADD", "board", "2", "banana"])
        .await;
    env.exec(&mut client.session, &["ZADD", "board", "1", "apple"])
        .await;
    env.exec(&mut client.session, &["ZADD", "board", "2", "avocado"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["ZRANK", "board", "apple"]).await,
        integer(0)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZRANK", "board", "avocado"])
            .await,
        integer(1)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZRANK", "board", "banana"])
            .await,
        integer(2)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZRANK", "board", "missing"])
            .await,
        null()
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZRANK", "absent", "apple"])
            .await,
        null()
    );
}

#[tokio::test]
async fn test_zrange_with_negative_indices() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43004).await;

    for (score, member) in [("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")] {
        env.exec(&mut client.session, &["ZADD", "board", score, member])
            .await;
    }

    let test_cases = vec![
        (("0", "-1"), bulk_array(&["a", "b", "c", "d"])),
        (("1", "2"), bulk_array(&["b", "c"])),
        (("-2", "-1"), bulk_array(&["c", "d"])),
        (("2", "0"), "*0\r\n".to_string()),
        (("10", "20"), "*0\r\n".to_string()),
    ];

    for ((start, stop), expected) in test_cases {
        assert_eq!(
            env.exec(&mut client.session, &["ZRANGE", "board", start, stop])
                .await,
            expected,
            "ZRANGE board {} {}",
            start,
            stop
        );
    }

    assert_eq!(
        env.exec(&mut client.session, &["ZRANGE", "absent", "0", "-1"])
            .await,
        "*0\r\n"
    );
}

#[tokio::test]
async fn test_zcard_and_zrem() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43005).await;

    assert_eq!(
        env.exec(&mut client.session, &["ZCARD", "board"]).await,
        integer(0)
    );

    env.exec(&mut client.session, &["ZADD", "board", "1", "alice"])
        .await;
    env.exec(&mut client.session, &["ZADD", "board", "2", "bob"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["ZCARD", "board"]).await,
        integer(2)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZREM", "board", "alice"]).await,
        integer(1)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZREM", "board", "alice"]).await,
        integer(0)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZREM", "absent", "alice"]).await,
        integer(0)
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZCARD", "board"]).await,
        integer(1)
    );
}

#[tokio::test]
async fn test_zscore_round_trips_the_score() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43006).await;

    env.exec(&mut client.session, &["ZADD", "board", "1.5", "alice"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["ZSCORE", "board", "alice"])
            .await,
        bulk("1.5")
    );
    assert_eq!(
        env.exec(&mut client.session, &["ZSCORE", "board", "missing"])
            .await,
        null()
    );
}

#[tokio::test]
async fn test_zset_commands_reject_other_types() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43007).await;

    env.exec(&mut client.session, &["SET", "plain", "text"]).await;

    let test_cases = vec![
        (
            vec!["ZADD", "plain", "1", "m"],
            "-ERR wrong type of value for 'ZADD' command\r\n",
        ),
        (
            vec!["ZRANK", "plain", "m"],
            "-ERR wrong type of value for 'ZRANK' command\r\n",
        ),
        (
            vec!["ZRANGE", "plain", "0", "-1"],
            "-ERR wrong type of value for 'ZRANGE' command\r\n",
        ),
        (
            vec!["ZCARD", "plain"],
            "-ERR wrong type of value for 'ZCARD' command\r\n",
        ),
        (
            vec!["ZREM", "plain", "m"],
            "-ERR wrong type of value for 'ZREM' command\r\n",
        ),
    ];

    for (parts, expected) in test_cases {
        assert_eq!(env.exec(&mut client.session, &parts).await, expected);
    }
}

#[tokio::test]
async fn test_type_reports_zset() {
    let env = TestEnv::new_primary();
    let mut client = env.client(43008).await;

    env.exec(&mut client.session, &["ZADD", "board", "1", "alice"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["TYPE", "board"]).await,
        "+zset\r\n"
    );
}
