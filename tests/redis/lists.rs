use crate::test_utils::{TestEnv, bulk, bulk_array, integer, null};

#[tokio::test]
async fn test_rpush_then_lrange_preserves_order() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42001).await;

    assert_eq!(
        env.exec(&mut client.session, &["RPUSH", "L", "a", "b", "c"])
            .await,
        integer(3)
    );
    assert_eq!(
        env.exec(&mut client.session, &["LRANGE", "L", "0", "-1"]).await,
        bulk_array(&["a", "b", "c"])
    );
}

#[tokio::test]
async fn test_lpush_prepends_each_element() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42002).await;

    env.exec(&mut client.session, &["LPUSH", "L", "a", "b", "c"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["LRANGE", "L", "0", "-1"]).await,
        bulk_array(&["c", "b", "a"])
    );
}

#[tokio::test]
async fn test_lrange_boundaries() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42003).await;

    env.exec(&mut client.session, &["RPUSH", "L", "a", "b", "c", "d", "e"])
        .await;

    let test_cases = vec![
        (("1", "3"), bulk_array(&["b", "c", "d"])),
        (("-2", "-1"), bulk_array(&["d", "e"])),
        (("-100", "1"), bulk_array(&["a", "b"])),
        (("3", "100"), bulk_array(&["d", "e"])),
        (("3", "1"), "*0\r\n".to_string()),
        (("100", "200"), "*0\r\n".to_string()),
    ];

    for ((start, stop), expected) in test_cases {
        assert_eq!(
            env.exec(&mut client.session, &["LRANGE", "L", start, stop])
                .await,
            expected,
            "LRANGE L {} {}",
            start,
            stop
        );
    }

    assert_eq!(
        env.exec(&mut client.session, &["LRANGE", "absent", "0", "-1"])
            .await,
        "*0\r\n"
    );
}

#[tokio::test]
async fn test_llen() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42004).await;

    assert_eq!(
        env.exec(&mut client.session, &["LLEN", "absent"]).await,
        integer(0)
    );

    env.exec(&mut client.session, &["RPUSH", "L", "a", "b"]).await;

    assert_eq!(env.exec(&mut client.session, &["LLEN", "L"]).await, integer(2));
}

#[tokio::test]
async fn test_lpop_plain_form_pops_one_as_bulk() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42005).await;

    env.exec(&mut client.session, &["RPUSH", "L", "a", "b", "c"])
        .await;

    assert_eq!(env.exec(&mut client.session, &["LPOP", "L"]).await, bulk("a"));
    assert_eq!(
        env.exec(&mut client.session, &["LRANGE", "L", "0", "-1"]).await,
        bulk_array(&["b", "c"])
    );
}

#[tokio::test]
async fn test_lpop_count_form_replies_with_array() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42006).await;

    env.exec(&mut client.session, &["RPUSH", "L", "a", "b", "c"])
        .await;

    assert_eq!(
        env.exec(&mut client.session, &["LPOP", "L", "2"]).await,
        bulk_array(&["a", "b"])
    );
    assert_eq!(
        env.exec(&mut client.session, &["LPOP", "L", "0"]).await,
        "*0\r\n"
    );
    // over-long count drains the list
    assert_eq!(
        env.exec(&mut client.session, &["LPOP", "L", "10"]).await,
        bulk_array(&["c"])
    );
}

#[tokio::test]
async fn test_lpop_on_absent_key_is_nil() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42007).await;

    assert_eq!(env.exec(&mut client.session, &["LPOP", "absent"]).await, null());
    assert_eq!(
        env.exec(&mut client.session, &["LPOP", "absent", "3"]).await,
        null()
    );
    assert_eq!(
        env.exec(&mut client.session, &["LPOP", "absent", "-1"]).await,
        "-ERR value is not an integer or out of range\r\n"
    );
}

#[tokio::test]
async fn test_popping_last_element_removes_the_key() {
    let env = TestEnv::new_primary();
    let mut client = env.client(42008).await;

    env.exec(&mut client.session, &["RPUSH", "L", "only"]).await;
    env.exec(&mut client.session, &["LPOP", "L"]).await;

    assert_eq!(
        env.exec(&mut client.session, &["TYPE", "L"]).await,
        "+none\r\n"
    );
    assert!(env.shared.store.read().await.get("L").is_none());
}
