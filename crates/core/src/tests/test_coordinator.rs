use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::sleep;

use super::prepare_session;
use super::record;
use crate::bus::RingEvent;
use crate::coordinator::Operation;
use crate::error::Error;

#[tokio::test]
async fn test_insert_highlights_the_previewed_target() {
    let (remote, session) = prepare_session();
    tokio::spawn(session.preview_engine().wait());
    remote.set_preview("foo", 42, 3);
    remote.set_nodes(vec![record(7, 0), record(1, 0), record(3, 1)]);

    session.set_key("foo").unwrap();
    sleep(Duration::from_millis(700)).await;

    let events = session.subscribe().unwrap();
    session
        .submit(Operation::Insert {
            key: "foo".to_string(),
            value: "bar".to_string(),
        })
        .await
        .unwrap();

    let state = session.state().unwrap();
    let ids: Vec<u64> = state.snapshot.nodes().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3, 7]);

    // Exactly one highlight, for the preview's successor; the insert ack
    // itself carries no routing data.
    assert_eq!(
        events.try_recv().unwrap(),
        RingEvent::RouteHighlighted { node_id: 3 }
    );
    assert!(events.try_recv().is_err());
    assert_eq!(remote.insert_calls.load(Ordering::SeqCst), 1);

    // The typed key resets at submission.
    assert_eq!(session.preview_engine().key().unwrap(), "");
    assert_eq!(session.key_preview().unwrap(), None);
}

#[tokio::test]
async fn test_insert_without_matching_preview_emits_nothing() {
    let (remote, session) = prepare_session();
    tokio::spawn(session.preview_engine().wait());
    remote.set_preview("other", 9, 5);
    remote.set_nodes(vec![record(1, 0)]);

    // The resolved preview is for a different key than the one inserted.
    session.set_key("other").unwrap();
    sleep(Duration::from_millis(700)).await;

    let events = session.subscribe().unwrap();
    session
        .submit(Operation::Insert {
            key: "foo".to_string(),
            value: "bar".to_string(),
        })
        .await
        .unwrap();

    assert!(events.try_recv().is_err());
    assert_eq!(remote.insert_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_insert_with_empty_input_fails_before_any_network_call() {
    let (remote, session) = prepare_session();

    for (key, value) in [("", "bar"), ("foo", "")] {
        let result = session
            .submit(Operation::Insert {
                key: key.to_string(),
                value: value.to_string(),
            })
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    assert_eq!(remote.insert_calls.load(Ordering::SeqCst), 0);
    assert_eq!(remote.list_nodes_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_leave_resets_selection_to_lowest_survivor() {
    let (remote, session) = prepare_session();
    remote.set_nodes(vec![record(1, 0), record(3, 0), record(7, 0)]);
    session.refresh().await.unwrap();
    session.select(3).unwrap();

    // Node 7 leaves. Node 3 is still a member, but leave drops the
    // selection unconditionally, so the refresh repairs it to the lowest id
    // rather than keeping 3.
    remote.set_nodes(vec![record(1, 0), record(3, 0)]);
    session
        .submit(Operation::Leave { node_id: 7 })
        .await
        .unwrap();

    let state = session.state().unwrap();
    assert_eq!(state.selection, Some(1));
    assert_eq!(remote.leave_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_leave_changes_nothing() {
    let (remote, session) = prepare_session();
    remote.set_nodes(vec![record(1, 0), record(3, 0)]);
    session.refresh().await.unwrap();
    session.select(3).unwrap();
    let refreshes_before = remote.list_nodes_calls.load(Ordering::SeqCst);

    remote.fail_leave.store(true, Ordering::SeqCst);
    let result = session.submit(Operation::Leave { node_id: 3 }).await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(session.state().unwrap().selection, Some(3));
    assert_eq!(
        remote.list_nodes_calls.load(Ordering::SeqCst),
        refreshes_before
    );
}

#[tokio::test]
async fn test_join_triggers_a_refresh() {
    let (remote, session) = prepare_session();
    remote.set_nodes(vec![record(1, 0)]);
    session.refresh().await.unwrap();

    remote.set_nodes(vec![record(1, 0), record(5, 0)]);
    session.submit(Operation::Join).await.unwrap();

    let ids: Vec<u64> = session
        .state()
        .unwrap()
        .snapshot
        .nodes()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(remote.join_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_preserves_last_known_state() {
    let (remote, session) = prepare_session();
    remote.set_nodes(vec![record(1, 0), record(3, 0)]);
    let before = session.refresh().await.unwrap();

    remote.fail_list_nodes.store(true, Ordering::SeqCst);
    let result = session.refresh().await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(session.state().unwrap(), before);
}
