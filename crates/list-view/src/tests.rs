//! List View Driver Tests
//!
//! Run the async driver against the in-memory source on tokio's paused
//! clock, so debounce windows and response latencies are deterministic.

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::testing::{id, numbered_todos, Call, MockSource, RecordingNavigator, TokioTimer, TODO_SCHEMA};
    use crate::testing::todo_record;
    use crate::{
        FieldValue, ListView, ListViewConfig, ListViewController, ListViewError, MemorySessionStore,
        NotificationLevel, Record, Session, SessionStore, SessionToken, SourceError,
    };

    struct Harness {
        view: ListView,
        source: Rc<MockSource>,
        session: Rc<MemorySessionStore>,
        navigator: Rc<RecordingNavigator>,
    }

    fn harness(records: Vec<Record>) -> Harness {
        let source = Rc::new(MockSource::new(records));
        let session = Rc::new(MemorySessionStore::with_session(Session {
            token: SessionToken::new("my-sample-token").unwrap(),
            user_name: Some("ada".to_string()),
        }));
        let navigator = Rc::new(RecordingNavigator::default());
        let view = ListView::new(
            ListViewController::new(&TODO_SCHEMA, ListViewConfig::default()),
            source.clone(),
            Rc::new(TokioTimer),
            session.clone(),
            navigator.clone(),
        );
        Harness { view, source, session, navigator }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_loads_related_and_first_page() {
        let h = harness(numbered_todos(12));
        h.view.open().await.expect("open");

        let state = h.view.state();
        assert_eq!(state.records.len(), 10);
        assert_eq!(state.total, 12);
        assert_eq!(state.page_count, 2);
        assert!(!state.loading);
        assert_eq!(state.related.get("userId").map(Vec::len), Some(2));
        assert_eq!(h.source.calls()[0], Call::Related("userId".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_without_session_redirects() {
        let h = harness(numbered_todos(3));
        h.session.clear();

        assert_eq!(h.view.open().await, Err(ListViewError::Auth));
        assert_eq!(h.navigator.redirects.get(), 1);
        assert!(h.source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_related_list_still_loads_first_page() {
        let h = harness(numbered_todos(3));
        h.source.fail_next(SourceError::Transport("employees down".into()));

        let result = h.view.open().await;
        assert_eq!(result, Err(ListViewError::Transport("employees down".into())));

        let state = h.view.state();
        assert_eq!(h.source.list_calls().len(), 1);
        assert_eq!(state.records.len(), 3);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.notifications[0].level, NotificationLevel::Error);
        assert_eq!(
            state.notifications[0].message,
            "Could not load employee options: network error: employees down"
        );
        assert_eq!(h.navigator.redirects.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_token_on_related_list_redirects_without_fetch() {
        let h = harness(numbered_todos(3));
        h.source.fail_next(SourceError::Auth);

        assert_eq!(h.view.open().await, Err(ListViewError::Auth));
        assert!(h.source.list_calls().is_empty());
        assert!(h.view.state().notifications.is_empty());
        assert_eq!(h.navigator.redirects.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_within_debounce_issue_one_fetch() {
        let mut records = numbered_todos(3);
        records.push(crate::testing::todo_record("doc9", "buy milk", "emp2"));
        let h = harness(records);
        h.view.open().await.unwrap();

        let view = &h.view;
        let typed = move |after_ms: u64, text: &'static str| async move {
            tokio::time::sleep(Duration::from_millis(after_ms)).await;
            view.search(text).await
        };
        let (m, mi, mil, milk) = tokio::join!(typed(0, "m"), typed(100, "mi"), typed(200, "mil"), typed(300, "milk"));
        assert!(m.is_ok() && mi.is_ok() && mil.is_ok() && milk.is_ok());

        let lists = h.source.list_calls();
        assert_eq!(lists.len(), 2, "initial load plus one debounced search");
        assert_eq!(lists[1].search_text, "milk");
        assert_eq!(lists[1].filter_attribute, "todo");

        let state = h.view.state();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, id("doc9"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_page_never_replaces_newer_one() {
        let h = harness(numbered_todos(30));
        h.view.open().await.unwrap();
        h.source.set_latency(|params| {
            if params.page_index == 1 {
                Duration::from_millis(300)
            } else {
                Duration::from_millis(10)
            }
        });

        let view = &h.view;
        let (slow, fast) = tokio::join!(view.set_page(1), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            view.set_page(2).await
        });
        assert!(slow.is_ok() && fast.is_ok());

        let state = h.view.state();
        assert_eq!(state.query.page_index, 2);
        assert_eq!(state.records[0].id, id("doc21"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_committed_add_appears_after_refetch() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.begin_add().unwrap();
        h.view.update_draft_input("todo", "Buy milk").unwrap();
        h.view.update_draft_input("userId", "emp2").unwrap();
        h.view.update_draft_input("completed", "true").unwrap();
        h.view.commit().await.expect("commit");

        let state = h.view.state();
        assert!(!state.edit.is_open());
        let added = state
            .records
            .iter()
            .find(|r| r.field("todo") == &FieldValue::text("Buy milk"))
            .expect("new record listed");
        assert_eq!(added.field("userId"), &FieldValue::Reference(Some(id("emp2"))));
        assert_eq!(added.field("completed"), &FieldValue::Flag(true));
        assert_eq!(state.notifications.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_save_creates_one_record() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.begin_add().unwrap();
        h.view.update_draft_input("todo", "Buy milk").unwrap();
        h.view.update_draft_input("userId", "emp1").unwrap();
        let (first, second) = tokio::join!(h.view.commit(), h.view.commit());

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(ListViewError::CommitInProgress));
        let creates = h.source.calls().iter().filter(|c| matches!(c, Call::Create(_))).count();
        assert_eq!(creates, 1);
        assert_eq!(h.view.state().total, 4);
        assert!(!h.view.state().committing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_draft_never_reaches_source() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.begin_add().unwrap();
        h.view.update_draft_input("todo", "   ").unwrap();
        h.view.update_draft_input("userId", "emp7").unwrap();
        let err = h.view.commit().await.unwrap_err();

        assert!(matches!(err, ListViewError::Validation(ref errors) if errors.len() == 2));
        assert!(!h.source.calls().iter().any(|c| matches!(c, Call::Create(_))));
        assert!(h.view.state().edit.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_updates_record() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.begin_edit(&id("doc2")).unwrap();
        h.view.update_draft_field("todo", FieldValue::text("renamed")).unwrap();
        h.view.commit().await.unwrap();

        let state = h.view.state();
        let renamed = state.records.iter().find(|r| r.id == id("doc2")).unwrap();
        assert_eq!(renamed.field("todo"), &FieldValue::text("renamed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_record_loads_its_children() {
        let mut records = numbered_todos(3);
        records.push(todo_record("emp2", "team lead", "emp1"));
        records.push(todo_record("doc9", "buy milk", "emp2"));
        let h = harness(records);
        h.view.open().await.unwrap();

        h.view.view_record(&id("emp2")).await.unwrap();

        let detail = h.view.state().detail.expect("detail open");
        assert_eq!(detail.record.field("todo"), &FieldValue::text("team lead"));
        assert!(!detail.loading);
        assert_eq!(detail.children.len(), 1);
        assert_eq!(detail.children[0].id, id("doc9"));
        assert!(h.source.calls().contains(&Call::Children(id("emp2"))));

        h.view.close_view();
        assert!(h.view.state().detail.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_without_confirmation_is_refused() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        let err = h.view.delete(&id("abc123")).await.unwrap_err();
        assert_eq!(err, ListViewError::ConfirmationRequired(id("abc123")));
        assert_eq!(h.source.deletes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_refetches() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.request_delete(id("doc1"));
        h.view.delete(&id("doc1")).await.unwrap();

        assert_eq!(h.source.deletes(), 1);
        let state = h.view.state();
        assert_eq!(state.total, 2);
        assert!(state.records.iter().all(|r| r.id != id("doc1")));
        assert_eq!(h.source.list_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleting_last_row_of_last_page_moves_back() {
        let h = harness(numbered_todos(11));
        h.view.open().await.unwrap();
        h.view.set_page(1).await.unwrap();
        assert_eq!(h.view.state().records.len(), 1);

        h.view.request_delete(id("doc11"));
        h.view.delete(&id("doc11")).await.unwrap();

        let state = h.view.state();
        assert_eq!(state.query.page_index, 0);
        assert_eq!(state.records.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_notifies_and_keeps_rows() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.view.request_delete(id("doc1"));
        h.source.fail_next(SourceError::NotFound("doc1".into()));
        let err = h.view.delete(&id("doc1")).await.unwrap_err();

        assert_eq!(err, ListViewError::NotFound("doc1".into()));
        let state = h.view.state();
        assert_eq!(state.records.len(), 3);
        assert_eq!(state.notifications[0].message, "record doc1 not found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_keeps_last_page() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.source.fail_next(SourceError::Transport("connection refused".into()));
        assert!(h.view.refresh().await.is_err());

        let state = h.view.state();
        assert_eq!(state.records.len(), 3);
        assert_eq!(state.error_banner.as_deref(), Some("network error: connection refused"));
        assert_eq!(h.navigator.redirects.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_clears_session_and_redirects() {
        let h = harness(numbered_todos(3));
        h.view.open().await.unwrap();

        h.source.fail_next(SourceError::Auth);
        assert_eq!(h.view.set_filter_attribute("userId").await, Err(ListViewError::Auth));

        assert!(h.session.token().is_none());
        assert_eq!(h.navigator.redirects.get(), 1);
        assert!(h.view.state().error_banner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_every_change() {
        let h = harness(numbered_todos(3));
        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        h.view.set_observer(move || counter.set(counter.get() + 1));

        h.view.open().await.unwrap();
        let after_open = changes.get();
        assert!(after_open >= 2);

        h.view.begin_add().unwrap();
        assert_eq!(changes.get(), after_open + 1);
    }
}
