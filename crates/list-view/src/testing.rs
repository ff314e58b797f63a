//! Test Fixtures
//!
//! A todo-shaped schema, an in-memory data source with adjustable latency
//! and failure injection, and tokio-backed timer/navigator doubles.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    Draft, FieldKind, FieldSpec, FieldValue, FilterAttribute, Page, QueryParams, Record, RecordId, RecordSchema,
    SourceError, SourceResult,
};
use crate::traits::{DataSource, Navigator, Timer};

pub static TODO_SCHEMA: RecordSchema = RecordSchema {
    kind: "todo",
    filter_attributes: &[
        FilterAttribute { name: "id", label: "ID" },
        FilterAttribute { name: "todo", label: "Todo" },
        FilterAttribute { name: "userId", label: "User ID" },
    ],
    default_filter: "todo",
    fields: &[
        FieldSpec { name: "todo", label: "Todo", kind: FieldKind::RequiredText },
        FieldSpec { name: "completed", label: "Completed", kind: FieldKind::Flag },
        FieldSpec { name: "userId", label: "User ID", kind: FieldKind::Reference { related: "employee" } },
    ],
};

pub fn id(raw: &str) -> RecordId {
    RecordId::new(raw).expect("non-empty id")
}

pub fn todo_draft(text: &str, user: Option<&str>) -> Draft {
    let mut draft = Draft::default();
    draft.set("todo", FieldValue::text(text));
    draft.set("completed", FieldValue::Flag(false));
    draft.set("userId", FieldValue::Reference(user.map(id)));
    draft
}

pub fn todo_record(doc_id: &str, text: &str, user: &str) -> Record {
    Record::new(id(doc_id))
        .with_field("todo", FieldValue::text(text))
        .with_field("completed", FieldValue::Flag(false))
        .with_field("userId", FieldValue::Reference(Some(id(user))))
}

/// `count` todos named "todo 1".."todo N", all owned by `emp1`
pub fn numbered_todos(count: usize) -> Vec<Record> {
    (1..=count)
        .map(|n| todo_record(&format!("doc{}", n), &format!("todo {}", n), "emp1"))
        .collect()
}

// ========================
// Mock Data Source
// ========================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(QueryParams),
    Create(Draft),
    Update(RecordId, Draft),
    Delete(RecordId),
    Related(String),
    Children(RecordId),
}

type Latency = Box<dyn Fn(&QueryParams) -> Duration>;

pub struct MockSource {
    records: RefCell<Vec<Record>>,
    related: Vec<RecordId>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<VecDeque<SourceError>>,
    latency: RefCell<Latency>,
    next_id: Cell<u64>,
}

impl MockSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            related: vec![id("emp1"), id("emp2")],
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(VecDeque::new()),
            latency: RefCell::new(Box::new(|_: &QueryParams| Duration::from_millis(10))),
            next_id: Cell::new(1000),
        }
    }

    pub fn set_latency(&self, latency: impl Fn(&QueryParams) -> Duration + 'static) {
        *self.latency.borrow_mut() = Box::new(latency);
    }

    /// Make the next call fail with `err`
    pub fn fail_next(&self, err: SourceError) {
        self.failures.borrow_mut().push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn list_calls(&self) -> Vec<QueryParams> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::List(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, Call::Delete(_))).count()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    fn record_call(&self, call: Call) -> SourceResult<()> {
        self.calls.borrow_mut().push(call);
        match self.failures.borrow_mut().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn matches(record: &Record, params: &QueryParams) -> bool {
        match params.active_search() {
            None => true,
            Some(search) if params.filter_attribute == "id" => record.id.as_str() == search,
            Some(search) => record.field(&params.filter_attribute).display().contains(search),
        }
    }
}

#[async_trait(?Send)]
impl DataSource for MockSource {
    async fn list_page(&self, params: &QueryParams) -> SourceResult<Page> {
        let delay = (**self.latency.borrow())(params);
        let outcome = self.record_call(Call::List(params.clone()));
        tokio::time::sleep(delay).await;
        outcome?;

        let matching: Vec<Record> = self
            .records
            .borrow()
            .iter()
            .filter(|r| Self::matches(r, params))
            .cloned()
            .collect();
        let total = matching.len();
        let records = matching
            .into_iter()
            .skip(params.page_index * params.page_size)
            .take(params.page_size)
            .collect();
        Ok(Page { records, page_index: params.page_index, page_size: params.page_size, total })
    }

    async fn create(&self, draft: &Draft) -> SourceResult<Record> {
        self.record_call(Call::Create(draft.clone()))?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        let record = Record { id: id(&format!("doc{}", n)), fields: draft.fields.clone() };
        self.records.borrow_mut().push(record.clone());
        Ok(record)
    }

    async fn update(&self, record_id: &RecordId, draft: &Draft) -> SourceResult<Record> {
        self.record_call(Call::Update(record_id.clone(), draft.clone()))?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut records = self.records.borrow_mut();
        let record = records
            .iter_mut()
            .find(|r| &r.id == record_id)
            .ok_or_else(|| SourceError::NotFound(record_id.to_string()))?;
        record.fields.extend(draft.fields.clone());
        Ok(record.clone())
    }

    async fn delete(&self, record_id: &RecordId) -> SourceResult<()> {
        self.record_call(Call::Delete(record_id.clone()))?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| &r.id != record_id);
        if records.len() == before {
            return Err(SourceError::NotFound(record_id.to_string()));
        }
        Ok(())
    }

    async fn list_related(&self, field: &str) -> SourceResult<Vec<RecordId>> {
        self.record_call(Call::Related(field.to_string()))?;
        Ok(self.related.clone())
    }

    /// Todos assigned to the employee `id`
    async fn list_children(&self, id: &RecordId) -> SourceResult<Vec<Record>> {
        self.record_call(Call::Children(id.clone()))?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let owner = FieldValue::Reference(Some(id.clone()));
        Ok(self.records.borrow().iter().filter(|r| r.field("userId") == &owner).cloned().collect())
    }
}

// ========================
// Timer + Navigator
// ========================

pub struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub redirects: Cell<usize>,
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.set(self.redirects.get() + 1);
    }
}
