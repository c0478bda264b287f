//! Fixtures and a scriptable task service for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use futures::future::FutureExt;
use tokio::sync::oneshot;

use crate::models::{PageInfo, Task, TaskListResult, TaskPriority, TaskStatus};
use crate::query_params::{QueryParams, QueryPatch};
use crate::task_service::{QueryFuture, ServiceError, TaskQueryService};

pub fn sample_task(id: u64) -> Task {
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
    Task {
        id,
        title: format!("Task {}", id),
        description: None,
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        progress: 0,
        start_date: None,
        due_date: None,
        completed_at: None,
        project: None,
        assignee: None,
        tags: vec![],
        comments_count: 0,
        attachments_count: 0,
        subtasks_count: 0,
        created_at: Some(created),
        updated_at: Some(created),
    }
}

/// The page `params` asks for out of `total` tasks.
pub fn page_of(params: &QueryParams, total: u64) -> TaskListResult {
    let per_page = u64::from(params.per_page.max(1));
    let last_page = total.div_ceil(per_page).max(1) as u32;
    let first = u64::from(params.page.saturating_sub(1)) * per_page + 1;
    let (from, to) = if first > total {
        (None, None)
    } else {
        (Some(first), Some((first + per_page - 1).min(total)))
    };
    let tasks = match (from, to) {
        (Some(from), Some(to)) => (from..=to).map(sample_task).collect(),
        _ => vec![],
    };

    TaskListResult {
        tasks,
        pagination: PageInfo {
            total,
            per_page: params.per_page,
            current_page: params.page,
            last_page,
            from,
            to,
        },
        filters: QueryPatch::default(),
        user_role: "member".to_string(),
    }
}

type Outcome = Result<TaskListResult, ServiceError>;
type Responder = Box<dyn Fn(&QueryParams) -> Outcome>;

enum Mode {
    Immediate(Responder),
    Deferred,
}

/// Records every query. Either answers right away, or parks each request
/// until the test answers it through [`StubHandle::respond`].
pub struct StubTaskService {
    mode: Mode,
    handle: StubHandle,
}

#[derive(Clone, Default)]
pub struct StubHandle {
    calls: Rc<RefCell<Vec<QueryParams>>>,
    pending: Rc<RefCell<Vec<Option<oneshot::Sender<Outcome>>>>>,
}

impl StubTaskService {
    pub fn replying(respond: impl Fn(&QueryParams) -> Outcome + 'static) -> (Self, StubHandle) {
        let handle = StubHandle::default();
        let service = StubTaskService {
            mode: Mode::Immediate(Box::new(respond)),
            handle: handle.clone(),
        };
        (service, handle)
    }

    /// Serves `total` tasks, paged the way each request asks.
    pub fn paging(total: u64) -> (Self, StubHandle) {
        Self::replying(move |params| Ok(page_of(params, total)))
    }

    pub fn deferred() -> (Self, StubHandle) {
        let handle = StubHandle::default();
        let service = StubTaskService {
            mode: Mode::Deferred,
            handle: handle.clone(),
        };
        (service, handle)
    }
}

impl TaskQueryService for StubTaskService {
    fn query(&self, params: QueryParams) -> QueryFuture {
        self.handle.calls.borrow_mut().push(params.clone());
        match &self.mode {
            Mode::Immediate(respond) => {
                let outcome = respond(&params);
                async move { outcome }.boxed_local()
            }
            Mode::Deferred => {
                let (tx, rx) = oneshot::channel();
                self.handle.pending.borrow_mut().push(Some(tx));
                async move {
                    rx.await
                        .unwrap_or(Err(ServiceError::Transport { message: None }))
                }
                .boxed_local()
            }
        }
    }
}

impl StubHandle {
    pub fn calls(&self) -> Vec<QueryParams> {
        self.calls.borrow().clone()
    }

    pub fn last_call(&self) -> QueryParams {
        self.calls.borrow().last().cloned().expect("no query was issued")
    }

    /// Answer the `index`-th deferred request.
    pub fn respond(&self, index: usize, outcome: Outcome) {
        let sender = self.pending.borrow_mut()[index].take();
        if let Some(tx) = sender {
            let _ = tx.send(outcome);
        }
    }
}
