// src/controller.rs

use actix::prelude::*;
use log::{debug, info};
use tokio::sync::watch;

use crate::fetch_cycle::{FetchCycle, FetchState, Resolution, TaskListSnapshot};
use crate::param_store::{ParamStore, ParamsChanged};
use crate::query_params::{QueryParams, QueryPatch};
use crate::task_service::TaskQueryService;

/// Merge a patch into the current params. Setting status, priority or
/// search moves back to page 1.
#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct UpdateParams(pub QueryPatch);

/// Same as [`UpdateParams`]; used by the filter bar.
#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct ApplyFilter(pub QueryPatch);

#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct GoToPage(pub u32);

#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct NextPage;

#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct PreviousPage;

/// Back to the params the controller was started with.
#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct ClearFilters;

#[derive(Message)]
#[rtype(result = "QueryParams")]
pub struct ToggleSort(pub String);

/// Fetch again with the current params. Returns the request generation.
#[derive(Message)]
#[rtype(result = "u64")]
pub struct Refresh;

#[derive(Message)]
#[rtype(result = "TaskListSnapshot")]
pub struct GetSnapshot;

#[derive(Message)]
#[rtype(result = "watch::Receiver<TaskListSnapshot>")]
pub struct Subscribe;

/// Owns the task list query state and drives fetches against the task API.
///
/// Param mutations go through the [`ParamStore`]; the change notification it
/// returns is turned into a fetch before the mutating message is answered, so
/// no snapshot pairs new params with a finished older fetch. Every new
/// snapshot is published on a watch channel.
pub struct TaskListController {
    service: Box<dyn TaskQueryService>,
    store: ParamStore,
    cycle: FetchCycle,
    snapshots: watch::Sender<TaskListSnapshot>,
}

impl TaskListController {
    pub fn new(service: Box<dyn TaskQueryService>, initial: &QueryPatch) -> Self {
        let store = ParamStore::new(initial);
        let cycle = FetchCycle::new();
        let (snapshots, _) = watch::channel(cycle.snapshot(store.current()));
        TaskListController {
            service,
            store,
            cycle,
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(self.cycle.snapshot(self.store.current()));
    }

    /// Start the fetch for a store change and answer with the new params.
    fn schedule(&mut self, change: ParamsChanged, ctx: &mut Context<Self>) -> QueryParams {
        let ParamsChanged(params) = change;
        self.fetch(params.clone(), ctx);
        params
    }

    fn fetch(&mut self, params: QueryParams, ctx: &mut Context<Self>) -> u64 {
        let generation = self.cycle.begin();
        info!(
            "Fetching tasks (generation {}): page {}, per_page {}, sort {} {}",
            generation, params.page, params.per_page, params.sort_by, params.sort_order
        );

        let request = self.service.query(params);
        self.publish();

        ctx.spawn(request.into_actor(self).map(move |outcome, act, _ctx| {
            if act.cycle.resolve(generation, outcome) == Resolution::Applied {
                act.publish();
            }
        }));
        generation
    }
}

impl Actor for TaskListController {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        let params = self.store.current().clone();
        info!("Task list controller started: {:?}", params);
        self.fetch(params, ctx);
    }
}

impl Handler<UpdateParams> for TaskListController {
    type Result = MessageResult<UpdateParams>;

    fn handle(&mut self, msg: UpdateParams, ctx: &mut Context<Self>) -> Self::Result {
        debug!("Updating task list params with {:?}", msg.0);
        let change = self.store.update(&msg.0);
        MessageResult(self.schedule(change, ctx))
    }
}

impl Handler<ApplyFilter> for TaskListController {
    type Result = MessageResult<ApplyFilter>;

    fn handle(&mut self, msg: ApplyFilter, ctx: &mut Context<Self>) -> Self::Result {
        debug!("Applying task list filter {:?}", msg.0);
        let change = self.store.update(&msg.0);
        MessageResult(self.schedule(change, ctx))
    }
}

impl Handler<GoToPage> for TaskListController {
    type Result = MessageResult<GoToPage>;

    fn handle(&mut self, msg: GoToPage, ctx: &mut Context<Self>) -> Self::Result {
        let change = self.store.go_to_page(msg.0);
        MessageResult(self.schedule(change, ctx))
    }
}

impl Handler<NextPage> for TaskListController {
    type Result = MessageResult<NextPage>;

    fn handle(&mut self, _: NextPage, ctx: &mut Context<Self>) -> Self::Result {
        let page = self.store.current().page;
        // While a fetch is in flight the last result may belong to other filters
        let last_page = match self.cycle.state() {
            FetchState::Loading => None,
            _ => self.cycle.last_result().map(|r| r.pagination.last_page),
        };
        match last_page {
            Some(last_page) if page < last_page => {
                let change = self.store.go_to_page(page + 1);
                MessageResult(self.schedule(change, ctx))
            }
            _ => MessageResult(self.store.current().clone()),
        }
    }
}

impl Handler<PreviousPage> for TaskListController {
    type Result = MessageResult<PreviousPage>;

    fn handle(&mut self, _: PreviousPage, ctx: &mut Context<Self>) -> Self::Result {
        let page = self.store.current().page;
        if page > 1 {
            let change = self.store.go_to_page(page - 1);
            MessageResult(self.schedule(change, ctx))
        } else {
            MessageResult(self.store.current().clone())
        }
    }
}

impl Handler<ClearFilters> for TaskListController {
    type Result = MessageResult<ClearFilters>;

    fn handle(&mut self, _: ClearFilters, ctx: &mut Context<Self>) -> Self::Result {
        info!("Clearing task list filters");
        let change = self.store.clear();
        MessageResult(self.schedule(change, ctx))
    }
}

impl Handler<ToggleSort> for TaskListController {
    type Result = MessageResult<ToggleSort>;

    fn handle(&mut self, msg: ToggleSort, ctx: &mut Context<Self>) -> Self::Result {
        let change = self.store.toggle_sort(&msg.0);
        MessageResult(self.schedule(change, ctx))
    }
}

impl Handler<Refresh> for TaskListController {
    type Result = MessageResult<Refresh>;

    fn handle(&mut self, _: Refresh, ctx: &mut Context<Self>) -> Self::Result {
        let params = self.store.current().clone();
        MessageResult(self.fetch(params, ctx))
    }
}

impl Handler<GetSnapshot> for TaskListController {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _: GetSnapshot, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.cycle.snapshot(self.store.current()))
    }
}

impl Handler<Subscribe> for TaskListController {
    type Result = MessageResult<Subscribe>;

    fn handle(&mut self, _: Subscribe, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.subscribe())
    }
}
