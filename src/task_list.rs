// src/task_list.rs

use actix::dev::ToEnvelope;
use actix::{Context, Handler, MailboxError, Message};
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

use crate::app_state::AppState;
use crate::controller::{
    ApplyFilter, ClearFilters, GetSnapshot, GoToPage, NextPage, PreviousPage, Refresh,
    TaskListController, ToggleSort, UpdateParams,
};
use crate::query_params::{QueryParams, QueryPatch};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .route("", web::get().to(get_tasks))
            .route("/params", web::put().to(update_params))
            .route("/filters", web::post().to(apply_filter))
            .route("/filters", web::delete().to(clear_filters))
            .route("/page/next", web::post().to(next_page))
            .route("/page/previous", web::post().to(previous_page))
            .route("/page/{page}", web::put().to(go_to_page))
            .route("/sort/{column}", web::post().to(toggle_sort))
            .route("/refresh", web::post().to(refresh)),
    );
}

fn controller_unavailable(e: MailboxError) -> HttpResponse {
    error!("Task list controller unavailable: {}", e);
    HttpResponse::InternalServerError().body("Task list controller unavailable")
}

/// Send a param mutation to the controller and answer with the resulting params.
/// The fetch it triggers is observed through GET /tasks.
async fn send_params<M>(data: &AppState, msg: M) -> HttpResponse
where
    M: Message<Result = QueryParams> + Send + 'static,
    TaskListController: Handler<M>,
    Context<TaskListController>: ToEnvelope<TaskListController, M>,
{
    match data.controller.send(msg).await {
        Ok(params) => HttpResponse::Ok().json(params),
        Err(e) => controller_unavailable(e),
    }
}

/// page and per_page must stay positive.
fn validate_patch(patch: &QueryPatch) -> Result<(), &'static str> {
    if patch.page == Some(0) {
        return Err("page must be at least 1");
    }
    if patch.per_page == Some(0) {
        return Err("per_page must be at least 1");
    }
    Ok(())
}

/// GET /tasks
/// Current params, fetch status, last result and error.
pub async fn get_tasks(data: web::Data<AppState>) -> impl Responder {
    match data.controller.send(GetSnapshot).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => controller_unavailable(e),
    }
}

/// PUT /tasks/params
pub async fn update_params(
    data: web::Data<AppState>,
    payload: web::Json<QueryPatch>,
) -> impl Responder {
    let patch = payload.into_inner();
    if let Err(reason) = validate_patch(&patch) {
        return HttpResponse::BadRequest().body(reason);
    }
    send_params(&data, UpdateParams(patch)).await
}

/// POST /tasks/filters
pub async fn apply_filter(
    data: web::Data<AppState>,
    payload: web::Json<QueryPatch>,
) -> impl Responder {
    let patch = payload.into_inner();
    if let Err(reason) = validate_patch(&patch) {
        return HttpResponse::BadRequest().body(reason);
    }
    send_params(&data, ApplyFilter(patch)).await
}

/// DELETE /tasks/filters
pub async fn clear_filters(data: web::Data<AppState>) -> impl Responder {
    info!("Clear filters requested");
    send_params(&data, ClearFilters).await
}

/// PUT /tasks/page/{page}
pub async fn go_to_page(data: web::Data<AppState>, path: web::Path<u32>) -> impl Responder {
    let page = path.into_inner();
    if page == 0 {
        return HttpResponse::BadRequest().body("page must be at least 1");
    }
    send_params(&data, GoToPage(page)).await
}

/// POST /tasks/page/next
pub async fn next_page(data: web::Data<AppState>) -> impl Responder {
    send_params(&data, NextPage).await
}

/// POST /tasks/page/previous
pub async fn previous_page(data: web::Data<AppState>) -> impl Responder {
    send_params(&data, PreviousPage).await
}

/// POST /tasks/sort/{column}
pub async fn toggle_sort(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    send_params(&data, ToggleSort(path.into_inner())).await
}

/// POST /tasks/refresh
pub async fn refresh(data: web::Data<AppState>) -> impl Responder {
    match data.controller.send(Refresh).await {
        Ok(generation) => HttpResponse::Ok().json(json!({ "generation": generation })),
        Err(e) => controller_unavailable(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Subscribe;
    use crate::fetch_cycle::{FetchStatus, TaskListSnapshot};
    use crate::query_params::SortOrder;
    use crate::testing::StubTaskService;
    use actix::Actor;
    use actix_web::{http::StatusCode, App};

    fn start_controller(initial: QueryPatch) -> (AppState, crate::testing::StubHandle) {
        let (service, stub) = StubTaskService::paging(42);
        let controller = TaskListController::new(Box::new(service), &initial).start();
        (AppState { controller }, stub)
    }

    #[actix_web::test]
    async fn get_tasks_returns_snapshot() {
        let (state, _stub) = start_controller(QueryPatch::new());
        let mut rx = state.controller.send(Subscribe).await.unwrap();
        rx.wait_for(|s| s.status == FetchStatus::Success)
            .await
            .unwrap();

        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;
        let req = actix_web::test::TestRequest::get().uri("/tasks").to_request();
        let snapshot: TaskListSnapshot = actix_web::test::call_and_read_body_json(&app, req).await;

        assert_eq!(snapshot.status, FetchStatus::Success);
        let data = snapshot.data.unwrap();
        assert_eq!(data.tasks.len(), 15);
        assert_eq!(data.pagination.summary(), "Showing 1 to 15 of 42 tasks");
    }

    #[actix_web::test]
    async fn filter_patch_resets_page() {
        let (state, stub) = start_controller(QueryPatch::new());
        let mut rx = state.controller.send(Subscribe).await.unwrap();
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_web::test::TestRequest::put()
            .uri("/tasks/page/3")
            .to_request();
        let params: QueryParams = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(params.page, 3);

        let req = actix_web::test::TestRequest::post()
            .uri("/tasks/filters")
            .set_json(json!({ "status": "done", "page": 5 }))
            .to_request();
        let params: QueryParams = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(params.page, 1);

        let snapshot = rx
            .wait_for(|s| s.generation == 3 && !s.loading)
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.status, FetchStatus::Success);
        assert!(snapshot.has_active_filters);
        let last = stub.last_call();
        assert_eq!(last.page, 1);
        assert_eq!(last.status, Some(crate::models::TaskStatus::Done));
    }

    #[actix_web::test]
    async fn clear_filters_returns_to_configured_baseline() {
        let (state, _stub) = start_controller(QueryPatch::new().per_page(20));
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_web::test::TestRequest::put()
            .uri("/tasks/params")
            .set_json(json!({ "per_page": 50, "search": "login" }))
            .to_request();
        let params: QueryParams = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(params.per_page, 50);

        let req = actix_web::test::TestRequest::post()
            .uri("/tasks/sort/due_date")
            .to_request();
        let params: QueryParams = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(params.sort_by, "due_date");
        assert_eq!(params.sort_order, SortOrder::Asc);

        let req = actix_web::test::TestRequest::delete()
            .uri("/tasks/filters")
            .to_request();
        let params: QueryParams = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            params,
            QueryParams {
                per_page: 20,
                ..QueryParams::default()
            }
        );
    }

    #[actix_web::test]
    async fn page_zero_is_rejected() {
        let (state, stub) = start_controller(QueryPatch::new());
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_web::test::TestRequest::put()
            .uri("/tasks/page/0")
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = actix_web::test::TestRequest::put()
            .uri("/tasks/params")
            .set_json(json!({ "per_page": 0 }))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(stub.calls().iter().all(|p| p.page >= 1 && p.per_page >= 1));
    }

    #[actix_web::test]
    async fn refresh_reports_new_generation() {
        let (state, _stub) = start_controller(QueryPatch::new());
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_web::test::TestRequest::post()
            .uri("/tasks/refresh")
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["generation"], 2);
    }
}
