// src/main.rs

use std::io;

use actix::Actor;
use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use taskline_dashboard::app_state::AppState;
use taskline_dashboard::config::Config;
use taskline_dashboard::controller::TaskListController;
use taskline_dashboard::navigation::get_navigation;
use taskline_dashboard::task_list;
use taskline_dashboard::task_service::HttpTaskQueryService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let service = HttpTaskQueryService::from_config(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    // Starting the controller issues the first fetch
    let controller = TaskListController::new(Box::new(service), &config.initial_params).start();

    let frontend_origin = config.frontend_origin.clone();
    info!("Task API: {}", config.api_base_url);
    info!("Server running at http://{}", config.bind_address);
    info!("Allowed CORS Origin: {}", frontend_origin);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                controller: controller.clone(),
            }))
            .configure(task_list::configure)
            .route("/navigation", web::get().to(get_navigation))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
