use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use actix_web::{web, HttpResponse};

mod admin;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)))
        .service(web::resource("/health").route(web::get().to(health)));

    configure_admin_handlers(cfg);
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
