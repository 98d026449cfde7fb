use crate::admin::{AdminCommand, SessionDescription};
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::Responder;
use actix_web::Result;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    session_url: String,
    description: SessionDescription,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/").route(web::get().to(admin_index)))
            .service(
                web::resource("/session")
                    .name("admin_session")
                    .route(web::get().to(show_session)),
            ),
    );
}

async fn describe_session(srv_tx: &ServerTx) -> Result<SessionDescription> {
    let (tx, rx) = tokio::sync::oneshot::channel::<SessionDescription>();

    srv_tx
        .send(ServerCommand::Admin(AdminCommand::DescribeSession { tx }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))
}

pub async fn admin_index(req: HttpRequest, srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let description = describe_session(srv_tx.get_ref()).await?;
    let session_url = req.url_for_static("admin_session")?.to_string();
    Ok(AdminIndexTemplate {
        session_url,
        description,
    })
}

pub async fn show_session(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let description = describe_session(srv_tx.get_ref()).await?;
    Ok(HttpResponse::Ok().json(description))
}
