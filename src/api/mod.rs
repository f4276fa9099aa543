use actix_web::web;
mod handlers;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(handlers::health)
            .service(handlers::signup)
            .service(handlers::login)
    );
}
