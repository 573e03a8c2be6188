pub mod auth;
pub mod health;
pub mod pathways;
pub mod progress;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::me),
    )
    .service(
        web::scope("/users")
            .service(users::update_me)
            .service(users::deactivate_me),
    )
    .service(
        web::scope("/pathways")
            .service(pathways::list_pathways)
            .service(pathways::create_pathway)
            .service(pathways::get_pathway)
            .service(pathways::update_pathway)
            .service(pathways::delete_pathway)
            .service(pathways::add_content)
            .service(pathways::list_content)
            .service(pathways::update_content)
            .service(pathways::delete_content),
    )
    .service(
        web::scope("/progress")
            .service(progress::list_progress)
            .service(progress::mark_progress)
            .service(progress::reset_progress),
    );
}
