#[macro_use]
extern crate rocket;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
mod utils;

use dotenvy::dotenv;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(404)]
fn not_found() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "error": "Resource not found (check /api/v1 prefix)"
    })
}

#[catch(500)]
fn internal_error() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "error": "Internal server error"
    })
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    println!("🏠 HomeHands API running");
    println!("📚 Swagger UI → http://localhost:8000/api/docs");

    rocket::build()
        .attach(db::init())
        .attach(CORS)
        .mount("/", routes![options_handler])
        .mount(
            "/",
            routes![
                // Session-gated pages
                routes::pages::worker_dashboard,
                routes::pages::worker_login,
                routes::pages::household_dashboard,
                routes::pages::household_login,
                routes::pages::admin_dashboard,
                routes::pages::admin_login,
            ],
        )
        .mount(
            "/api/v1",
            routes![
                // Auth
                routes::auth::register,
                routes::auth::login,
                routes::auth::google_login,
                routes::auth::github_login,
                routes::auth::refresh_token,
                routes::auth::logout,
                // Jobs
                routes::job::create_job,
                routes::job::list_jobs,
                routes::job::get_job,
                routes::job::apply_for_job,
                routes::job::cancel_job,
                routes::job::reschedule_job,
                routes::job::complete_job,
                routes::job::submit_review,
                routes::job::match_workers,
                routes::job::household_bookings,
                routes::job::worker_jobs,
                // Workers
                routes::worker::get_worker_profile,
                routes::worker::update_worker_profile,
                routes::worker::get_worker_by_id,
                routes::worker::search_workers,
                // Households
                routes::household::get_household_profile,
                routes::household::update_household_profile,
                // Notifications
                routes::notification::list_notifications,
                routes::notification::unread_count,
                routes::notification::mark_as_read,
                routes::notification::mark_all_as_read,
                routes::notification::delete_notification,
                // Payments
                routes::payment::list_service_payments,
                routes::payment::list_training_payments,
                routes::payment::payment_webhook,
                // Catalog
                routes::catalog::get_all_packages,
                routes::catalog::get_packages_by_category,
                routes::catalog::get_package_by_id,
                routes::catalog::get_all_training,
                // Chat
                routes::chat::send_message,
                routes::chat::get_messages,
                // Uploads
                routes::upload::upload_image,
                routes::upload::upload_document,
                // Admin
                routes::admin::dashboard,
                routes::admin::get_admin_profile,
                routes::admin::get_all_workers,
                routes::admin::get_all_households,
                routes::admin::update_worker_status,
                routes::admin::update_household_status,
                routes::admin::delete_worker,
                routes::admin::delete_household,
                routes::admin::approve_job,
                routes::admin::assign_worker,
                routes::admin::delete_job,
            ],
        )
        .mount("/uploads", FileServer::from("uploads"))
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register("/", catchers![not_found, internal_error])
}
