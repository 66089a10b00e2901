use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::serde::json::Json;

use crate::guards::SESSION_COOKIE;
use crate::utils::ApiResponse;

/// Session gate for the dashboard/login pages. Only the cookie's
/// presence is checked here; API routes verify the token itself.
fn has_session(jar: &CookieJar<'_>) -> bool {
    jar.get(SESSION_COOKIE).is_some()
}

macro_rules! gated_pages {
    ($dashboard:ident, $login:ident, $dashboard_path:expr, $login_path:expr, $page:expr) => {
        #[get($dashboard_path)]
        pub fn $dashboard(
            jar: &CookieJar<'_>,
        ) -> Result<Json<ApiResponse<serde_json::Value>>, Redirect> {
            if !has_session(jar) {
                return Err(Redirect::to($login_path));
            }
            Ok(Json(ApiResponse::success(serde_json::json!({
                "page": $page
            }))))
        }

        #[get($login_path)]
        pub fn $login(
            jar: &CookieJar<'_>,
        ) -> Result<Json<ApiResponse<serde_json::Value>>, Redirect> {
            if has_session(jar) {
                return Err(Redirect::to($dashboard_path));
            }
            Ok(Json(ApiResponse::success(serde_json::json!({
                "page": concat!($page, "-login")
            }))))
        }
    };
}

gated_pages!(worker_dashboard, worker_login, "/worker/dashboard", "/worker/login", "worker-dashboard");
gated_pages!(household_dashboard, household_login, "/household/dashboard", "/household/login", "household-dashboard");
gated_pages!(admin_dashboard, admin_login, "/admin/dashboard", "/admin/login", "admin-dashboard");

#[cfg(test)]
mod tests {
    use rocket::http::{Cookie, Status};
    use rocket::local::blocking::Client;

    fn client() -> Client {
        let rocket = rocket::build().mount(
            "/",
            routes![
                super::worker_dashboard,
                super::worker_login,
                super::household_dashboard,
                super::household_login,
                super::admin_dashboard,
                super::admin_login,
            ],
        );
        Client::tracked(rocket).expect("valid rocket instance")
    }

    #[test]
    fn dashboard_without_session_redirects_to_login() {
        let client = client();
        let response = client.get("/worker/dashboard").dispatch();

        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/worker/login"));
    }

    #[test]
    fn dashboard_with_session_does_not_redirect() {
        let client = client();
        let response = client
            .get("/worker/dashboard")
            .cookie(Cookie::new(crate::guards::SESSION_COOKIE, "token"))
            .dispatch();

        assert_eq!(response.status(), Status::Ok);
    }

    #[test]
    fn login_with_session_redirects_to_dashboard() {
        let client = client();
        let response = client
            .get("/household/login")
            .cookie(Cookie::new(crate::guards::SESSION_COOKIE, "token"))
            .dispatch();

        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/household/dashboard"));
    }
}
