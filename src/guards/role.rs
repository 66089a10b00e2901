use rocket::request::{self, Request, FromRequest, Outcome};
use rocket::http::Status;

use crate::guards::AuthGuard;
use crate::models::Role;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::r#gen::OpenApiGenerator;

macro_rules! role_guard {
    ($name:ident, $role:expr) => {
        pub struct $name {
            pub auth: AuthGuard,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                match req.guard::<AuthGuard>().await {
                    Outcome::Success(auth) => {
                        if auth.role == $role {
                            Outcome::Success($name { auth })
                        } else {
                            Outcome::Error((Status::Forbidden, ()))
                        }
                    }
                    Outcome::Error(e) => Outcome::Error(e),
                    Outcome::Forward(f) => Outcome::Forward(f),
                }
            }
        }

        impl<'a> OpenApiFromRequest<'a> for $name {
            fn from_request_input(
                _gen: &mut OpenApiGenerator,
                _name: String,
                _required: bool,
            ) -> rocket_okapi::Result<RequestHeaderInput> {
                Ok(RequestHeaderInput::None)
            }
        }
    };
}

role_guard!(HouseholdGuard, Role::Household);
role_guard!(WorkerGuard, Role::Worker);
role_guard!(AdminGuard, Role::Admin);
