use crate::core::age::today;
use crate::models::{AddInterestRequest, AddPhotoRequest, ReorderPhotosRequest, UpdateProfileRequest, VisibilityRequest};
use crate::routes::{
    bad_request, decode_segment, error_response, optional_json, respond, validation_error, AppState,
};
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Configure all profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users/{user_id}/profile")
            .route(web::post().to(create_profile))
            .route(web::get().to(get_profile))
            .route(web::put().to(update_profile))
            .route(web::delete().to(delete_profile)),
    )
    .route("/profiles/{id}", web::get().to(get_profile_by_id))
    .route("/users/{user_id}/profile/interests", web::post().to(add_interest))
    .route(
        "/users/{user_id}/profile/interests/{interest}",
        web::delete().to(remove_interest),
    )
    .route("/users/{user_id}/profile/photos", web::post().to(add_photo))
    .route("/users/{user_id}/profile/photos/order", web::put().to(reorder_photos))
    .route("/users/{user_id}/profile/photos/{photo}", web::delete().to(remove_photo))
    .route("/users/{user_id}/profile/visibility", web::put().to(set_visibility));
}

/// Create a profile
///
/// POST /api/v1/users/{userId}/profile
///
/// The body is optional; any fields it carries are applied right after
/// creation, as with PUT.
async fn create_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let user_id = path.into_inner();
    let request: Option<UpdateProfileRequest> = match optional_json(&body) {
        Ok(request) => request,
        Err(resp) => return resp,
    };

    if let Some(req) = &request {
        if let Err(errors) = req.validate() {
            return validation_error(&errors);
        }
        // Reject an underage date of birth before anything is stored
        if let Some(dob) = req.date_of_birth {
            if let Err(e) = state.profiles.policy().check_date_of_birth(dob, today()) {
                return error_response(&e);
            }
        }
    }

    let profile = match state.profiles.create_profile(&user_id).await {
        Ok(profile) => profile,
        Err(e) => return error_response(&e),
    };

    let profile = match request {
        Some(req) => match state.profiles.update_profile(&user_id, req).await {
            Ok(updated) => updated,
            Err(e) => return error_response(&e),
        },
        None => profile,
    };

    HttpResponse::Created().json(profile)
}

async fn get_profile(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    respond(state.profiles.get_profile_by_user_id(&path).await)
}

/// Partially update a profile
///
/// PUT /api/v1/users/{userId}/profile
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(state.profiles.update_profile(&path, req.into_inner()).await)
}

async fn delete_profile(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.profiles.delete_profile(&path).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

async fn get_profile_by_id(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match Uuid::parse_str(&path) {
        Ok(id) => id,
        Err(e) => return bad_request("Invalid profile id", e.to_string()),
    };

    respond(state.profiles.get_profile_by_id(id).await)
}

async fn add_interest(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddInterestRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(state.profiles.add_interest(&path, req.into_inner().interest).await)
}

async fn remove_interest(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (user_id, interest) = path.into_inner();
    respond(state.profiles.remove_interest(&user_id, &decode_segment(&interest)).await)
}

async fn add_photo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddPhotoRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(state.profiles.add_photo(&path, req.into_inner().photo_url).await)
}

/// DELETE /api/v1/users/{userId}/profile/photos/{photo}
///
/// `photo` is the percent-encoded photo reference.
async fn remove_photo(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (user_id, photo) = path.into_inner();
    respond(state.profiles.remove_photo(&user_id, &decode_segment(&photo)).await)
}

async fn reorder_photos(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ReorderPhotosRequest>,
) -> impl Responder {
    respond(state.profiles.reorder_photos(&path, &req.photo_urls).await)
}

async fn set_visibility(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<VisibilityRequest>,
) -> impl Responder {
    respond(state.profiles.set_visibility(&path, req.is_visible).await)
}
