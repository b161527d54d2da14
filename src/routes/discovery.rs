use crate::models::{
    DiscoverQuery, DiscoverResponse, InterestsQuery, LocationQuery, NotificationType, NotificationUsersResponse,
    ProfileListResponse, SearchCriteria,
};
use crate::routes::{bad_request, error_response, validation_error, AppState};
use crate::services::ServiceError;
use actix_web::{web, HttpResponse, Responder};
use std::str::FromStr;
use validator::Validate;

/// Configure discovery and lookup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/{user_id}/profiles/visible", web::get().to(visible_profiles))
        .route("/users/{user_id}/profiles/complete", web::get().to(complete_profiles))
        .route("/users/{user_id}/profiles/by-location", web::get().to(profiles_by_location))
        .route("/users/{user_id}/profiles/by-interests", web::get().to(profiles_by_interests))
        .route("/users/{user_id}/profiles/search", web::post().to(search_profiles))
        .route("/users/{user_id}/discover", web::get().to(discover))
        .route("/notifications/{kind}/users", web::get().to(notification_users));
}

fn list(result: Result<Vec<crate::models::Profile>, ServiceError>) -> HttpResponse {
    match result {
        Ok(profiles) => HttpResponse::Ok().json(ProfileListResponse::from(profiles)),
        Err(e) => error_response(&e),
    }
}

async fn visible_profiles(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    list(state.profiles.get_visible_profiles(Some(path.as_str())).await)
}

async fn complete_profiles(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    list(state.profiles.get_complete_profiles(Some(path.as_str())).await)
}

/// GET /api/v1/users/{userId}/profiles/by-location?location=berlin
async fn profiles_by_location(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LocationQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(&errors);
    }

    list(
        state
            .profiles
            .get_profiles_by_location(&query.location, Some(path.as_str()))
            .await,
    )
}

/// GET /api/v1/users/{userId}/profiles/by-interests?interests=hiking,reading
async fn profiles_by_interests(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<InterestsQuery>,
) -> impl Responder {
    list(
        state
            .profiles
            .get_profiles_by_interests(&query.tags(), Some(path.as_str()))
            .await,
    )
}

/// Search visible profiles on behalf of a user
///
/// POST /api/v1/users/{userId}/profiles/search
///
/// The requesting user is always excluded from the results.
async fn search_profiles(
    state: web::Data<AppState>,
    path: web::Path<String>,
    criteria: web::Json<SearchCriteria>,
) -> impl Responder {
    let mut criteria = criteria.into_inner();
    if let (Some(min), Some(max)) = (criteria.min_age, criteria.max_age) {
        if min > max {
            return bad_request(
                "Invalid input",
                "Minimum age cannot be greater than maximum age".to_string(),
            );
        }
    }
    criteria.exclude_user_id = Some(path.into_inner());

    list(state.profiles.search_profiles(&criteria).await)
}

/// Profiles a user is eligible to see
///
/// GET /api/v1/users/{userId}/discover?verified=id1,id2
async fn discover(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DiscoverQuery>,
) -> impl Responder {
    match state.discovery.discover_for(&path, &query.verified_ids()).await {
        Ok(result) => HttpResponse::Ok().json(DiscoverResponse {
            profiles: result.profiles,
            total_candidates: result.total_candidates,
        }),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/notifications/{type}/users
///
/// `type` is one of `pushNotifications`, `emailNotifications`,
/// `matchNotifications`, `messageNotifications`, `likeNotifications`
/// (or the short forms `push`, `email`, ...).
async fn notification_users(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let kind = match NotificationType::from_str(&path) {
        Ok(kind) => kind,
        Err(e) => return bad_request("Invalid notification type", e.to_string()),
    };

    match state.preferences.users_with_notifications_enabled(kind).await {
        Ok(user_ids) => HttpResponse::Ok().json(NotificationUsersResponse {
            notification_type: kind,
            count: user_ids.len(),
            user_ids,
        }),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::create_test_state;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(create_test_state()))
                    .configure(crate::routes::configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_visible_excludes_self_and_hidden() {
        let app = test_app!();

        for user in ["me", "a", "b"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/profile", user))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::put()
            .uri("/api/v1/users/b/profile/visibility")
            .set_json(json!({ "isVisible": false }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/api/v1/users/me/profiles/visible").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalResults"], 1);
        assert_eq!(body["profiles"][0]["userId"], "a");
    }

    #[actix_web::test]
    async fn test_search_by_location() {
        let app = test_app!();

        for (user, location) in [("me", "Berlin"), ("a", "Berlin Mitte"), ("b", "Paris")] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/profile", user))
                .set_json(json!({ "location": location }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/users/me/profiles/search")
            .set_json(json!({ "location": "berlin" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalResults"], 1);
        assert_eq!(body["profiles"][0]["userId"], "a");
    }

    #[actix_web::test]
    async fn test_search_with_extreme_ages() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/users/me/profiles/search")
            .set_json(json!({ "minAge": 18, "maxAge": 4000000000u32 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["totalResults"], 0);
    }

    #[actix_web::test]
    async fn test_discover_without_profile_is_404() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/v1/users/ghost/discover").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_unknown_notification_type_is_400() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/v1/notifications/smoke/users").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
