use crate::models::{
    AddInterestRequest, AgeRangeRequest, DealBreakerRequest, DistanceRequest, FilterUpdate, GenderPreferencesRequest,
    MessagingUpdate, NotificationUpdate, PrivacyUpdate, UpdatePreferencesRequest,
};
use crate::routes::{decode_segment, error_response, optional_json, respond, validation_error, AppState};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure all preferences routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users/{user_id}/preferences")
            .route(web::post().to(create_preferences))
            .route(web::get().to(get_preferences))
            .route(web::put().to(update_preferences))
            .route(web::delete().to(delete_preferences)),
    )
    .route("/users/{user_id}/preferences/genders", web::put().to(update_genders))
    .route("/users/{user_id}/preferences/age-range", web::put().to(update_age_range))
    .route("/users/{user_id}/preferences/distance", web::put().to(update_distance))
    .route("/users/{user_id}/preferences/filters", web::put().to(update_filters))
    .route("/users/{user_id}/preferences/messaging", web::put().to(update_messaging))
    .route("/users/{user_id}/preferences/privacy", web::put().to(update_privacy))
    .route(
        "/users/{user_id}/preferences/notifications",
        web::put().to(update_notifications),
    )
    .route("/users/{user_id}/preferences/interests", web::post().to(add_interest))
    .route(
        "/users/{user_id}/preferences/interests/{interest}",
        web::delete().to(remove_interest),
    )
    .route("/users/{user_id}/preferences/deal-breakers", web::post().to(add_deal_breaker))
    .route(
        "/users/{user_id}/preferences/deal-breakers/{deal_breaker}",
        web::delete().to(remove_deal_breaker),
    );
}

/// Create preferences with defaults, then apply any fields in the body
///
/// POST /api/v1/users/{userId}/preferences
async fn create_preferences(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let user_id = path.into_inner();
    let request: Option<UpdatePreferencesRequest> = match optional_json(&body) {
        Ok(request) => request,
        Err(resp) => return resp,
    };

    if let Some(req) = &request {
        if let Err(errors) = req.validate() {
            return validation_error(&errors);
        }
        if let (Some(min), Some(max)) = (req.min_age, req.max_age) {
            if min > max {
                return crate::routes::bad_request(
                    "Invalid input",
                    "Minimum age cannot be greater than maximum age".to_string(),
                );
            }
        }
    }

    let preferences = match state.preferences.create_preferences(&user_id).await {
        Ok(preferences) => preferences,
        Err(e) => return error_response(&e),
    };

    let preferences = match request {
        Some(req) => match state.preferences.update_preferences(&user_id, req).await {
            Ok(updated) => updated,
            Err(e) => return error_response(&e),
        },
        None => preferences,
    };

    HttpResponse::Created().json(preferences)
}

async fn get_preferences(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    respond(state.preferences.get_preferences_by_user_id(&path).await)
}

/// Partially update preferences
///
/// PUT /api/v1/users/{userId}/preferences
async fn update_preferences(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdatePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(state.preferences.update_preferences(&path, req.into_inner()).await)
}

async fn delete_preferences(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.preferences.delete_preferences(&path).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

async fn update_genders(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<GenderPreferencesRequest>,
) -> impl Responder {
    respond(
        state
            .preferences
            .update_gender_preferences(&path, req.into_inner().genders)
            .await,
    )
}

async fn update_age_range(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AgeRangeRequest>,
) -> impl Responder {
    respond(state.preferences.update_age_range(&path, req.min_age, req.max_age).await)
}

async fn update_distance(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<DistanceRequest>,
) -> impl Responder {
    respond(
        state
            .preferences
            .update_distance_preference(&path, req.max_distance, req.unit)
            .await,
    )
}

async fn update_filters(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<FilterUpdate>,
) -> impl Responder {
    respond(state.preferences.update_filter_preferences(&path, req.into_inner()).await)
}

async fn update_messaging(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<MessagingUpdate>,
) -> impl Responder {
    respond(state.preferences.update_messaging_preferences(&path, req.into_inner()).await)
}

async fn update_privacy(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<PrivacyUpdate>,
) -> impl Responder {
    respond(state.preferences.update_privacy_preferences(&path, req.into_inner()).await)
}

async fn update_notifications(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<NotificationUpdate>,
) -> impl Responder {
    respond(
        state
            .preferences
            .update_notification_preferences(&path, req.into_inner())
            .await,
    )
}

async fn add_interest(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddInterestRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(
        state
            .preferences
            .add_preferred_interest(&path, req.into_inner().interest)
            .await,
    )
}

async fn remove_interest(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (user_id, interest) = path.into_inner();
    respond(
        state
            .preferences
            .remove_preferred_interest(&user_id, &decode_segment(&interest))
            .await,
    )
}

async fn add_deal_breaker(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<DealBreakerRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(&errors);
    }

    respond(
        state
            .preferences
            .add_deal_breaker(&path, req.into_inner().deal_breaker)
            .await,
    )
}

async fn remove_deal_breaker(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (user_id, deal_breaker) = path.into_inner();
    respond(
        state
            .preferences
            .remove_deal_breaker(&user_id, &decode_segment(&deal_breaker))
            .await,
    )
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
    async fn test_create_returns_defaults() {
        let app = test_app!();

        let req = test::TestRequest::post().uri("/api/v1/users/u1/preferences").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["minAge"], 18);
        assert_eq!(body["maxAge"], 99);
        assert_eq!(body["maxDistance"], 50);
        assert_eq!(body["distanceUnit"], "KILOMETERS");
        assert_eq!(body["showOnlyWithPhotos"], true);
        assert_eq!(body["allowMessagesFromEveryone"], false);
    }

    #[actix_web::test]
    async fn test_create_with_malformed_body_is_400() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/users/u1/preferences")
            .set_json(json!({ "minAge": -5, "maxDistance": "far" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/users/u1/preferences").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/u1/preferences")
            .set_json(json!({ "minAge": 25, "maxDistance": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["minAge"], 25);
        assert_eq!(body["maxDistance"], 10);
    }

    #[actix_web::test]
    async fn test_bad_age_range_is_400_and_unchanged() {
        let app = test_app!();

        let req = test::TestRequest::post().uri("/api/v1/users/u1/preferences").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/v1/users/u1/preferences/age-range")
            .set_json(json!({ "minAge": 40, "maxAge": 30 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/users/u1/preferences").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["minAge"], 18);
        assert_eq!(body["maxAge"], 99);
    }

    #[actix_web::test]
    async fn test_notification_toggle_and_lookup() {
        let app = test_app!();

        for user in ["a", "b"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/preferences", user))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::put()
            .uri("/api/v1/users/a/preferences/notifications")
            .set_json(json!({ "matchNotifications": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["matchNotifications"], false);
        assert_eq!(body["pushNotifications"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications/matchNotifications/users")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["userIds"], json!(["b"]));
    }

    #[actix_web::test]
    async fn test_deal_breaker_routes() {
        let app = test_app!();

        let req = test::TestRequest::post().uri("/api/v1/users/u1/preferences").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users/u1/preferences/deal-breakers")
            .set_json(json!({ "dealBreaker": "smoking" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dealBreakers"], json!(["smoking"]));

        let req = test::TestRequest::delete()
            .uri("/api/v1/users/u1/preferences/deal-breakers/smoking")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dealBreakers"], json!([]));
    }
}
