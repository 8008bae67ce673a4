use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::{
    dto::{CreateUserRequest, PublicUser},
    error::{UserError, UserResult},
    repo_types::UserPatch,
    validation::{validate, ValidationResult},
};

/// Where mutations redirect to once they succeed.
pub const USERS_PATH: &str = "/users";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/edit/:id", get(edit_user))
        .route("/update/:id", post(update_user))
        .route("/delete/:id", get(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> UserResult<Json<Vec<PublicUser>>> {
    let users = state.users.list_all().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Form(payload): Form<CreateUserRequest>,
) -> UserResult<Redirect> {
    if let ValidationResult::Invalid(errors) = validate(&payload) {
        warn!(errors = errors.len(), "invalid user payload");
        return Err(UserError::Validation(errors));
    }

    state.users.create(payload).await?;
    Ok(Redirect::to(USERS_PATH))
}

#[instrument(skip(state))]
pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<Json<PublicUser>> {
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(patch): Form<UserPatch>,
) -> UserResult<Redirect> {
    state.users.update_by_id(id, patch).await?;
    Ok(Redirect::to(USERS_PATH))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<Redirect> {
    state.users.delete_by_id(id).await?;
    Ok(Redirect::to(USERS_PATH))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;
    use crate::users::password::verify_password;

    fn app(state: &AppState) -> Router {
        build_app(state.clone())
    }

    fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(res: &axum::response::Response) -> &str {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn create_redirects_and_lists_without_hash() {
        let state = AppState::fake();

        let res = app(&state)
            .oneshot(form(
                "POST",
                "/users",
                "name=Ana&email=ana%40example.com&password=secret1",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), USERS_PATH);

        let stored = state.users.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].password_hash, "secret1");
        assert!(verify_password("secret1", &stored[0].password_hash).unwrap());

        let res = app(&state).oneshot(get_req("/users")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res.into_body()).await;
        let users = body.as_array().expect("array");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["name"], "Ana");
        assert_eq!(users[0]["email"], "ana@example.com");
        assert!(users[0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn invalid_create_returns_all_errors_and_stores_nothing() {
        let state = AppState::fake();

        let res = app(&state)
            .oneshot(form("POST", "/users", "name=&email=x&password=123"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = json_body(res.into_body()).await;
        let errors = body["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["field"], "email");
        assert_eq!(errors[2]["field"], "password");

        assert!(state.users.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let state = AppState::fake();
        let res = app(&state).oneshot(form("POST", "/users", "")).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res.into_body()).await;
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn edit_update_delete_flow() {
        let state = AppState::fake();
        let created = state
            .users
            .create(CreateUserRequest {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        let res = app(&state)
            .oneshot(get_req(&format!("/users/edit/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res.into_body()).await;
        assert_eq!(body["id"], created.id.to_string());
        assert_eq!(body["name"], "Ana");

        let res = app(&state)
            .oneshot(form(
                "POST",
                &format!("/users/update/{}", created.id),
                "name=Ana+Maria",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let updated = state.users.find_by_id(created.id).await.unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.password_hash, created.password_hash);

        let res = app(&state)
            .oneshot(get_req(&format!("/users/delete/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), USERS_PATH);

        let res = app(&state)
            .oneshot(get_req(&format!("/users/edit/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_password_is_stored_verbatim() {
        let state = AppState::fake();
        let created = state
            .users
            .create(CreateUserRequest {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        let res = app(&state)
            .oneshot(form(
                "POST",
                &format!("/users/update/{}", created.id),
                "password=plaintext",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let stored = state.users.find_by_id(created.id).await.unwrap();
        assert_eq!(stored.password_hash, "plaintext");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let state = AppState::fake();
        let id = uuid::Uuid::new_v4();

        let res = app(&state)
            .oneshot(get_req(&format!("/users/edit/{}", id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app(&state)
            .oneshot(form("POST", &format!("/users/update/{}", id), "name=x"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app(&state)
            .oneshot(get_req(&format!("/users/delete/{}", id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let state = AppState::fake();
        let res = app(&state)
            .oneshot(get_req("/users/edit/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let state = AppState::fake();
        let res = app(&state).oneshot(get_req("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
