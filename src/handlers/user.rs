use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    errors::AppError,
    models::{NewUser, User},
    services::UserServiceTrait,
    types::Result,
};

#[derive(Debug, Deserialize)]
pub struct UserQueryParams {
    pub email: Option<String>,
}

// Payload used when POST /api/users arrives without a body
fn example_user() -> NewUser {
    NewUser::new("John Doe", "john.doe@example.com")
}

/// List users, optionally narrowed to a single email
pub async fn list_handler(
    query: web::Query<UserQueryParams>,
    service: web::Data<dyn UserServiceTrait>,
) -> Result<impl Responder> {
    let users: Vec<User> = match &query.email {
        Some(email) => service.get_by_email(email).await?.into_iter().collect(),
        None => service.list_all().await?,
    };
    Ok(HttpResponse::Ok().json(users))
}

/// Create a user from the JSON body, or the example user when the body is empty
pub async fn create_handler(
    body: web::Bytes,
    service: web::Data<dyn UserServiceTrait>,
) -> Result<impl Responder> {
    let new_user = if body.is_empty() {
        example_user()
    } else {
        serde_json::from_slice::<NewUser>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid user payload: {}", e)))?
    };

    let user = service.create(new_user).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Get user by ID route handler
pub async fn get_by_id_handler(
    id: web::Path<i32>,
    service: web::Data<dyn UserServiceTrait>,
) -> Result<impl Responder> {
    let id = id.into_inner();
    match service.get_by_id(id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound(format!("user {}", id))),
    }
}

/// Delete user route handler
pub async fn delete_handler(
    id: web::Path<i32>,
    service: web::Data<dyn UserServiceTrait>,
) -> Result<impl Responder> {
    let id = id.into_inner();
    if service.delete_by_id(id).await? {
        Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
    } else {
        Err(AppError::NotFound(format!("user {}", id)))
    }
}
