use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, to_value};

use super::models::{
    LoginPayload, RegisterUserPayload, User, UserUpdate, VerifyUserPayload, TABLE,
};
use crate::common::{ApiError, ApiRequest, ApiResponse};
use crate::kernel::ServerDeps;

/// POST /smart-home/register - sign up with the identity provider and
/// persist the user record under the returned subject id.
pub async fn register(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let payload: RegisterUserPayload = req.json_body()?;

    let mut attributes = BTreeMap::new();
    attributes.insert("email".to_string(), payload.email.clone());
    let sub = deps
        .identity
        .sign_up(&payload.email, &payload.password, &attributes)
        .await?;

    let user = User {
        id: sub.clone(),
        email: payload.email,
        user_name: payload.user_name,
        phone: payload.mobile_number,
        is_home: true,
        is_admin: false,
    };
    let doc = to_value(&user).map_err(anyhow::Error::from)?;
    deps.store.put(TABLE, &user.key(), doc).await?;

    Ok(ApiResponse::created(json!({
        "message": "User registered successfully",
        "userId": sub,
    })))
}

/// POST /smart-home/verify-user - confirm a pending sign-up, or complete a
/// password reset when `isForgetPassword` is set.
pub async fn verify(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let payload: VerifyUserPayload = req.json_body()?;

    if payload.is_forget_password {
        let password = payload.password.ok_or_else(|| {
            ApiError::Validation("password is required for a password reset".to_string())
        })?;
        deps.identity
            .confirm_forgot_password(&payload.email, &payload.otp, &password)
            .await
            .map_err(|_| ApiError::Validation("Invalid verification code".to_string()))?;
        return Ok(ApiResponse::created(json!({
            "message": "Password reset confirmed",
        })));
    }

    deps.identity
        .confirm_sign_up(&payload.email, &payload.otp)
        .await
        .map_err(|_| ApiError::Validation("Invalid verification code".to_string()))?;

    Ok(ApiResponse::created(json!({
        "message": "Email verification done",
    })))
}

/// POST /smart-home/login - authenticate against the identity provider.
pub async fn login(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let payload: LoginPayload = req.json_body()?;

    let session = deps
        .identity
        .initiate_auth(&payload.email, &payload.password)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "message": "Login successful",
        "session": session,
    })))
}

/// GET /smart-home - current user record.
pub async fn get(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;

    let doc = deps
        .store
        .get(TABLE, &User::key_for(&auth.sub))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "message": "User details",
        "user": doc,
    })))
}

/// PATCH /smart-home - typed merge-write of the current user record.
pub async fn update(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let update: UserUpdate = req.json_body()?;

    let key = User::key_for(&auth.sub);
    if deps.store.get(TABLE, &key).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let updated = deps.store.update(TABLE, &key, update.into_attrs()).await?;

    Ok(ApiResponse::ok(json!({
        "message": "User updated successfully",
        "user": updated,
    })))
}

/// DELETE /smart-home/{id} - admin-only user removal.
pub async fn delete(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    req.require_admin()?;
    let user_id = req.require_path_id()?;

    let key = User::key_for(user_id);
    if deps.store.get(TABLE, &key).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    deps.store.delete(TABLE, &key).await?;

    Ok(ApiResponse::ok(json!({
        "message": "User deleted",
        "userId": user_id,
    })))
}
