use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use std::sync::OnceLock;

use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, require_credentials},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::AuthUser,
    models::User,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid username/password";

static DUMMY_PASSWORD_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash checked for unknown usernames so both login failures cost one argon2 run.
fn dummy_password_hash() -> Option<&'static str> {
    DUMMY_PASSWORD_HASH
        .get_or_init(|| hash_password("shopeasy-unknown-user").ok())
        .as_deref()
}

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<User> {
    let RegisterRequest { username, password } = payload;
    require_credentials(&username, &password)?;

    let exist = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        username: Set(username),
        password_hash: Set(password_hash),
        token: Set(None),
        cart_id: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        // Lost a race with a concurrent registration of the same name.
        if is_unique_violation(&err) {
            AppError::Conflict("Username already exists".to_string())
        } else {
            AppError::from(err)
        }
    })?;

    tracing::info!(user_id = user.id, "user registered");
    Ok(user_from_entity(user))
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let LoginRequest { username, password } = payload;
    require_credentials(&username, &password)?;

    let user = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            if let Some(hash) = dummy_password_hash() {
                let _ = verify_password(&password, hash);
            }
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = state.tokens.issue(user.id)?;

    // The stored copy is informational; validity comes from signature and expiry.
    Users::update_many()
        .col_expr(UserCol::Token, Expr::value(token.clone()))
        .filter(UserCol::Id.eq(user.id))
        .exec(&state.orm)
        .await?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    })
}

/// Resolve a bearer token to the acting user.
pub fn authenticate(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let user_id = state.tokens.verify(token)?;
    Ok(AuthUser { user_id })
}

pub async fn list_users(state: &AppState) -> AppResult<Vec<User>> {
    let users = Users::find()
        .order_by_asc(UserCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    Ok(users)
}

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::{dummy_password_hash, hash_password, verify_password};

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let hash = dummy_password_hash().expect("dummy hash");
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("password", hash).unwrap());
        assert_eq!(dummy_password_hash(), Some(hash));
    }

    #[test]
    fn verifies_only_the_original_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
