use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::{
    db::DbPool,
    error::ApiError,
    models::user::{AuthResponse, Claims, LoginPayload, RegisterPayload, User},
    utils::security::{hash_password, verify_password},
};

const VALID_ROLES: [&str; 3] = ["admin", "editor", "writer"];

// POST /api/auth/register (Solo admins; el primer usuario se permite sin token y queda como admin)
pub async fn register_handler(
    State(pool): State<DbPool>,
    // Token opcional: si ya existe un usuario, exigimos que sea admin
    maybe_auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // Contamos usuarios existentes para decidir si es bootstrap
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;

    // Si ya hay usuarios, exigimos token admin
    if user_count > 0 {
        let TypedHeader(auth_header) = maybe_auth.ok_or(ApiError::Unauthorized)?;

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| ApiError::Internal("JWT_SECRET no está configurado"))?;
        let token_data = jsonwebtoken::decode::<Claims>(
            auth_header.token(),
            &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
            &jsonwebtoken::Validation::default(),
        )
        .map_err(|_| ApiError::Unauthorized)?;

        let claims = token_data.claims;
        if claims.role != "admin" && !claims.is_superuser {
            return Err(ApiError::Forbidden("only an admin can create users"));
        }
    }

    // Rol: el primer usuario se vuelve admin automáticamente
    let role = if user_count == 0 {
        "admin".to_string()
    } else {
        let role = payload.role.unwrap_or_else(|| "writer".to_string());
        if !VALID_ROLES.contains(&role.as_str()) {
            return Err(ApiError::validation(
                "role",
                "must be one of: admin, editor, writer",
            ));
        }
        role
    };

    // Hashear la contraseña (nunca guardarla plana)
    let hashed_password = hash_password(&payload.password)
        .map_err(|_| ApiError::validation("password", "could not hash password"))?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, role, is_superuser)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, username, email, password_hash, role, is_superuser",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&role)
    .bind(user_count == 0) // El primer usuario también es superusuario
    .fetch_one(&pool)
    .await
    .map_err(|e| ApiError::on_unique(e, "email", "username or email already exists"))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/auth/login
pub async fn login_handler(
    State(pool): State<DbPool>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Buscar usuario por email
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, is_superuser FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::Unauthorized)?;

    // 2. Verificar contraseña (Argon2)
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    // 3. Generar JWT Token (24 horas de vida)
    let now = Utc::now();
    let expiration = now + Duration::hours(24);

    let claims = Claims {
        sub: user.email.clone(),
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
        user_id: user.id,
        role: user.role,
        is_superuser: user.is_superuser,
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| ApiError::Internal("JWT_SECRET no está configurado"))?;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal("no se pudo firmar el token"))?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
        }),
    ))
}
