use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::models::user::Claims;

// Se ejecuta ANTES de cualquier handler del panel editorial.
// Solo verifica identidad; los permisos por rol se deciden en cada
// handler con la tabla de capacidades (utils::permissions).
pub async fn auth_middleware(
    // Axum extrae automáticamente el header "Authorization: Bearer <token>"
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Obtener el token del header
    let token = auth.token();

    // 2. Obtener el secreto
    let secret = std::env::var("JWT_SECRET").map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // 3. Decodificar y verificar firma
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    );

    match token_data {
        Ok(data) => {
            // Adjuntamos claims para que los handlers sepan quién es el usuario
            request.extensions_mut().insert(data.claims);
            Ok(next.run(request).await)
        }
        Err(_) => {
            // Token falso, expirado o manipulado
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
