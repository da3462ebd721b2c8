//! Authentication middleware for JWT token validation

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, models::Permission, state::AppState};

/// Status a staff token must carry
pub const ACTIVE_STAFF: &str = "ACTIVE";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id (user or staff member)
    pub sub: Uuid,
    /// Staff role name; absent for end users
    #[serde(default)]
    pub role: Option<String>,
    /// Staff account status
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub iat: u64,
    pub exp: u64,
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// Authenticated identity injected into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Option<String>,
    pub status: Option<String>,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn is_active_staff(&self) -> bool {
        self.role.is_some() && self.status.as_deref() == Some(ACTIVE_STAFF)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.as_str())
    }

    /// End users act only on themselves; active staff on anyone
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.id == user_id || self.is_active_staff()
    }
}

/// RS256 verifier built once from the configured public key
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key: Arc::new(decoding_key),
            validation,
        })
    }

    /// Decode an access token into the identity it carries
    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Failed to validate token: {}", e);
                ApiError::Unauthorized
            })?;

        let claims = token_data.claims;
        if claims.token_type != TokenType::Access {
            warn!("Rejected {:?} token used as access token", claims.token_type);
            return Err(ApiError::Unauthorized);
        }

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
            status: claims.status,
            permissions: claims.permissions,
        })
    }
}

fn bearer(header: Option<TypedHeader<Authorization<Bearer>>>) -> Result<Bearer, ApiError> {
    header
        .map(|TypedHeader(Authorization(bearer))| bearer)
        .ok_or(ApiError::Unauthorized)
}

async fn ensure_not_revoked(state: &AppState, token: &str, user: &AuthUser) -> Result<(), ApiError> {
    let revoked = state.redis.is_token_revoked(token).await.map_err(|e| {
        error!("Failed to check token revocation: {}", e);
        ApiError::Internal("Token revocation check failed".to_string())
    })?;
    if revoked {
        warn!("Rejected revoked token for {}", user.id);
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Any valid access token
pub async fn require_user(
    State(state): State<AppState>,
    header: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = bearer(header)?;
    let user = state.verifier.verify(bearer.token())?;
    ensure_not_revoked(&state, bearer.token(), &user).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Whether a staff identity may use routes guarded by `permission`
pub fn authorize_staff(user: &AuthUser, permission: Permission) -> Result<(), ApiError> {
    if !user.is_active_staff() {
        warn!("User {} is not active staff", user.id);
        return Err(ApiError::Forbidden);
    }
    if !user.has_permission(permission) {
        warn!("Staff {} lacks the {} permission", user.id, permission);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// An access token of an active staff member granted `permission`
pub async fn require_staff(
    state: AppState,
    permission: Permission,
    header: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = bearer(header)?;
    let user = state.verifier.verify(bearer.token())?;
    authorize_staff(&user, permission)?;
    ensure_not_revoked(&state, bearer.token(), &user).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Guard every route of `router` with [`require_staff`] for `permission`
pub fn staff_only(
    router: Router<AppState>,
    state: &AppState,
    permission: Permission,
) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        state.clone(),
        move |State(state): State<AppState>,
              header: Option<TypedHeader<Authorization<Bearer>>>,
              req: Request,
              next: Next| require_staff(state, permission, header, req, next),
    ))
}
