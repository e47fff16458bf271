use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{JwtService, hash_password, validate_password, verify_password};
use chrono::Utc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt: JwtService) -> Self {
        Self { pool, jwt }
    }

    pub async fn sign_up(&self, req: &SignUpRequest) -> AppResult<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError("Invalid email".to_string()));
        }
        if req.full_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "full_name is required".to_string(),
            ));
        }
        validate_password(&req.password)?;

        let user_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&req.password)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, email, password_hash, full_name, phone, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(req.full_name.trim())
        .bind(&req.phone)
        .bind(ROLE_USER)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::from);

        if let Err(e) = result {
            if e.is_unique_violation() {
                return Err(AppError::ValidationError(
                    "Email already registered".to_string(),
                ));
            }
            return Err(e);
        }

        let profile = self.load_profile(&user_id).await?;
        self.issue_tokens(profile)
    }

    pub async fn sign_in(&self, req: &SignInRequest) -> AppResult<AuthResponse> {
        let email = req.email.trim().to_lowercase();

        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&req.password, &profile.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid email or password".to_string(),
            ));
        }

        self.issue_tokens(profile)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self.jwt.verify_refresh_token(refresh_token)?;
        // Profile must still exist; a deleted account cannot refresh.
        let profile = self.load_profile(&claims.sub).await?;
        self.jwt
            .generate_access_token(&profile.user_id, &profile.email)
    }

    pub async fn get_profile(&self, user_id: &str) -> AppResult<Profile> {
        self.load_profile(user_id).await
    }

    /// The single authorization guard for every /admin route: the caller
    /// must hold the admin role in their profile row.
    pub async fn require_admin(&self, user_id: &str) -> AppResult<Profile> {
        let profile = self.load_profile(user_id).await?;
        if !profile.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(profile)
    }

    async fn load_profile(&self, user_id: &str) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))
    }

    fn issue_tokens(&self, profile: Profile) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt
            .generate_access_token(&profile.user_id, &profile.email)?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&profile.user_id, &profile.email)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserResponse::from(profile),
        })
    }
}
