use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::oauth2_token::OAuthToken;
use crate::entities::{prelude::*, *};
use crate::models::{AccountResponse, SocialResponse, UserResponse, format_timestamp};
use crate::services::email_check::{Deliverability, EmailDeliverability};
use crate::services::media_lifecycle::{MediaLifecycleService, PurgeReport};
use crate::services::media_store::MediaStore;
use crate::services::recaptcha::CaptchaVerifier;
use crate::utils::auth::{Claims, create_jwt};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{FormErrors, LoginForm, RegistrationForm};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub const INVALID_CREDENTIALS: &str = "Invalid Username or Password";
pub const ACCOUNT_DISABLED: &str = "Account is disabled";
pub const USERNAME_TAKEN: &str = "Username already taken";
pub const EMAIL_TAKEN: &str = "Email address already taken";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialRequest {
    pub social_type: String,
    pub url: String,
}

/// Registration, login and everything else hanging off a `user` row.
pub struct AccountService {
    db: DatabaseConnection,
    config: AppConfig,
    media: MediaStore,
    email_checker: Arc<dyn EmailDeliverability>,
    captcha: Option<Arc<dyn CaptchaVerifier>>,
}

impl AccountService {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        media: MediaStore,
        email_checker: Arc<dyn EmailDeliverability>,
        captcha: Option<Arc<dyn CaptchaVerifier>>,
    ) -> Self {
        Self {
            db,
            config,
            media,
            email_checker,
            captcha,
        }
    }

    /// Whether registration currently demands a reCAPTCHA response.
    pub fn captcha_required(&self) -> bool {
        self.captcha.is_some()
    }

    /// Site key the front-end renders the widget with, when one is needed.
    pub fn recaptcha_site_key(&self) -> Option<&str> {
        if self.captcha_required() {
            self.config.recaptcha_site_key.as_deref()
        } else {
            None
        }
    }

    // Registration

    /// Runs every registration check and collects the failures per field.
    /// Expects a form that has already been through [`RegistrationForm::normalized`].
    pub async fn validate_registration(
        &self,
        form: &RegistrationForm,
        remote_ip: Option<&str>,
    ) -> Result<FormErrors, AppError> {
        let mut errors = form.validate_fields();

        if !form.username.is_empty()
            && User::find()
                .filter(user::Column::Username.eq(form.username.as_str()))
                .one(&self.db)
                .await?
                .is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }

        if !form.email.is_empty() {
            if User::find()
                .filter(user::Column::Email.eq(form.email.as_str()))
                .one(&self.db)
                .await?
                .is_some()
            {
                errors.add("email", EMAIL_TAKEN);
            }

            // Malformed addresses already carry a field error
            if errors.get("email").is_empty()
                && let Deliverability::Undeliverable { reason } =
                    self.email_checker.check(&form.email).await
            {
                tracing::debug!("Rejected email {}: {}", form.email, reason);
                errors.add("email", reason);
            }
        }

        if let Some(captcha) = &self.captcha {
            match form.recaptcha_response.as_deref().map(str::trim) {
                None | Some("") => {
                    errors.add("g-recaptcha-response", "The response parameter is missing.");
                }
                Some(response) => match captcha.verify(response, remote_ip).await {
                    Ok(true) => {}
                    Ok(false) => {
                        errors.add(
                            "g-recaptcha-response",
                            "The response parameter is invalid or malformed.",
                        );
                    }
                    Err(e) => {
                        tracing::error!("reCAPTCHA verification failed: {:?}", e);
                        errors.add(
                            "g-recaptcha-response",
                            "Could not verify the reCAPTCHA response.",
                        );
                    }
                },
            }
        }

        Ok(errors)
    }

    pub async fn register(
        &self,
        form: RegistrationForm,
        remote_ip: Option<&str>,
    ) -> Result<user::Model, AppError> {
        let form = form.normalized();
        self.validate_registration(&form, remote_ip)
            .await?
            .into_result()?;

        let password_hash = hash_password(&form.password)?;

        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            uuid: Set(Some(Uuid::new_v4().to_string())),
            username: Set(Some(form.username.clone())),
            email: Set(Some(form.email.clone())),
            fs_uniquifier: Set(Some(Uuid::new_v4().simple().to_string())),
            password: Set(Some(password_hash)),
            active: Set(Some(true)),
            login_count: Set(Some(0)),
            auth_type: Set(Some(user::AUTH_TYPE_LOCAL)),
            email_video: Set(Some(true)),
            email_stream: Set(Some(true)),
            email_message: Set(Some(true)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent registration
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Username or email address already taken".to_string())
            }
            _ => AppError::from(e),
        })?;

        let default_roles = Role::find()
            .filter(role::Column::IsDefault.eq(true))
            .all(&txn)
            .await?;
        for r in &default_roles {
            roles_users::ActiveModel {
                user_id: Set(Some(new_user.id)),
                role_id: Set(Some(r.id)),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        tracing::info!(
            "👤 Registered user {} ({} default role(s))",
            form.username,
            default_roles.len()
        );
        Ok(new_user)
    }

    // Login

    /// Local accounts only: username first, then email.
    pub async fn find_local_account(&self, identifier: &str) -> Result<Option<user::Model>, AppError> {
        if identifier.is_empty() {
            return Ok(None);
        }

        let local = user::Column::AuthType.eq(user::AUTH_TYPE_LOCAL);

        let by_username = User::find()
            .filter(user::Column::Username.eq(identifier))
            .filter(local.clone())
            .one(&self.db)
            .await?;
        if by_username.is_some() {
            return Ok(by_username);
        }

        Ok(User::find()
            .filter(user::Column::Email.eq(identifier))
            .filter(local)
            .one(&self.db)
            .await?)
    }

    /// Resolves the login form to an account without side effects.
    pub async fn authenticate(&self, form: &LoginForm) -> Result<user::Model, AppError> {
        let Some(account) = self.find_local_account(form.identifier()).await? else {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let stored = account.password.as_deref().unwrap_or_default();
        if form.password.is_empty() || !verify_password(&form.password, stored) {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !account.is_active() {
            return Err(AppError::Forbidden(ACCOUNT_DISABLED.to_string()));
        }

        Ok(account)
    }

    pub async fn login(
        &self,
        form: &LoginForm,
        remote_ip: Option<&str>,
    ) -> Result<LoginResponse, AppError> {
        let account = self.authenticate(form).await?;
        let account = self.record_login(account, remote_ip).await?;

        let fsu = account.fs_uniquifier.as_deref().unwrap_or_default();
        let token = create_jwt(
            account.id,
            fsu,
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
        )?;

        tracing::info!("🔑 User {} logged in", account.id);
        Ok(LoginResponse {
            token,
            user: self.profile(&account).await?,
        })
    }

    async fn record_login(
        &self,
        account: user::Model,
        remote_ip: Option<&str>,
    ) -> Result<user::Model, AppError> {
        let previous_at = account.current_login_at;
        let previous_ip = account.current_login_ip.clone();
        let count = account.login_count.unwrap_or(0);

        let mut active: user::ActiveModel = account.into();
        active.last_login_at = Set(previous_at);
        active.last_login_ip = Set(previous_ip);
        active.current_login_at = Set(Some(Utc::now()));
        active.current_login_ip = Set(remote_ip.map(str::to_string));
        active.login_count = Set(Some(count + 1));

        Ok(active.update(&self.db).await?)
    }

    /// Checks a decoded token against the current account state.
    pub async fn verify_session(&self, claims: &Claims) -> Result<user::Model, AppError> {
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        let account = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        if account.fs_uniquifier.as_deref() != Some(claims.fsu.as_str()) {
            return Err(AppError::Unauthorized("Session has been revoked".to_string()));
        }
        if !account.is_active() {
            return Err(AppError::Forbidden(ACCOUNT_DISABLED.to_string()));
        }

        Ok(account)
    }

    /// Rotates `fs_uniquifier`, which invalidates every token issued so far.
    pub async fn revoke_sessions(&self, user_id: i32) -> Result<(), AppError> {
        let account = self.get_user(user_id).await?;
        let mut active: user::ActiveModel = account.into();
        active.fs_uniquifier = Set(Some(Uuid::new_v4().simple().to_string()));
        active.update(&self.db).await?;

        tracing::info!("🔒 Sessions revoked for user {}", user_id);
        Ok(())
    }

    // Lookups and serialization

    pub async fn get_user(&self, user_id: i32) -> Result<user::Model, AppError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<user::Model, AppError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn profile(&self, account: &user::Model) -> Result<UserResponse, AppError> {
        let channels = account
            .find_related(Channel)
            .order_by_asc(channel::Column::Id)
            .all(&self.db)
            .await?;
        Ok(UserResponse::new(account, &channels))
    }

    pub async fn roles(&self, user_id: i32) -> Result<Vec<role::Model>, AppError> {
        let account = self.get_user(user_id).await?;
        Ok(account
            .find_related(Role)
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn account(&self, account: &user::Model) -> Result<AccountResponse, AppError> {
        let role_models = self.roles(account.id).await?;
        let permissions: BTreeSet<String> = role_models
            .iter()
            .flat_map(role::Model::permission_list)
            .collect();
        let roles = role_models.into_iter().filter_map(|r| r.name).collect();

        let socials = self
            .socials(account.id)
            .await?
            .iter()
            .map(SocialResponse::from)
            .collect();

        let deletion_scheduled_at = self
            .deletion_flag(account.id)
            .await?
            .and_then(|f| f.timestamp)
            .as_ref()
            .map(format_timestamp);

        Ok(AccountResponse {
            profile: self.profile(account).await?,
            email: account.email.clone(),
            roles,
            permissions: permissions.into_iter().collect(),
            socials,
            deletion_scheduled_at,
        })
    }

    // Social links

    pub async fn socials(&self, user_id: i32) -> Result<Vec<user_social::Model>, AppError> {
        Ok(UserSocial::find()
            .filter(user_social::Column::UserId.eq(user_id))
            .order_by_asc(user_social::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn add_social(
        &self,
        user_id: i32,
        req: SocialRequest,
    ) -> Result<user_social::Model, AppError> {
        let social_type = req.social_type.trim();
        let url = req.url.trim();

        let mut errors = FormErrors::new();
        if social_type.is_empty() {
            errors.add("socialType", "Social network not provided");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.add("url", "URL must start with http:// or https://");
        }
        errors.into_result()?;

        Ok(user_social::ActiveModel {
            user_id: Set(Some(user_id)),
            social_type: Set(Some(social_type.to_string())),
            url: Set(Some(url.to_string())),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn remove_social(&self, user_id: i32, social_id: i32) -> Result<(), AppError> {
        let result = UserSocial::delete_many()
            .filter(user_social::Column::Id.eq(social_id))
            .filter(user_social::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Social link not found".to_string()));
        }
        Ok(())
    }

    // OAuth tokens

    /// One token per (user, provider); a newer token replaces the stored one.
    pub async fn store_oauth_token(
        &self,
        user_id: i32,
        provider: &str,
        token: OAuthToken,
    ) -> Result<oauth2_token::Model, AppError> {
        let existing = OAuth2Token::find()
            .filter(oauth2_token::Column::User.eq(user_id))
            .filter(oauth2_token::Column::Name.eq(provider))
            .one(&self.db)
            .await?;

        let Some(existing) = existing else {
            return Ok(oauth2_token::ActiveModel {
                user: Set(Some(user_id)),
                name: Set(Some(provider.to_string())),
                token_type: Set(token.token_type),
                access_token: Set(token.access_token),
                refresh_token: Set(token.refresh_token),
                expires_at: Set(token.expires_at),
                ..Default::default()
            }
            .insert(&self.db)
            .await?);
        };

        let mut active: oauth2_token::ActiveModel = existing.into();
        active.token_type = Set(token.token_type);
        active.access_token = Set(token.access_token);
        active.refresh_token = Set(token.refresh_token);
        active.expires_at = Set(token.expires_at);
        Ok(active.update(&self.db).await?)
    }

    pub async fn oauth_token(
        &self,
        user_id: i32,
        provider: &str,
    ) -> Result<Option<OAuthToken>, AppError> {
        Ok(OAuth2Token::find()
            .filter(oauth2_token::Column::User.eq(user_id))
            .filter(oauth2_token::Column::Name.eq(provider))
            .one(&self.db)
            .await?
            .map(|t| t.to_token()))
    }

    // Guests

    /// Refreshes a known guest, or creates one (with a fresh UUID when none is given).
    pub async fn touch_guest(
        &self,
        guest_uuid: Option<&str>,
        remote_ip: Option<&str>,
    ) -> Result<guest::Model, AppError> {
        let guest_uuid = guest_uuid.map(str::trim).filter(|u| !u.is_empty());

        if let Some(uuid) = guest_uuid
            && let Some(existing) = Guest::find()
                .filter(guest::Column::GuestUuid.eq(uuid))
                .one(&self.db)
                .await?
        {
            let mut active: guest::ActiveModel = existing.into();
            active.last_active_at = Set(Some(Utc::now()));
            active.last_active_ip = Set(remote_ip.map(str::to_string));
            return Ok(active.update(&self.db).await?);
        }

        let uuid = guest_uuid
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created = guest::new_guest(&uuid, remote_ip.map(str::to_string))
            .insert(&self.db)
            .await?;
        tracing::debug!("New guest {}", uuid);
        Ok(created)
    }

    // Deletion

    pub async fn deletion_flag(
        &self,
        user_id: i32,
    ) -> Result<Option<users_flagged_for_deletion::Model>, AppError> {
        Ok(UsersFlaggedForDeletion::find()
            .filter(users_flagged_for_deletion::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    /// Schedules the account for purging. Flagging twice keeps the first date.
    pub async fn flag_for_deletion(
        &self,
        user_id: i32,
    ) -> Result<users_flagged_for_deletion::Model, AppError> {
        if let Some(existing) = self.deletion_flag(user_id).await? {
            return Ok(existing);
        }

        let flag = users_flagged_for_deletion::new_flag(user_id)
            .insert(&self.db)
            .await?;
        tracing::info!(
            "🗓️  User {} flagged for deletion at {:?}",
            user_id,
            flag.timestamp
        );
        Ok(flag)
    }

    /// Returns whether a pending deletion was cancelled.
    pub async fn cancel_deletion(&self, user_id: i32) -> Result<bool, AppError> {
        let result = UsersFlaggedForDeletion::delete_many()
            .filter(users_flagged_for_deletion::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Purges every account whose deletion date has passed. One failing
    /// account does not stop the others.
    pub async fn purge_due_accounts(&self) -> anyhow::Result<Vec<PurgeReport>> {
        let due = UsersFlaggedForDeletion::find()
            .filter(users_flagged_for_deletion::Column::Timestamp.lte(Utc::now()))
            .all(&self.db)
            .await?;

        let mut reports = Vec::new();
        for flag in due {
            let Some(user_id) = flag.user_id else {
                flag.delete(&self.db).await?;
                continue;
            };

            match MediaLifecycleService::purge_user(&self.db, &self.media, user_id).await {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Failed to purge user {}: {:?}", user_id, e),
            }
        }

        Ok(reports)
    }
}
