//! Password recovery. These calls are anonymous and bypass the gateway.

use fale_shared::constants::endpoints;
use fale_shared::protocol::{
    Acknowledgement, ForgotPasswordRequest, ResetPasswordRequest, VerifyResetTokenRequest,
    VerifyResetTokenResponse,
};
use fale_shared::validation::{validate_email, validate_password_reset};
use fale_shared::Result;

use crate::http::ApiRequest;
use crate::session::SessionStore;

impl SessionStore {
    /// Ask the backend to e-mail a reset link. Returns the server's
    /// acknowledgement text.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        validate_email(email)?;
        let request = ApiRequest::post(endpoints::AUTH_FORGOT_PASSWORD).json(
            &ForgotPasswordRequest {
                email: email.trim().to_string(),
            },
        )?;
        let ack: Acknowledgement = self
            .transport()
            .execute(&request, None)
            .await?
            .into_result()?
            .json()?;
        Ok(ack.message)
    }

    pub async fn verify_reset_token(&self, token: &str) -> Result<bool> {
        let request = ApiRequest::post(endpoints::AUTH_VERIFY_RESET_TOKEN).json(
            &VerifyResetTokenRequest {
                token: token.trim().to_string(),
            },
        )?;
        let body: VerifyResetTokenResponse = self
            .transport()
            .execute(&request, None)
            .await?
            .into_result()?
            .json()?;
        Ok(body.valid)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<String>> {
        validate_password_reset(token, password, confirm_password)?;
        let request = ApiRequest::post(endpoints::AUTH_RESET_PASSWORD).json(
            &ResetPasswordRequest {
                token: token.trim().to_string(),
                password: password.to_string(),
            },
        )?;
        let ack: Acknowledgement = self
            .transport()
            .execute(&request, None)
            .await?
            .into_result()?
            .json()?;
        tracing::info!("password reset accepted");
        Ok(ack.message)
    }
}
