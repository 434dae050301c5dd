use fale_shared::constants::endpoints;
use fale_shared::protocol::ProfileUpdate;
use fale_shared::types::UserProfile;
use fale_shared::validation::validate_password;
use fale_shared::Result;

use crate::http::ApiClient;

impl ApiClient {
    /// Fetch the signed-in user and remember it on the session.
    pub async fn load_profile(&self) -> Result<UserProfile> {
        let profile: UserProfile = self.get(endpoints::USERS_ME).await?;
        self.session().set_profile(Some(profile.clone()));
        Ok(profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        if let Some(password) = &update.password {
            validate_password(password)?;
        }
        let profile: UserProfile = self.put(endpoints::USERS_ME, update).await?;
        tracing::info!(user_id = profile.id, "profile updated");
        self.session().set_profile(Some(profile.clone()));
        Ok(profile)
    }
}
