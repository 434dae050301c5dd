use fale_shared::constants::endpoints;
use fale_shared::types::DailyMessage;
use fale_shared::{ClientError, Result};

use crate::http::ApiClient;

impl ApiClient {
    /// Today's devotional message; `None` when the backend has none yet.
    pub async fn daily_message_today(&self) -> Result<Option<DailyMessage>> {
        match self.get(endpoints::DAILY_MESSAGE_TODAY).await {
            Ok(message) => Ok(Some(message)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
