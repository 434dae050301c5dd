use fale_shared::constants::endpoints;
use fale_shared::types::{Note, NoteId, NoteInput};
use fale_shared::{ClientError, Result, ValidationError};

use crate::http::ApiClient;

pub struct NoteManager {
    api: ApiClient,
    notes: Vec<Note>,
}

impl NoteManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            notes: Vec::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub async fn refresh(&mut self) -> Result<&[Note]> {
        self.notes = self.api.get(endpoints::NOTES).await?;
        tracing::debug!(count = self.notes.len(), "loaded notes");
        Ok(&self.notes)
    }

    /// The handful of most recent notes. Does not touch the loaded list.
    pub async fn recent(&self) -> Result<Vec<Note>> {
        self.api.get(endpoints::NOTES_RECENT).await
    }

    pub async fn create(&mut self, input: &NoteInput) -> Result<Note> {
        if input.content.trim().is_empty() {
            return Err(ValidationError::MissingField("content").into());
        }
        let created: Note = self.api.post(endpoints::NOTES, input).await?;
        tracing::info!(note_id = %created.id, "note created");

        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: NoteId, input: &NoteInput) -> Result<Note> {
        if input.content.trim().is_empty() {
            return Err(ValidationError::MissingField("content").into());
        }
        let updated: Note = self.api.put(&endpoints::note(id.0), input).await?;
        tracing::info!(note_id = %id, "note updated");

        self.refresh().await?;
        Ok(updated)
    }

    /// Flip the favourite flag of a note from the loaded list.
    pub async fn toggle_favorite(&mut self, id: NoteId) -> Result<Note> {
        let Some(note) = self.notes.iter().find(|n| n.id == id) else {
            return Err(ClientError::NotFound {
                message: format!("Note {id} is not in the loaded list"),
            });
        };
        let input = NoteInput {
            title: note.title.clone(),
            content: note.content.clone(),
            is_favorite: Some(!note.is_favorite),
            daily_message_id: note.daily_message_id,
        };
        self.update(id, &input).await
    }

    pub async fn delete(&mut self, id: NoteId) -> Result<()> {
        self.api.delete(&endpoints::note(id.0)).await?;
        tracing::info!(note_id = %id, "note deleted");

        self.refresh().await?;
        Ok(())
    }
}
