use std::sync::Arc;

use uuid::Uuid;

use crate::api::types::{is_valid_slot, ButtonStyle, MediaType, MediaUpload, Slide};
use crate::auth::session::TokenSource;
use crate::error::SaveError;

use super::store::SlideStore;

const MAX_HEADLINE: usize = 100;
const MAX_SUBHEADLINE: usize = 200;
const MAX_BUTTON_TEXT: usize = 50;
const MAX_BUTTON_LINK: usize = 200;

/// Editable copy of one slot. Fields of hidden buttons are kept so that
/// raising `button_count` again brings them back, but they are never sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub slot_id: u32,
    pub is_active: bool,
    pub headline: String,
    pub subheadline: String,
    pub button_count: u8,
    pub btn1_text: String,
    pub btn1_link: String,
    pub btn1_style: ButtonStyle,
    pub btn2_text: String,
    pub btn2_link: String,
    pub btn2_style: ButtonStyle,
    /// Media currently stored for the slot. Read-only here; replace it with
    /// [`EditWorkflow::stage_media_replacement`].
    pub media: Option<String>,
    pub media_type: MediaType,
}

impl Draft {
    /// Template for a slot the repository has no record of yet.
    pub fn empty(slot_id: u32) -> Self {
        Self {
            slot_id,
            is_active: false,
            headline: String::new(),
            subheadline: String::new(),
            button_count: 1,
            btn1_text: String::new(),
            btn1_link: String::new(),
            btn1_style: ButtonStyle::White,
            btn2_text: String::new(),
            btn2_link: String::new(),
            btn2_style: ButtonStyle::Outline,
            media: None,
            media_type: MediaType::Image,
        }
    }

    pub fn from_slide(slide: &Slide) -> Self {
        Self {
            slot_id: slide.slot_id,
            is_active: slide.is_active,
            headline: slide.headline.clone(),
            subheadline: slide.subheadline.clone(),
            button_count: slide.button_count,
            btn1_text: slide.btn1_text.clone(),
            btn1_link: slide.btn1_link.clone(),
            btn1_style: slide.btn1_style,
            btn2_text: slide.btn2_text.clone(),
            btn2_link: slide.btn2_link.clone(),
            btn2_style: slide.btn2_style,
            media: slide.media.clone(),
            media_type: slide.media_type,
        }
    }

    /// Whether the fields of button `n` (1 or 2) are in use.
    pub fn shows_button(&self, n: u8) -> bool {
        n >= 1 && self.button_count >= n
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if !is_valid_slot(self.slot_id) {
            return Err(SaveError::InvalidSlot(self.slot_id));
        }
        if self.button_count > 2 {
            return Err(SaveError::Validation(format!(
                "button_count must be 0, 1 or 2 (got {})",
                self.button_count
            )));
        }

        let mut checks = vec![
            ("headline", &self.headline, MAX_HEADLINE),
            ("subheadline", &self.subheadline, MAX_SUBHEADLINE),
        ];
        if self.shows_button(1) {
            checks.push(("btn1_text", &self.btn1_text, MAX_BUTTON_TEXT));
            checks.push(("btn1_link", &self.btn1_link, MAX_BUTTON_LINK));
        }
        if self.shows_button(2) {
            checks.push(("btn2_text", &self.btn2_text, MAX_BUTTON_TEXT));
            checks.push(("btn2_link", &self.btn2_link, MAX_BUTTON_LINK));
        }
        for (name, value, max) in checks {
            let len = value.chars().count();
            if len > max {
                return Err(SaveError::Validation(format!(
                    "{} is {} characters long (max {})",
                    name, len, max
                )));
            }
        }
        Ok(())
    }

    /// Scalar fields as multipart text values. Button fields beyond
    /// `button_count` are left out; media and media_type are owned by the
    /// repository.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("slot_id", self.slot_id.to_string()),
            ("is_active", self.is_active.to_string()),
            ("headline", self.headline.clone()),
            ("subheadline", self.subheadline.clone()),
            ("button_count", self.button_count.to_string()),
        ];
        if self.shows_button(1) {
            fields.push(("btn1_text", self.btn1_text.clone()));
            fields.push(("btn1_link", self.btn1_link.clone()));
            fields.push(("btn1_style", self.btn1_style.as_str().to_string()));
        }
        if self.shows_button(2) {
            fields.push(("btn2_text", self.btn2_text.clone()));
            fields.push(("btn2_link", self.btn2_link.clone()));
            fields.push(("btn2_style", self.btn2_style.as_str().to_string()));
        }
        fields
    }
}

/// A replacement asset held locally until commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedMedia {
    pub upload: MediaUpload,
    pub media_type: MediaType,
    /// Local handle for showing the file before it is uploaded.
    pub preview: String,
}

impl StagedMedia {
    pub fn new(file_name: &str, bytes: Vec<u8>, mime: Option<&str>) -> Result<Self, SaveError> {
        if file_name.trim().is_empty() {
            return Err(SaveError::Media("file name is empty".to_string()));
        }
        if bytes.is_empty() {
            return Err(SaveError::Media(format!("{} is empty", file_name)));
        }

        let media_type = MediaType::from_file_name(file_name);
        let mime = mime
            .map(|m| m.to_string())
            .unwrap_or_else(|| guess_mime(file_name).to_string());

        Ok(Self {
            upload: MediaUpload {
                file_name: file_name.to_string(),
                mime,
                bytes,
            },
            media_type,
            preview: format!("blob:{}", Uuid::new_v4()),
        })
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, SaveError> {
        let bytes = std::fs::read(path)
            .map_err(|e| SaveError::Media(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(&file_name, bytes, None)
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// One-slot-at-a-time editing session. Switching slots drops the unsaved
/// draft without asking.
pub struct EditWorkflow {
    store: Arc<SlideStore>,
    tokens: Arc<dyn TokenSource>,
    selected_slot: u32,
    draft: Option<Draft>,
    staged: Option<StagedMedia>,
    open: bool,
}

impl EditWorkflow {
    pub fn new(store: Arc<SlideStore>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            store,
            tokens,
            selected_slot: 1,
            draft: None,
            staged: None,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_slot(&self) -> u32 {
        self.selected_slot
    }

    /// Open the session on the last selected slot (slot 1 at first).
    pub async fn open(&mut self) -> &Draft {
        self.open = true;
        let slot_id = self.selected_slot;
        self.load_draft(slot_id).await
    }

    /// Close without saving; the draft and any staged file are discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.draft = None;
        self.staged = None;
    }

    pub async fn select_slot(&mut self, slot_id: u32) -> Result<&Draft, SaveError> {
        if !is_valid_slot(slot_id) {
            return Err(SaveError::InvalidSlot(slot_id));
        }
        if self.draft.is_some() && self.selected_slot != slot_id {
            log::debug!(
                "editor: dropping unsaved draft for slot {}",
                self.selected_slot
            );
        }
        self.open = true;
        self.selected_slot = slot_id;
        Ok(self.load_draft(slot_id).await)
    }

    async fn load_draft(&mut self, slot_id: u32) -> &Draft {
        let snapshot = self.store.snapshot().await;
        let draft = match snapshot.slide_for_slot(slot_id) {
            Some(slide) => Draft::from_slide(slide),
            None => Draft::empty(slot_id),
        };
        self.staged = None;
        self.draft.insert(draft)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.draft.as_mut()
    }

    /// Hold a file for upload on the next commit. Returns the preview handle.
    pub fn stage_media_replacement(&mut self, media: StagedMedia) -> &str {
        log::debug!(
            "editor: staged {} ({} bytes) for slot {}",
            media.upload.file_name,
            media.upload.bytes.len(),
            self.selected_slot
        );
        &self.staged.insert(media).preview
    }

    pub fn clear_staged_media(&mut self) {
        self.staged = None;
    }

    pub fn staged_media(&self) -> Option<&StagedMedia> {
        self.staged.as_ref()
    }

    /// Media kind the preview should render: the staged file if any, the
    /// stored media otherwise.
    pub fn preview_media_type(&self) -> Option<MediaType> {
        match (&self.staged, &self.draft) {
            (Some(staged), _) => Some(staged.media_type),
            (None, Some(draft)) if draft.media.is_some() => Some(draft.media_type),
            _ => None,
        }
    }

    /// Send the draft (and staged file) to the repository, then reload the
    /// slide set and close. On any error the session stays open with the
    /// draft untouched.
    pub async fn commit(&mut self) -> Result<Slide, SaveError> {
        let draft = self.draft.as_ref().ok_or(SaveError::NoSlotSelected)?;
        draft.validate()?;

        let token = self
            .tokens
            .access_token()
            .filter(|t| !t.is_empty())
            .ok_or(SaveError::NotAuthenticated)?;

        let slot_id = draft.slot_id;
        let updated = match self
            .store
            .save_slot(
                &token,
                slot_id,
                draft.form_fields(),
                self.staged.as_ref().map(|s| &s.upload),
            )
            .await
        {
            Ok(slide) => slide,
            Err(e) => {
                log::error!("Failed to save slot {}: {}", slot_id, e);
                return Err(e);
            }
        };
        log::info!("Slot {} saved", slot_id);

        // The save went through; a failed reload is reported by the store
        // and leaves the previous set on screen.
        if let Err(e) = self.store.load().await {
            log::warn!("Reload after saving slot {} failed: {}", slot_id, e);
        }

        self.close();
        Ok(updated)
    }
}
