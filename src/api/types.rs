use serde::{Deserialize, Serialize};

/// Number of fixed carousel positions.
pub const SLOT_COUNT: u32 = 5;

pub fn is_valid_slot(slot_id: u32) -> bool {
    (1..=SLOT_COUNT).contains(&slot_id)
}

// ── Carousel types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    /// Classify an asset by file extension, the same way the repository does
    /// when a file is uploaded.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "webm" | "avi" => MediaType::Video,
            _ => MediaType::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    White,
    Outline,
}

impl ButtonStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonStyle::White => "white",
            ButtonStyle::Outline => "outline",
        }
    }
}

fn default_btn1_style() -> ButtonStyle {
    ButtonStyle::White
}

fn default_btn2_style() -> ButtonStyle {
    ButtonStyle::Outline
}

fn default_button_count() -> u8 {
    1
}

/// One carousel slot as returned by `GET /carousel/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: i64,
    pub slot_id: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subheadline: String,
    #[serde(default = "default_button_count")]
    pub button_count: u8,

    #[serde(default)]
    pub btn1_text: String,
    #[serde(default)]
    pub btn1_link: String,
    #[serde(default = "default_btn1_style")]
    pub btn1_style: ButtonStyle,

    #[serde(default)]
    pub btn2_text: String,
    #[serde(default)]
    pub btn2_link: String,
    #[serde(default = "default_btn2_style")]
    pub btn2_style: ButtonStyle,
}

/// A call-to-action button that should actually be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button<'a> {
    pub text: &'a str,
    pub link: &'a str,
    pub style: ButtonStyle,
}

impl Slide {
    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    /// Buttons within `button_count`. Fields of hidden buttons are never
    /// exposed, whatever they contain.
    pub fn visible_buttons(&self) -> Vec<Button<'_>> {
        let mut buttons = Vec::with_capacity(2);
        if self.button_count >= 1 {
            buttons.push(Button {
                text: &self.btn1_text,
                link: &self.btn1_link,
                style: self.btn1_style,
            });
        }
        if self.button_count >= 2 {
            buttons.push(Button {
                text: &self.btn2_text,
                link: &self.btn2_link,
                style: self.btn2_style,
            });
        }
        buttons
    }
}

/// A file to upload as the slot's new media.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

// ── Auth types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub username: String,
    #[serde(default)]
    pub is_coach: bool,
}
