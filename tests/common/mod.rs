#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use coach_portal::api::types::{AuthResponse, ButtonStyle, LoginRequest, MediaType, Slide};

pub const TOKEN: &str = "coach-access-token";
pub const PASSWORD: &str = "secret";

/// What the repository saw on the last PATCH.
#[derive(Debug, Clone, Default)]
pub struct Received {
    pub slot_id: u32,
    pub fields: HashMap<String, String>,
    pub file: Option<(String, Vec<u8>)>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct RepoState {
    pub slides: Mutex<Vec<Slide>>,
    pub gets: AtomicUsize,
    pub patches: AtomicUsize,
    pub fail_get: AtomicBool,
    pub fail_patch: AtomicBool,
    pub last_patch: Mutex<Option<Received>>,
}

impl RepoState {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn last_patch(&self) -> Received {
        self.last_patch
            .lock()
            .unwrap()
            .clone()
            .expect("no PATCH received")
    }
}

pub struct MockRepository {
    pub base_url: String,
    pub state: Arc<RepoState>,
}

pub fn slide(slot_id: u32, is_active: bool, media_type: MediaType) -> Slide {
    Slide {
        id: 100 + slot_id as i64,
        slot_id,
        is_active,
        media: Some(format!("http://media.local/slot{}", slot_id)),
        media_type,
        headline: format!("HEADLINE {}", slot_id),
        subheadline: format!("sub {}", slot_id),
        button_count: 1,
        btn1_text: "Join".to_string(),
        btn1_link: "/join".to_string(),
        btn1_style: ButtonStyle::White,
        btn2_text: "More".to_string(),
        btn2_link: "/about".to_string(),
        btn2_style: ButtonStyle::Outline,
    }
}

/// Slots 1 and 3 active, the rest switched off.
pub fn default_slides() -> Vec<Slide> {
    vec![
        slide(1, true, MediaType::Image),
        slide(2, false, MediaType::Video),
        slide(3, true, MediaType::Video),
        slide(4, false, MediaType::Image),
        slide(5, false, MediaType::Image),
    ]
}

impl MockRepository {
    pub async fn start(slides: Vec<Slide>) -> Self {
        let state = Arc::new(RepoState {
            slides: Mutex::new(slides),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/website/carousel/", get(list_slides))
            .route("/api/website/carousel/{slot_id}/", patch(update_slide))
            .route("/api/token/", post(login))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

async fn list_slides(State(state): State<Arc<RepoState>>) -> Response {
    state.gets.fetch_add(1, Ordering::SeqCst);
    if state.fail_get.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    Json(state.slides.lock().unwrap().clone()).into_response()
}

async fn update_slide(
    State(state): State<Arc<RepoState>>,
    Path(slot_id): Path<u32>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.patches.fetch_add(1, Ordering::SeqCst);

    let mut received = Received {
        slot_id,
        authorization: headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        ..Default::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(|s| s.to_string()) {
            Some(file_name) => {
                let bytes = field.bytes().await.unwrap();
                received.file = Some((file_name, bytes.to_vec()));
            }
            None => {
                let text = field.text().await.unwrap();
                received.fields.insert(name, text);
            }
        }
    }
    *state.last_patch.lock().unwrap() = Some(received.clone());

    let expected = format!("Bearer {}", TOKEN);
    if received.authorization.as_deref() != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "Given token not valid" })),
        )
            .into_response();
    }
    if state.fail_patch.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }

    let mut slides = state.slides.lock().unwrap();
    let Some(slide) = slides.iter_mut().find(|s| s.slot_id == slot_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Not found." })),
        )
            .into_response();
    };

    let fields = &received.fields;
    if let Some(v) = fields.get("is_active") {
        slide.is_active = v == "true";
    }
    if let Some(v) = fields.get("headline") {
        slide.headline = v.clone();
    }
    if let Some(v) = fields.get("subheadline") {
        slide.subheadline = v.clone();
    }
    if let Some(v) = fields.get("button_count") {
        slide.button_count = v.parse().unwrap();
    }
    if let Some(v) = fields.get("btn1_text") {
        slide.btn1_text = v.clone();
    }
    if let Some(v) = fields.get("btn2_text") {
        slide.btn2_text = v.clone();
    }
    if let Some((file_name, _)) = &received.file {
        slide.media = Some(format!("http://media.local/website/carousel/{}", file_name));
        slide.media_type = MediaType::from_file_name(file_name);
    }

    Json(slide.clone()).into_response()
}

async fn login(Json(req): Json<LoginRequest>) -> Response {
    if req.password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response();
    }
    Json(AuthResponse {
        access: TOKEN.to_string(),
        refresh: "coach-refresh-token".to_string(),
        username: req.username,
        is_coach: true,
    })
    .into_response()
}
