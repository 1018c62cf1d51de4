use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::api::types::Slide;
use crate::error::CarouselStopped;

use super::playback::{PlaybackEngine, PlaybackToken, Schedule, Transition};
use super::store::{SlideSnapshot, SlideStore, StoreEvent};

#[derive(Debug, Clone)]
pub enum CarouselEvent {
    Loading,
    SlideChanged {
        index: usize,
        slide: Slide,
        token: PlaybackToken,
    },
    /// The video on screen survived a reload. Update text and buttons, keep
    /// the playback position.
    SlideRefreshed {
        index: usize,
        slide: Slide,
        token: PlaybackToken,
    },
    PlaybackToggled {
        playing: bool,
    },
    /// No active slides. Callers should offer the editor here instead of an
    /// empty hero.
    Empty,
    LoadFailed(String),
}

#[derive(Debug, Clone)]
pub struct PlaybackStatus {
    pub current_index: Option<usize>,
    pub slide: Option<Slide>,
    pub is_playing: bool,
    pub active_count: usize,
    pub token: PlaybackToken,
}

enum Command {
    Select(usize),
    VideoEnded(PlaybackToken),
    SetPlaying(Option<bool>),
    Reload,
    Status(oneshot::Sender<PlaybackStatus>),
    Shutdown,
}

/// Unstarted carousel. Subscribe before [`Carousel::spawn`] to see the first
/// slide change.
pub struct Carousel {
    store: Arc<SlideStore>,
    image_interval: Duration,
    events: broadcast::Sender<CarouselEvent>,
}

impl Carousel {
    pub fn new(store: Arc<SlideStore>, image_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            image_interval,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    /// Start the event loop on the current tokio runtime. If the store has
    /// never been loaded, the first load is issued right away.
    pub fn spawn(self) -> CarouselHandle {
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let handle = CarouselHandle {
            commands: commands_tx,
            events: self.events.clone(),
        };

        let runner = Runner {
            engine: PlaybackEngine::new(self.image_interval),
            store: self.store,
            events: self.events,
            deadline: None,
        };
        tokio::spawn(runner.run(commands_rx));

        handle
    }
}

#[derive(Clone)]
pub struct CarouselHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<CarouselEvent>,
}

impl CarouselHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    pub async fn select(&self, index: usize) -> Result<(), CarouselStopped> {
        self.send(Command::Select(index)).await
    }

    /// Report that the video shown under `token` played to the end.
    pub async fn video_ended(&self, token: PlaybackToken) -> Result<(), CarouselStopped> {
        self.send(Command::VideoEnded(token)).await
    }

    pub async fn toggle_play(&self) -> Result<(), CarouselStopped> {
        self.send(Command::SetPlaying(None)).await
    }

    pub async fn play(&self) -> Result<(), CarouselStopped> {
        self.send(Command::SetPlaying(Some(true))).await
    }

    pub async fn pause(&self) -> Result<(), CarouselStopped> {
        self.send(Command::SetPlaying(Some(false))).await
    }

    pub async fn reload(&self) -> Result<(), CarouselStopped> {
        self.send(Command::Reload).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus, CarouselStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| CarouselStopped)
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, cmd: Command) -> Result<(), CarouselStopped> {
        self.commands.send(cmd).await.map_err(|_| CarouselStopped)
    }
}

struct Runner {
    engine: PlaybackEngine,
    store: Arc<SlideStore>,
    events: broadcast::Sender<CarouselEvent>,
    /// The single pending image timer. Replaced on every slide entry, which
    /// cancels the previous one.
    deadline: Option<(PlaybackToken, Instant)>,
}

impl Runner {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut store_rx = self.store.subscribe();

        let snapshot = self.store.snapshot().await;
        if snapshot.is_loaded() {
            self.on_snapshot(&snapshot);
        } else {
            self.spawn_reload();
        }

        log::debug!("carousel loop started");
        loop {
            let wake = self.deadline;
            let timer = async move {
                match wake {
                    Some((token, at)) => {
                        sleep_until(at).await;
                        token
                    }
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.on_command(cmd),
                },
                event = store_rx.recv() => match event {
                    Ok(StoreEvent::Replaced(snapshot)) => self.on_snapshot(&snapshot),
                    Ok(StoreEvent::LoadFailed(e)) => {
                        let _ = self.events.send(CarouselEvent::LoadFailed(e.to_string()));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("carousel lagged {} store events, resyncing", skipped);
                        let snapshot = self.store.snapshot().await;
                        self.on_snapshot(&snapshot);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                token = timer => {
                    self.deadline = None;
                    let transition = self.engine.on_timer(token);
                    self.publish(transition);
                }
            }
        }
        log::debug!("carousel loop ended");
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Select(index) => {
                let transition = self.engine.select(index);
                self.publish(transition);
            }
            Command::VideoEnded(token) => {
                let transition = self.engine.on_video_ended(token);
                self.publish(transition);
            }
            Command::SetPlaying(wanted) => {
                let result = match wanted {
                    Some(playing) => self.engine.set_playing(playing),
                    None => self.engine.toggle_play(),
                };
                if let Some(playing) = result {
                    let _ = self.events.send(CarouselEvent::PlaybackToggled { playing });
                }
            }
            Command::Reload => self.spawn_reload(),
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => {}
        }
    }

    fn on_snapshot(&mut self, snapshot: &SlideSnapshot) {
        let transition = self.engine.set_active(snapshot.active.clone());
        self.publish(transition);
    }

    /// Reloads run beside the loop; the result comes back through the
    /// store's change feed.
    fn spawn_reload(&self) {
        let _ = self.events.send(CarouselEvent::Loading);
        let store = self.store.clone();
        tokio::spawn(async move {
            let _ = store.load().await;
        });
    }

    fn publish(&mut self, transition: Transition) {
        match transition {
            Transition::Entered { index, token } => {
                self.deadline = match self.engine.schedule() {
                    Schedule::Timer { token, after } => Some((token, Instant::now() + after)),
                    Schedule::VideoEnd { .. } | Schedule::Idle => None,
                };
                if let Some(slide) = self.engine.current() {
                    let _ = self.events.send(CarouselEvent::SlideChanged {
                        index,
                        slide: slide.clone(),
                        token,
                    });
                }
            }
            Transition::Kept { index, token } => {
                if let Some(slide) = self.engine.current() {
                    let _ = self.events.send(CarouselEvent::SlideRefreshed {
                        index,
                        slide: slide.clone(),
                        token,
                    });
                }
            }
            Transition::Empty => {
                self.deadline = None;
                let _ = self.events.send(CarouselEvent::Empty);
            }
            Transition::Ignored => {}
        }
    }

    fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            current_index: self.engine.current_index(),
            slide: self.engine.current().cloned(),
            is_playing: self.engine.is_playing(),
            active_count: self.engine.len(),
            token: self.engine.token(),
        }
    }
}
