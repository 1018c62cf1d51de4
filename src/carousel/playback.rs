use std::time::Duration;

use crate::api::types::Slide;

/// Identifies one visit to a slide. Timers and video-end signals carry the
/// token of the visit they belong to; once the carousel moves on, the old
/// token never matches again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlaybackToken(u64);

impl PlaybackToken {
    fn next(self) -> Self {
        PlaybackToken(self.0 + 1)
    }
}

/// What has to happen for the current slide to be left on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Idle,
    Timer { token: PlaybackToken, after: Duration },
    VideoEnd { token: PlaybackToken },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A slide was (re)entered; any outstanding timer is void.
    Entered { index: usize, token: PlaybackToken },
    /// The video on screen survived a reload untouched. Its visit, token
    /// and play state carry on.
    Kept { index: usize, token: PlaybackToken },
    /// Nothing left to show.
    Empty,
    Ignored,
}

/// Rotation over the active subset. Image slides leave after a fixed
/// interval, video slides when playback completes, and the operator can jump
/// anywhere at any time. All three go through the same slide entry.
pub struct PlaybackEngine {
    active: Vec<Slide>,
    current_index: usize,
    is_playing: bool,
    token: PlaybackToken,
    image_interval: Duration,
}

impl PlaybackEngine {
    pub fn new(image_interval: Duration) -> Self {
        Self {
            active: Vec::new(),
            current_index: 0,
            is_playing: false,
            token: PlaybackToken::default(),
            image_interval,
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn current(&self) -> Option<&Slide> {
        self.active.get(self.current_index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current().map(|_| self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn token(&self) -> PlaybackToken {
        self.token
    }

    pub fn schedule(&self) -> Schedule {
        match self.current() {
            None => Schedule::Idle,
            Some(slide) if slide.is_video() => Schedule::VideoEnd { token: self.token },
            Some(_) => Schedule::Timer {
                token: self.token,
                after: self.image_interval,
            },
        }
    }

    /// Take a freshly derived active subset. The index survives when it is
    /// still in range and falls back to 0 otherwise. An image at the kept
    /// index is re-entered so its timer restarts; a video that is still the
    /// same asset keeps playing (or stays paused) under its current token.
    pub fn set_active(&mut self, active: Vec<Slide>) -> Transition {
        let previous = std::mem::replace(&mut self.active, active);
        if self.active.is_empty() {
            self.current_index = 0;
            self.is_playing = false;
            self.token = self.token.next();
            log::debug!("playback: no active slides");
            return Transition::Empty;
        }
        if self.current_index >= self.active.len() {
            log::debug!(
                "playback: index {} out of range for {} slides, resetting",
                self.current_index,
                self.active.len()
            );
            self.current_index = 0;
            return self.enter(0);
        }

        let before = previous.get(self.current_index);
        let same_video = match (before, self.current()) {
            (Some(before), Some(now)) => {
                now.is_video()
                    && before.is_video()
                    && before.slot_id == now.slot_id
                    && before.media == now.media
            }
            _ => false,
        };
        if same_video {
            log::debug!("playback: video {} kept across reload", self.current_index);
            return Transition::Kept {
                index: self.current_index,
                token: self.token,
            };
        }
        self.enter(self.current_index)
    }

    pub fn advance(&mut self) -> Transition {
        if self.active.is_empty() {
            return Transition::Ignored;
        }
        self.enter((self.current_index + 1) % self.active.len())
    }

    /// Manual navigation from an indicator.
    pub fn select(&mut self, index: usize) -> Transition {
        if index >= self.active.len() {
            log::warn!(
                "playback: ignoring select({}) with {} active slides",
                index,
                self.active.len()
            );
            return Transition::Ignored;
        }
        self.enter(index)
    }

    pub fn on_timer(&mut self, token: PlaybackToken) -> Transition {
        let live = token == self.token && self.current().is_some_and(|s| !s.is_video());
        if !live {
            log::debug!("playback: stale timer dropped");
            return Transition::Ignored;
        }
        self.advance()
    }

    pub fn on_video_ended(&mut self, token: PlaybackToken) -> Transition {
        let live = token == self.token && self.current().is_some_and(|s| s.is_video());
        if !live {
            log::debug!("playback: stale video end dropped");
            return Transition::Ignored;
        }
        self.advance()
    }

    /// Flip play/pause on a video slide. Returns the new state, or `None`
    /// when the current slide is not a video.
    pub fn toggle_play(&mut self) -> Option<bool> {
        let playing = !self.is_playing;
        self.set_playing(playing)
    }

    pub fn set_playing(&mut self, playing: bool) -> Option<bool> {
        if !self.current()?.is_video() {
            return None;
        }
        self.is_playing = playing;
        Some(playing)
    }

    fn enter(&mut self, index: usize) -> Transition {
        self.current_index = index;
        self.is_playing = true;
        self.token = self.token.next();
        log::debug!("playback: entered slide {} ({:?})", index, self.token);
        Transition::Entered {
            index,
            token: self.token,
        }
    }
}
