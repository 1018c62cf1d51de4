pub mod driver;
pub mod editor;
pub mod playback;
pub mod store;

pub use driver::{Carousel, CarouselEvent, CarouselHandle, PlaybackStatus};
pub use editor::{Draft, EditWorkflow, StagedMedia};
pub use playback::{PlaybackEngine, PlaybackToken, Schedule, Transition};
pub use store::{active_subset, SlideSnapshot, SlideStore, StoreEvent};
