use coach_portal::carousel::CarouselEvent;
use coach_portal::config::Config;
use coach_portal::{logging, Portal};
use tokio::sync::broadcast;

/// Headless carousel: loads the slides and logs the rotation until Ctrl-C.
#[tokio::main]
async fn main() {
    let config = Config::from_env();
    logging::init(&config.log_filter);
    config.log_rejected();

    let portal = match Portal::new(config) {
        Ok(portal) => portal,
        Err(e) => {
            log::error!("Failed to open settings store: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(user) = portal.session.user() {
        log::info!("Session: {} (coach: {})", user.username, user.is_coach);
    }

    let carousel = portal.carousel();
    let mut events = carousel.subscribe();
    let handle = carousel.spawn();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(CarouselEvent::SlideChanged { index, slide, .. }) => {
                    log::info!(
                        "Slide {} (slot {}, {}): {}",
                        index,
                        slide.slot_id,
                        slide.media_type.as_str(),
                        slide.headline
                    );
                }
                Ok(CarouselEvent::Empty) => {
                    log::info!("No active slides");
                    if portal.session.can_edit() {
                        log::info!("Open the editor to switch a slot on");
                    }
                }
                Ok(CarouselEvent::LoadFailed(message)) => log::error!("{}", message),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => {
                    log::warn!("Event stream ended: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
}
