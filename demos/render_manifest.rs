use livecast::event::Event;
use livecast::media::{aspect_ratio, ManifestBuilder};
use livecast::time::{Clock, SystemClock, TimeWindow};
use livecast::{config, ShellState};
use std::env;

/// Prints the player manifest for an event JSON file.
///
/// Usage: render_manifest <event.json>
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .ok_or("usage: render_manifest <event.json>")?;

    let json = tokio::fs::read_to_string(&path).await?;
    let event = Event::from_json(&json)?;
    let options = config::options();

    let window = TimeWindow::evaluate(
        event.is_live,
        event.start_time(),
        event.end_time(),
        SystemClock.now(),
    );
    println!("State: {:?}", ShellState::from_window(event.is_live, &window));
    println!("Aspect ratio: {:?}", aspect_ratio(&event.synced_data.tracks));

    let manifest = ManifestBuilder::from_event(&event)
        .with_caption_label(&options.caption_label)
        .build();
    println!("{}", serde_json::to_string_pretty(&manifest)?);

    Ok(())
}
