use std::time::{Duration, Instant};

use backdrop::{BackgroundSwitcher, ScrollMetrics, TRANSITION_DURATION};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

#[test]
fn init_then_scroll_through_document() {
    let dir = TempDir::new().unwrap();
    let mut paths = Vec::new();
    for index in 0..8u8 {
        let path = dir.path().join(format!("{index:02}.png"));
        if index != 3 {
            RgbaImage::from_pixel(2, 2, Rgba([index * 30, 0, 0, 255]))
                .save(&path)
                .unwrap();
        }
        paths.push(path);
    }

    let mut switcher = BackgroundSwitcher::init(&paths);
    assert_eq!(switcher.frame_count(), 8);
    assert_eq!(switcher.images().loaded_count(), 7);
    assert!(switcher.images().get(3).unwrap().is_blank());

    let scrollable = 7000.0;
    let start = Instant::now();
    let mut visited = vec![switcher.current_index()];
    // One scroll event per frame, slow enough for every window to close.
    for step in 1..=8 {
        let now = start + (TRANSITION_DURATION + Duration::from_millis(10)) * step;
        let offset = scrollable * step as f64 / 8.0;
        assert!(switcher.scroll_event());
        if let Some(change) = switcher.animation_frame(ScrollMetrics::new(offset, scrollable), now)
        {
            visited.push(change.current);
        }
    }

    assert_eq!(visited, vec![0, 1, 2, 3, 4, 5, 6, 7]);
}
