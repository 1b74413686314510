use std::io::Cursor;

use super::*;
use crate::assets::loader::{ManualLoader, MemoryLoader};
use crate::foundation::core::FrameIndex;

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 9, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn small_config(frames: u32) -> PlayerConfig {
    let mut cfg = PlayerConfig::default();
    cfg.sequence.frame_count = frames;
    cfg
}

fn memory_session(cfg: PlayerConfig) -> ScrollSession {
    let seq = cfg.sequence.clone();
    ScrollSession::new(Viewport::new(160, 90), cfg, move |host| {
        let loader = MemoryLoader::new(host.events());
        for index in seq.indices() {
            let shade = (index.0 * 10).min(255) as u8;
            loader.insert(seq.uri(index), png([shade, 0, 0, 255]));
        }
        Box::new(loader) as Box<dyn FrameLoader>
    })
    .unwrap()
}

#[test]
fn page_height_follows_scroll_length() {
    let session = memory_session(small_config(4));
    assert_eq!(session.host().page().layout().scroll_height, 360.0);
}

#[test]
fn ready_scroll_and_snapshot() {
    let session = memory_session(small_config(4));
    assert_eq!(session.wait_until_ready(10).unwrap(), 0);
    session.scroll_to_progress(1.0);
    session.settle(600).unwrap();

    assert_eq!(session.player().frame_index(), FrameIndex(4));
    let img = session.snapshot().unwrap();
    assert_eq!(img.dimensions(), (160, 90));
    let px = img.get_pixel(80, 45).0;
    assert!(px[0].abs_diff(40) <= 1, "{px:?}");
}

#[test]
fn wait_until_ready_times_out() {
    let loader = ManualLoader::new();
    let handle = loader.clone();
    let session = ScrollSession::new(Viewport::new(160, 90), small_config(2), move |_| {
        Box::new(handle) as Box<dyn FrameLoader>
    })
    .unwrap();
    let err = session.wait_until_ready(5).unwrap_err();
    assert!(err.to_string().contains("0 of 2 loaded"));
    assert_eq!(loader.pending_len(), 2);
}

#[test]
fn scoped_binding_gets_a_full_page_container() {
    let mut cfg = small_config(3);
    cfg.binding = ScrollBinding::Scoped {
        container: "hero".to_owned(),
    };
    let session = memory_session(cfg);
    session.wait_until_ready(10).unwrap();
    session.scroll_to_progress(0.5);
    assert!((session.player().progress() - 0.5).abs() < 1e-12);

    session.resize(Viewport::new(90, 160));
    let layout = session.host().page().layout();
    assert_eq!(layout.elements["hero"].height, 640.0);
    assert_eq!(layout.scroll_height, 640.0);
}

#[test]
fn resize_redraws_at_new_size() {
    let session = memory_session(small_config(2));
    session.wait_until_ready(10).unwrap();
    session.resize(Viewport::new(90, 160));
    let img = session.snapshot().unwrap();
    assert_eq!(img.dimensions(), (90, 160));
    assert_eq!(session.player().frame_on_canvas(), Some(FrameIndex(1)));
}
