use std::io::Cursor;

use super::*;
use crate::assets::preload::Preload;
use crate::assets::sequence::SequenceSpec;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn seq(n: u32) -> SequenceSpec {
    SequenceSpec {
        frame_count: n,
        ..SequenceSpec::default()
    }
}

#[test]
fn uri_to_rel_path_strips_root_and_rejects_escapes() {
    assert_eq!(
        uri_to_rel_path("/sequence/ezgif-frame-001.jpg").unwrap(),
        PathBuf::from("sequence/ezgif-frame-001.jpg")
    );
    assert_eq!(
        uri_to_rel_path("./a/./b.png").unwrap(),
        PathBuf::from("a/b.png")
    );
    assert!(uri_to_rel_path("/../etc/passwd").is_err());
    assert!(uri_to_rel_path("https://cdn.example/x.jpg").is_err());
    assert!(uri_to_rel_path("/").is_err());
    assert!(uri_to_rel_path("").is_err());
}

#[test]
fn memory_loader_resolves_on_the_event_loop() {
    let events = EventLoop::new();
    let loader = MemoryLoader::new(&events);
    let seq = seq(2);
    loader.insert(seq.uri(FrameIndex(1)), png_bytes(4, 2));
    loader.insert(seq.uri(FrameIndex(2)), png_bytes(4, 2));

    let preload = Preload::start(&seq, &loader);
    assert_eq!(preload.status().loaded, 0);
    assert_eq!(events.run_until_idle(), 2);
    assert!(preload.status().is_complete());
    let img = preload.image(FrameIndex(2)).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
}

#[test]
fn memory_loader_missing_frame_fails() {
    let events = EventLoop::new();
    let loader = MemoryLoader::new(&events);
    let preload = Preload::start(&seq(1), &loader);
    events.run_until_idle();
    assert_eq!(preload.status().failed, 1);
}

#[test]
fn fs_loader_reads_under_root() {
    let dir = std::env::temp_dir().join(format!("scrollreel-fs-loader-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("sequence")).unwrap();
    std::fs::write(dir.join("sequence/ezgif-frame-001.jpg"), png_bytes(3, 3)).unwrap();

    let events = EventLoop::new();
    let loader = FsLoader::new(&dir, &events);
    let preload = Preload::start(&seq(2), &loader);
    events.run_until_idle();

    let status = preload.status();
    assert_eq!((status.loaded, status.failed), (1, 1));
    assert!(preload.image(FrameIndex(1)).is_some());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn queued_work_after_teardown_is_skipped() {
    let events = EventLoop::new();
    let loader = MemoryLoader::new(&events);
    loader.insert(seq(1).uri(FrameIndex(1)), png_bytes(1, 1));
    let preload = Preload::start(&seq(1), &loader);
    drop(preload);
    assert_eq!(events.run_until_idle(), 1);
}

#[test]
fn manual_loader_resolve_all_in_request_order() {
    let loader = ManualLoader::new();
    let preload = Preload::start(&seq(3), &loader);
    let mut order = Vec::new();
    let n = loader.resolve_all(|i| {
        order.push(i.0);
        Ok(DecodedImage::solid(1, 1, [0, 0, 0, 255]))
    });
    assert_eq!(n, 3);
    assert_eq!(order, vec![1, 2, 3]);
    assert!(preload.status().is_complete());
    assert_eq!(loader.pending_len(), 0);
}
