//! End-to-end tests: frame -> PNG on disk -> frame.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cicada_stego::common::config::StegoConfig;
use cicada_stego::processing::codec::{self, TERMINATION_MARKER};
use cicada_stego::processing::{image_io, payload, steganography};
use cicada_stego::{BitsPerChannel, PayloadFrame, PixelGrid, StegoError};

fn random_grid(rng: &mut StdRng, width: u32, height: u32) -> PixelGrid {
    let pixels = (0..width * height).map(|_| rng.gen::<[u8; 3]>()).collect();
    PixelGrid::new(width, height, pixels).unwrap()
}

#[test]
fn test_text_survives_png_file() {
    let mut rng = StdRng::seed_from_u64(7);
    let dir = tempfile::tempdir().unwrap();
    let cover_path = dir.path().join("cover.png");
    let stego_path = dir.path().join("stego.png");

    image_io::save_png(&random_grid(&mut rng, 120, 80), &cover_path).unwrap();

    let config = StegoConfig::default();
    let frame = PayloadFrame::text("Ünïcødé survives too ✓").unwrap();

    let cover = image_io::load_grid(&cover_path).unwrap();
    let stego = steganography::hide(&cover, &frame, &config).unwrap();
    image_io::save_png(&stego, &stego_path).unwrap();

    let reloaded = image_io::load_grid(&stego_path).unwrap();
    assert_eq!(reloaded, stego);
    assert_eq!(
        steganography::reveal(&reloaded, BitsPerChannel::TWO).unwrap(),
        frame
    );
}

#[test]
fn test_file_from_path_roundtrip() {
    let mut rng = StdRng::seed_from_u64(11);
    let dir = tempfile::tempdir().unwrap();
    let secret_path = dir.path().join("secret.dat");
    let content: Vec<u8> = (0..2048).map(|_| rng.gen()).collect();
    std::fs::write(&secret_path, &content).unwrap();

    let frame = PayloadFrame::from_path(&secret_path).unwrap();
    assert_eq!(
        frame,
        PayloadFrame::File {
            extension: ".dat".to_string(),
            content: content.clone(),
        }
    );

    let cover = random_grid(&mut rng, 100, 100);
    let stego = steganography::hide(&cover, &frame, &StegoConfig::default()).unwrap();
    assert_eq!(
        steganography::reveal(&stego, BitsPerChannel::TWO).unwrap(),
        frame
    );
}

#[test]
fn test_random_payloads_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    let cover = random_grid(&mut rng, 64, 64);

    for round in 0..24 {
        let len = rng.gen_range(0..600);
        let content: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let frame = PayloadFrame::file(".bin", content).unwrap();

        let config = StegoConfig {
            bits_per_channel: if round % 2 == 0 { 1 } else { 2 },
            compress: round % 3 != 0,
        };
        let bits = config.bits_per_channel().unwrap();

        let stego = steganography::hide(&cover, &frame, &config).unwrap();
        let revealed = steganography::reveal(&stego, bits).unwrap();
        assert_eq!(revealed, frame, "round {}", round);
    }
}

#[test]
fn test_capacity_boundary_through_pipeline() {
    let cover = PixelGrid::filled(20, 20, [200, 100, 50]);
    let config = StegoConfig {
        bits_per_channel: 1,
        compress: false,
    };
    let max = codec::capacity(20, 20, BitsPerChannel::ONE);
    assert_eq!(max, 150);

    // "TXT:" + body + marker == max
    let body = "a".repeat(max - TERMINATION_MARKER.len() - payload::TEXT_TAG.len());
    let frame = PayloadFrame::text(body.clone()).unwrap();
    let stego = steganography::hide(&cover, &frame, &config).unwrap();
    assert_eq!(
        steganography::reveal(&stego, BitsPerChannel::ONE).unwrap(),
        frame
    );

    let frame = PayloadFrame::text(body + "a").unwrap();
    assert_eq!(
        steganography::hide(&cover, &frame, &config),
        Err(StegoError::CapacityExceeded {
            required: max + 1,
            max
        })
    );
}

#[test]
fn test_source_grid_is_not_mutated() {
    let mut rng = StdRng::seed_from_u64(3);
    let cover = random_grid(&mut rng, 16, 16);
    let snapshot = cover.clone();

    let frame = PayloadFrame::text("leave the original alone").unwrap();
    let stego = steganography::hide(&cover, &frame, &StegoConfig::default()).unwrap();

    assert_eq!(cover, snapshot);
    assert_ne!(stego, snapshot);
}

#[test]
fn test_untagged_legacy_payload() {
    // older revisions embedded bare text without a tag
    let cover = PixelGrid::filled(32, 32, [10, 20, 30]);
    let stego = codec::embed(&cover, b"plain text, no tag", true, BitsPerChannel::TWO).unwrap();

    assert_eq!(
        steganography::reveal(&stego, BitsPerChannel::TWO).unwrap(),
        PayloadFrame::Legacy("plain text, no tag".to_string())
    );
}

#[test]
fn test_untouched_image_decodes_without_error() {
    let mut rng = StdRng::seed_from_u64(99);
    let cover = random_grid(&mut rng, 24, 24);

    let data = codec::extract(&cover, BitsPerChannel::ONE);
    assert_eq!(data.len(), codec::capacity(24, 24, BitsPerChannel::ONE));
}
