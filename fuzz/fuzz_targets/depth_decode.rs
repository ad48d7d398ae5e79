//! Fuzz target for depth buffer decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use simlabel::sensor::DepthImage;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (dims, bytes) = data.split_at(2);
    let (width, height) = (u32::from(dims[0]), u32::from(dims[1]));

    let _ = DepthImage::from_raw_f32_le(width, height, bytes);
    let _ = DepthImage::from_carla_bgra(width, height, bytes);
});
