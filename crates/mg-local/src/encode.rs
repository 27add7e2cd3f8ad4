use std::io::Cursor;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage};
use mg_core::{Error, Result};

/// Frame rate used when saving local video frames as GIF
pub const GIF_FPS: u32 = 8;

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Encode frames as an endlessly looping GIF
pub fn encode_gif(frames: Vec<RgbaImage>, fps: u32) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(Error::pipeline("cannot encode a GIF without frames"));
    }
    let fps = fps.max(1);

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = Delay::from_numer_denom_ms(1000, fps);
        encoder.encode_frames(
            frames
                .into_iter()
                .map(|frame| Frame::from_parts(frame, 0, 0, delay)),
        )?;
    }
    Ok(bytes)
}

/// Decode a base64 image payload into RGBA pixels
pub fn decode_base64_image(payload: &str) -> Result<RgbaImage> {
    let bytes = STANDARD.decode(payload.trim())?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image.to_rgba8())
}
