// ABOUTME: Test doubles and image fixtures for unit tests
// ABOUTME: Scripted readers, call-counting transports and decoders, in-memory encoded images

use crate::bitmap::DecodedImage;
use crate::decoder::{decode, ImageCodecContext, MapDecoder};
use crate::error::{DecodeError, FetchError};
use crate::transport::Transport;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One step of a `ScriptedReader`
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Reader that replays a fixed script and records the buffer sizes it was given
pub struct ScriptedReader {
    script: VecDeque<ScriptedRead>,
    requested: Vec<usize>,
}

impl ScriptedReader {
    pub fn new(script: impl IntoIterator<Item = ScriptedRead>) -> Self {
        Self {
            script: script.into_iter().collect(),
            requested: Vec::new(),
        }
    }

    pub fn requested_lengths(&self) -> &[usize] {
        &self.requested
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.requested.push(buf.len());
        match self.script.pop_front() {
            None => Ok(0),
            Some(ScriptedRead::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(ScriptedRead::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    self.script.push_front(ScriptedRead::Data(rest));
                }
                Ok(n)
            }
        }
    }
}

type FailureFactory = Box<dyn Fn() -> FetchError + Send + Sync>;

/// Transport returning a canned body, or a canned failure, and recording URLs
pub struct StaticTransport {
    body: Option<Vec<u8>>,
    failure: Option<FailureFactory>,
    opened: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn body(body: Vec<u8>) -> Self {
        Self {
            body: Some(body),
            failure: None,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: impl Fn() -> FetchError + Send + Sync + 'static) -> Self {
        Self {
            body: None,
            failure: Some(Box::new(failure)),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Transport for StaticTransport {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        self.opened.lock().unwrap().push(url.to_string());
        if let Some(failure) = &self.failure {
            return Err(failure());
        }
        let body = self.body.clone().unwrap_or_default();
        Ok(Box::new(Cursor::new(body)))
    }
}

/// Decoder that counts calls and delegates to the real codec
#[derive(Clone, Default)]
pub struct CountingDecoder {
    calls: Arc<AtomicUsize>,
    ctx: ImageCodecContext,
}

impl CountingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MapDecoder for CountingDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedImage, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        decode(&self.ctx, payload)
    }
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("fixture should encode");
    bytes
}

/// Smooth gradient JPEG of the given size
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg)
}

/// Red top half, blue bottom half
pub fn split_fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    let image = match format {
        ImageFormat::Gif => DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(image).to_rgba8()),
        _ => DynamicImage::ImageRgb8(image),
    };
    encode(image, format)
}
