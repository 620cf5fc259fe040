//! V4L2 capture source.
//!
//! Opens a local device node (e.g. /dev/video0), requests RGB24 at the
//! configured size and streams frames through memory-mapped buffers. Devices
//! that refuse RGB24 but offer NV12 are converted on read.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use super::normalize::{normalize_to_rgb, PixelFormat};
use super::{CaptureSession, VideoSource};
use crate::frame::Frame;

/// Configuration for a V4L2 source.
#[derive(Clone, Debug)]
pub struct V4l2Config {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Requested frame rate; 0 keeps the driver default.
    pub target_fps: u32,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
}

impl Default for V4l2Config {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }
}

pub struct V4l2Source {
    config: V4l2Config,
}

impl V4l2Source {
    pub fn new(config: V4l2Config) -> Self {
        Self { config }
    }
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl VideoSource for V4l2Source {
    fn describe(&self) -> String {
        self.config.device.clone()
    }

    fn open(&mut self) -> Result<Box<dyn CaptureSession>> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("open v4l2 device {}", self.config.device))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "V4l2Source: failed to set format on {}: {}",
                    self.config.device,
                    err
                );
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };
        let pixel_format = PixelFormat::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            anyhow!(
                "v4l2 device {} offers unsupported pixel format {}",
                self.config.device,
                format.fourcc
            )
        })?;

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "V4l2Source: failed to set fps on {}: {}",
                    self.config.device,
                    err
                );
            }
        }

        let state = DeviceStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;

        log::info!(
            "V4l2Source: connected to {} ({}x{}, {:?})",
            self.config.device,
            format.width,
            format.height,
            pixel_format
        );
        Ok(Box::new(V4l2Session {
            device: self.config.device.clone(),
            state: Some(state),
            width: format.width,
            height: format.height,
            pixel_format,
            frame_count: 0,
        }))
    }
}

struct V4l2Session {
    device: String,
    state: Option<DeviceState>,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    frame_count: u64,
}

impl CaptureSession for V4l2Session {
    fn read(&mut self) -> Result<Option<Frame>> {
        use v4l::io::traits::CaptureStream;

        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };
        let pixels = state
            .with_mut(|fields| {
                fields
                    .stream
                    .next()
                    .map(|(buf, _meta)| buf.to_vec())
            })
            .context("capture v4l2 frame")?;
        let rgb = normalize_to_rgb(&pixels, self.width, self.height, self.pixel_format)?;
        self.frame_count += 1;
        Ok(Some(Frame::from_rgb(
            self.width,
            self.height,
            rgb,
            self.frame_count,
        )?))
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            log::info!(
                "V4l2Source: released {} after {} frames",
                self.device,
                self.frame_count
            );
        }
    }

    fn frames_read(&self) -> u64 {
        self.frame_count
    }
}

impl Drop for V4l2Session {
    fn drop(&mut self) {
        self.release();
    }
}
