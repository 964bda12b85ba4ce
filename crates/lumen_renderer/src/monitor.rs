//! Live render monitor.
//!
//! Finished pixels are mirrored as JSON datagrams to a UDP address
//! (usually a multicast group) so an external viewer can watch the render
//! progress. Delivery is best effort and never fails the render.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::thread;
use std::time::Duration;

use lumen_core::color::color_to_rgba;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketResult;
use crate::config::MonitorConfig;
use crate::error::{RenderError, RenderResult};

/// Pause between retries of a transient send failure.
const RETRY_DELAY: Duration = Duration::from_millis(5);

/// Multicast TTL used for group addresses.
const MULTICAST_TTL: u32 = 4;

/// One monitor message. A datagram with `x == y == -1` announces a new image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelDatagram {
    pub image_group: String,
    pub image_name: String,
    pub image_width: u32,
    pub image_height: u32,
    pub x: i32,
    pub y: i32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub color: [u8; 3],
}

/// Destination for encoded datagrams.
pub trait DatagramSink: Send + Sync {
    fn send(&self, payload: &[u8]) -> io::Result<()>;
}

/// UDP socket bound to an ephemeral local port.
pub struct UdpSink {
    socket: Mutex<UdpSocket>,
    target: SocketAddr,
}

impl UdpSink {
    pub fn connect(address: &str) -> RenderResult<Self> {
        let target = address
            .to_socket_addrs()
            .map_err(|source| RenderError::MonitorSocket {
                address: address.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| RenderError::MonitorAddress {
                address: address.to_string(),
            })?;

        let bind = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket_error = |source: io::Error| RenderError::MonitorSocket {
            address: address.to_string(),
            source,
        };
        let socket = UdpSocket::bind(bind).map_err(socket_error)?;
        if target.ip().is_multicast() {
            if target.is_ipv4() {
                socket.set_multicast_ttl_v4(MULTICAST_TTL).map_err(socket_error)?;
            }
            log::debug!("Monitor multicast group {target} (ttl {MULTICAST_TTL})");
        } else {
            log::debug!("Monitor target {target}");
        }

        Ok(Self {
            socket: Mutex::new(socket),
            target,
        })
    }
}

impl DatagramSink for UdpSink {
    fn send(&self, payload: &[u8]) -> io::Result<()> {
        self.socket.lock().send_to(payload, self.target).map(|_| ())
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
    )
}

/// Streams finished pixels of one image to a [`DatagramSink`].
pub struct Monitor {
    sink: Box<dyn DatagramSink>,
    image_group: String,
    image_name: String,
    width: u32,
    height: u32,
    gamma: f32,
}

impl Monitor {
    /// Open a UDP monitor for an image of `width` x `height` and announce it.
    pub fn connect(config: &MonitorConfig, width: u32, height: u32, gamma: f32) -> RenderResult<Self> {
        let sink = UdpSink::connect(&config.address)?;
        Ok(Self::with_sink(sink, config, width, height, gamma))
    }

    /// Create a monitor over any sink. The init datagram is sent before
    /// this returns.
    pub fn with_sink(
        sink: impl DatagramSink + 'static,
        config: &MonitorConfig,
        width: u32,
        height: u32,
        gamma: f32,
    ) -> Self {
        let monitor = Self {
            sink: Box::new(sink),
            image_group: config.image_group.clone(),
            image_name: config.image_name.clone(),
            width,
            height,
            gamma,
        };
        monitor.send(&monitor.datagram(-1, -1, [0; 3]));
        monitor
    }

    fn datagram(&self, x: i32, y: i32, color: [u8; 3]) -> PixelDatagram {
        PixelDatagram {
            image_group: self.image_group.clone(),
            image_name: self.image_name.clone(),
            image_width: self.width,
            image_height: self.height,
            x,
            y,
            pixel_width: 1,
            pixel_height: 1,
            color,
        }
    }

    /// Send one datagram, retrying transient failures. Anything else is
    /// logged and dropped.
    pub fn send(&self, datagram: &PixelDatagram) {
        let payload = match serde_json::to_vec(datagram) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Dropping monitor datagram: {err}");
                return;
            }
        };

        loop {
            match self.sink.send(&payload) {
                Ok(()) => return,
                Err(err) if is_transient(&err) => thread::sleep(RETRY_DELAY),
                Err(err) => {
                    log::warn!(
                        "Dropping monitor datagram for pixel ({}, {}): {err}",
                        datagram.x,
                        datagram.y
                    );
                    return;
                }
            }
        }
    }

    /// Mirror every pixel of a finished bucket.
    pub fn send_bucket(&self, result: &BucketResult) {
        for (x, y, pixel) in result.iter() {
            let [r, g, b, _] = color_to_rgba(pixel.value(), self.gamma);
            self.send(&self.datagram(x as i32, y as i32, [r, g, b]));
        }
    }
}
