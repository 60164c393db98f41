use std::fmt;
use std::str::FromStr;

use crate::shared::frame::Frame;

/// Channel order of the pixel data stored in a recording archive.
///
/// Encoders in this crate expect RGB, so frames are normalised once, right
/// before they are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    pub fn to_rgb(self, frame: &mut Frame) {
        if self == ChannelOrder::Rgb {
            return;
        }
        let channels = frame.channels() as usize;
        if channels < 3 {
            return;
        }
        for pixel in frame.data_mut().chunks_exact_mut(channels) {
            pixel.swap(0, 2);
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(format!("Channel order must be 'rgb' or 'bgr', got '{other}'")),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOrder::Rgb => write!(f, "rgb"),
            ChannelOrder::Bgr => write!(f, "bgr"),
        }
    }
}
