//! Steganographic codec: paired encoder/decoder backbones trained jointly
//! for hide/recover.

mod model;
mod train;
mod unet;

pub use model::{StegoCodec, StegoCodecConfig};
pub use train::{train, EpochStats};
pub use unet::{UNet, UNetConfig};
