use std::io::Write;

use encode::{EncodingError, FluidFrameEncoder};
use goop_fluids::{viscoelastic::ViscoelasticFluid, Fluid};

pub mod as_bytes;
pub mod decode;
pub mod encode;
pub mod geometry;

pub trait EncodeFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for ViscoelasticFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        encoder.encode_section(self.positions().len(), self.positions().iter().copied())?;
        encoder.encode_section(self.velocities().len(), self.velocities().iter().copied())?;

        Ok(())
    }
}

/// File name of `frame`, zero-padded to the width of the last frame index.
pub(crate) fn frame_path(num_frames: u64, frame: u64) -> String {
    let max_digits = num_frames.saturating_sub(1).checked_ilog10().unwrap_or(0) + 1;
    let digits = frame.checked_ilog10().unwrap_or(0) + 1;
    let zeros = max_digits.saturating_sub(digits);

    format!("{}{frame}.dat", "0".repeat(zeros as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names_are_padded() {
        assert_eq!(frame_path(1, 0), "0.dat");
        assert_eq!(frame_path(120, 7), "007.dat");
        assert_eq!(frame_path(120, 119), "119.dat");
        assert_eq!(frame_path(10, 9), "9.dat");
    }
}
