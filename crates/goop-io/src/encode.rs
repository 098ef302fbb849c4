use std::{fs::File, io::{BufWriter, Write}, path::PathBuf};

use log::debug;
use thiserror::Error;

use goop_fluids::{scene::Scene, FluidParams, Fluid};

use crate::{as_bytes::AsBytes, frame_path, geometry, EncodeFluid};

pub struct FluidDataEncoder {
    /// The path to the directory into which the fluid data will be placed.
    path: PathBuf,
    num_frames: u64,
    fps: u32,
    current_frame: u64,
}

impl FluidDataEncoder {
    pub fn new(path: PathBuf, num_frames: u64, fps: u32) -> Result<FluidDataEncoder, EncodingError> {
        std::fs::create_dir(&path)?;

        Ok(Self {
            path,
            num_frames,
            fps,
            current_frame: 0,
        })
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.current_frame
    }

    pub fn encode_metadata<F>(&mut self, scene: &Scene<F, FluidParams>) -> Result<(), EncodingError>
    where 
        F: Fluid<Params = FluidParams>,
    {
        let path = self.path.join("_meta");
        let mut writer = BufWriter::new(File::create(path)?);
        let params = scene.params();

        writer.write_all(&self.fps.to_bytes())?;
        writer.write_all(&self.num_frames.to_bytes())?;

        writer.write_all(&params.particle_radius.to_bytes())?;
        writer.write_all(&params.interaction_radius.to_bytes())?;

        let obstacles = scene.obstacles();

        writer.write_all(&(obstacles.obstacles().len() as u32).to_bytes())?;
        for obstacle in obstacles.obstacles() {
            geometry::write_obstacle(&mut writer, obstacle)?;
        }

        writer.write_all(&(obstacles.sinks().len() as u32).to_bytes())?;
        for sink in obstacles.sinks() {
            geometry::write_sink(&mut writer, sink)?;
        }

        writer.flush()?;
        debug!("wrote metadata for {} frames to {}", self.num_frames, self.path.display());

        Ok(())
    }

    pub fn encode_frame<F, P>(&mut self, scene: &Scene<F, P>) -> Result<(), EncodingError>
    where 
        F: Fluid<Params = P> + EncodeFluid,
    {
        if self.current_frame >= self.num_frames {
            return Err(EncodingError::FrameOverflow(self.num_frames));
        }

        let path = self.path.join(frame_path(self.num_frames, self.current_frame));
        let mut encoder = FluidFrameEncoder::new(File::create(path)?);
        scene.fluid.encode_state(&mut encoder)?;
        encoder.writer.flush()?;

        self.current_frame += 1;

        Ok(())
    }
}

pub struct FluidFrameEncoder<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> FluidFrameEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: BufWriter::new(writer) }
    }

    /// Writes `len` as a `u64` followed by the bytes of each value.
    pub fn encode_section<const N: usize, T, I>(&mut self, len: usize, values: I) -> Result<(), EncodingError>
    where
        I: Iterator<Item = T>,
        T: AsBytes<N>,
    {
        self.writer.write_all(&(len as u64).to_bytes())?;

        let bytes: Vec<_> = values.flat_map(|v| v.to_bytes()).collect();
        self.writer.write_all(&bytes)?;

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("recording holds {0} frames, cannot write another")]
    FrameOverflow(u64),
}
