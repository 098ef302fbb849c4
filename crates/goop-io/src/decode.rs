use std::{fs::File, io::{BufReader, Read}, path::PathBuf};

use glam::Vec2;
use goop_fluids::{obstacle::{Obstacle, SourceAndSink}, ConfigError};
use log::debug;
use thiserror::Error;

use crate::{as_bytes::AsBytes, frame_path, geometry};

pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    num_frames: u64,
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            num_frames: 0,
            current_frame: 0,
        }
    }

    fn read_value<const N: usize, T: AsBytes<N>, R: Read>(reader: &mut R) -> Result<T, DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;

        Ok(T::from_bytes(bytes))
    }

    /// Reads a length-prefixed section of `Vec2`s. The section may not claim more than `limit`
    /// bytes.
    fn read_section<R: Read>(reader: &mut R, limit: u64) -> Result<Vec<Vec2>, DecodingError> {
        let len = Self::read_value::<8, u64, _>(reader)?;

        let size = len
            .checked_mul(8)
            .filter(|&size| size <= limit)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or(DecodingError::SectionLength(len))?;

        let mut bytes = vec![0; size];
        reader.read_exact(&mut bytes)?;

        Ok(bytes
            .chunks_exact(8)
            .map(|b| {
                let mut chunk = [0; 8];
                chunk.copy_from_slice(b);
                Vec2::from_bytes(chunk)
            })
            .collect())
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let fps = Self::read_value::<4, u32, _>(&mut reader)?;
        let num_frames = Self::read_value::<8, u64, _>(&mut reader)?;
        let particle_radius = Self::read_value::<4, f32, _>(&mut reader)?;
        let interaction_radius = Self::read_value::<4, f32, _>(&mut reader)?;

        let n_obstacles = Self::read_value::<4, u32, _>(&mut reader)?;
        let obstacles = (0..n_obstacles)
            .map(|_| geometry::read_obstacle(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        let n_sinks = Self::read_value::<4, u32, _>(&mut reader)?;
        let sinks = (0..n_sinks)
            .map(|_| geometry::read_sink(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        self.num_frames = num_frames;
        debug!("{}: {} frames at {} fps", self.path.display(), num_frames, fps);

        Ok(FluidMetadata {
            fps,
            num_frames,
            particle_radius,
            interaction_radius,
            obstacles,
            sinks,
        })
    }

    /// The next frame, or `None` once every frame announced by the metadata has been read.
    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None)
        }

        let path = self.path.join(frame_path(self.num_frames, self.current_frame));
        let file = File::open(path)?;
        let limit = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let positions = Self::read_section(&mut reader, limit)?;
        let velocities = Self::read_section(&mut reader, limit)?;

        if positions.len() != velocities.len() {
            return Err(DecodingError::SectionMismatch {
                frame: self.current_frame,
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }

        self.current_frame += 1;

        Ok(Some(FluidFrameData {
            positions,
            velocities,
        }))
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidMetadata {
    pub fps: u32,
    pub num_frames: u64,
    pub particle_radius: f32,
    pub interaction_radius: f32,
    pub obstacles: Vec<Obstacle>,
    pub sinks: Vec<SourceAndSink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidFrameData {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

impl FluidFrameData {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Lower and upper corner of the particle positions.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.positions.first()?;

        Some(self.positions.iter().fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))))
    }

    pub fn max_speed(&self) -> f32 {
        self.velocities.iter().map(|v| v.length()).fold(0.0, f32::max)
    }
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unknown obstacle tag {0}")]
    UnknownObstacle(u8),
    #[error("expected a source/sink record")]
    ExpectedSink,
    #[error("invalid obstacle record: {0}")]
    Obstacle(#[from] ConfigError),
    #[error("frame section claims {0} values, more than the file holds")]
    SectionLength(u64),
    #[error("frame {frame} holds {positions} positions but {velocities} velocities")]
    SectionMismatch {
        frame: u64,
        positions: usize,
        velocities: usize,
    },
}
