use std::io::{Read, Write};

use glam::Vec2;
use goop_fluids::obstacle::{Capsule, Obstacle, SourceAndSink, Sphere, Wall};

use crate::{as_bytes::AsBytes, decode::DecodingError};

const WALL: u8 = 0;
const SPHERE: u8 = 1;
const CAPSULE: u8 = 2;
const SINK: u8 = 3;

fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> std::io::Result<()> {
    for v in values {
        writer.write_all(&v.to_bytes())?;
    }

    Ok(())
}

/// Writes a tag byte followed by the shape's `f32` fields.
pub fn write_obstacle<W: Write>(writer: &mut W, obstacle: &Obstacle) -> std::io::Result<()> {
    match obstacle {
        Obstacle::Wall(wall) => {
            writer.write_all(&[WALL])?;
            let (o, t) = (wall.origin(), wall.tangent());
            write_f32s(writer, &[o.x, o.y, t.x, t.y])
        }
        Obstacle::Sphere(sphere) => {
            writer.write_all(&[SPHERE])?;
            write_f32s(writer, &[sphere.center.x, sphere.center.y, sphere.radius])
        }
        Obstacle::Capsule(capsule) => {
            writer.write_all(&[CAPSULE])?;
            let (s, e) = (capsule.start(), capsule.end());
            write_f32s(writer, &[s.x, s.y, e.x, e.y, capsule.radius()])
        }
        Obstacle::SourceAndSink(sink) => write_sink(writer, sink),
    }
}

/// Writes the sink tag, the sink's collider, then source position, radius and velocity.
pub fn write_sink<W: Write>(writer: &mut W, sink: &SourceAndSink) -> std::io::Result<()> {
    writer.write_all(&[SINK])?;
    write_obstacle(writer, sink.collider())?;
    write_f32s(
        writer,
        &[sink.source.x, sink.source.y, sink.source_radius, sink.velocity.x, sink.velocity.y],
    )
}

fn read_f32s<const N: usize, R: Read>(reader: &mut R) -> Result<[f32; N], DecodingError> {
    let mut values = [0.0; N];

    for v in values.iter_mut() {
        let mut b = [0; 4];
        reader.read_exact(&mut b)?;
        *v = f32::from_bytes(b);
    }

    Ok(values)
}

pub fn read_obstacle<R: Read>(reader: &mut R) -> Result<Obstacle, DecodingError> {
    let mut tag = [0];
    reader.read_exact(&mut tag)?;

    Ok(match tag[0] {
        WALL => {
            let [ox, oy, tx, ty] = read_f32s::<4, _>(reader)?;
            Wall::try_new(Vec2::new(ox, oy), Vec2::new(tx, ty))?.into()
        }
        SPHERE => {
            let [x, y, r] = read_f32s::<3, _>(reader)?;
            Sphere::try_new(Vec2::new(x, y), r)?.into()
        }
        CAPSULE => {
            let [x0, y0, x1, y1, r] = read_f32s::<5, _>(reader)?;
            Capsule::try_new(Vec2::new(x0, y0), Vec2::new(x1, y1), r)?.into()
        }
        SINK => read_sink_body(reader)?.into(),
        tag => return Err(DecodingError::UnknownObstacle(tag)),
    })
}

pub fn read_sink<R: Read>(reader: &mut R) -> Result<SourceAndSink, DecodingError> {
    match read_obstacle(reader)? {
        Obstacle::SourceAndSink(sink) => Ok(sink),
        _ => Err(DecodingError::ExpectedSink),
    }
}

fn read_sink_body<R: Read>(reader: &mut R) -> Result<SourceAndSink, DecodingError> {
    let collider = read_obstacle(reader)?;
    let [sx, sy, radius, vx, vy] = read_f32s::<5, _>(reader)?;

    SourceAndSink::try_new(collider, Vec2::new(sx, sy), radius, Vec2::new(vx, vy)).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use goop_fluids::ConfigError;

    use super::*;

    #[test]
    fn sink_nests_its_collider() {
        let sink = SourceAndSink::new(
            Capsule::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 10.0),
            Vec2::new(250.0, 550.0),
            25.0,
            Vec2::new(2.0, -4.0),
        );

        let mut bytes = Vec::new();
        write_sink(&mut bytes, &sink).unwrap();
        assert_eq!(bytes.len(), 1 + 1 + 5 * 4 + 5 * 4);
        assert_eq!(bytes[..2], [SINK, CAPSULE]);

        assert_eq!(read_sink(&mut Cursor::new(bytes)).unwrap(), sink);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = read_obstacle(&mut Cursor::new(vec![9u8])).unwrap_err();
        assert!(matches!(err, DecodingError::UnknownObstacle(9)));
    }

    #[test]
    fn zero_wall_direction_is_rejected() {
        let mut bytes = vec![WALL];
        write_f32s(&mut bytes, &[0.0, 10.0, 0.0, 0.0]).unwrap();

        let err = read_obstacle(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodingError::Obstacle(ConfigError::WallDirection(_))));
    }

    #[test]
    fn sphere_is_not_a_sink() {
        let mut bytes = Vec::new();
        write_obstacle(&mut bytes, &Sphere::new(Vec2::ZERO, 1.0).into()).unwrap();
        assert!(matches!(read_sink(&mut Cursor::new(bytes)), Err(DecodingError::ExpectedSink)));
    }
}
