//! Binary multi-cloud container
//!
//! Layout, all integers and floats little-endian:
//!
//! ```text
//! u32                   cloud count
//! per cloud:
//!   u32                 point count N
//!   u8                  flags (0x10 = name follows)
//!   [name bytes, NUL]   only when the name flag is set
//!   N * 3 * f32         x0, y0, z0, x1, y1, z1, ...
//! ```
//!
//! There is no version byte, checksum, or grid metadata. Decoded clouds are
//! always unorganized, whatever their layout was when written. Keeping the
//! layout would need a format revision with a version flag.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use cloudlib_core::{Error, PointCloud, Result};
use log::{debug, trace};
use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Flag bit marking a NUL-terminated name after the flags byte
pub const NAME_FLAG: u8 = 0x10;

/// Encoded size of one point
pub const POINT_SIZE: usize = 3 * std::mem::size_of::<f32>();

/// Write `clouds` to `writer` in container order
///
/// Every cloud is validated before the first byte is written, so a rejected
/// input never leaves a partial container behind.
pub fn write_clouds<W, C>(writer: &mut W, clouds: &[C]) -> Result<()>
where
    W: Write,
    C: Borrow<PointCloud>,
{
    let count = to_u32(clouds.len(), "cloud count")?;
    for cloud in clouds {
        validate(cloud.borrow())?;
    }

    writer.write_u32::<LittleEndian>(count)?;
    for cloud in clouds {
        write_cloud(writer, cloud.borrow())?;
    }

    debug!("encoded {} clouds", count);
    Ok(())
}

/// Read a whole container from `reader`
///
/// Reading stops right after the last declared cloud; anything that follows
/// in the stream is left unread.
pub fn read_clouds<R: Read>(reader: &mut R) -> Result<Vec<PointCloud>> {
    let count = read_u32(reader)?;
    let mut clouds = Vec::with_capacity(count.min(1024) as usize);

    for i in 0..count {
        let cloud = read_cloud(reader).map_err(|e| match e {
            Error::Malformed(msg) => Error::Malformed(format!("cloud {}: {}", i, msg)),
            other => other,
        })?;
        clouds.push(cloud);
    }

    debug!("decoded {} clouds", count);
    Ok(clouds)
}

/// Encode `clouds` into an in-memory container
pub fn encode<C: Borrow<PointCloud>>(clouds: &[C]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(encoded_len(clouds));
    write_clouds(&mut bytes, clouds)?;
    Ok(bytes)
}

/// Decode an in-memory container
///
/// Unlike [`read_clouds`], the buffer must hold exactly one container:
/// trailing bytes are reported as malformed.
pub fn decode(bytes: &[u8]) -> Result<Vec<PointCloud>> {
    let mut cursor = bytes;
    let clouds = read_clouds(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(Error::Malformed(format!(
            "{} trailing bytes after the last cloud",
            cursor.len()
        )));
    }
    Ok(clouds)
}

/// Write `clouds` to a container file at `path`
pub fn save_to_bin<P, C>(path: P, clouds: &[C]) -> Result<()>
where
    P: AsRef<Path>,
    C: Borrow<PointCloud>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_clouds(&mut writer, clouds)?;
    writer.flush()?;
    Ok(())
}

/// Read every cloud from the container file at `path`
pub fn load_from_bin<P: AsRef<Path>>(path: P) -> Result<Vec<PointCloud>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let clouds = read_clouds(&mut reader)?;

    let mut extra = [0u8; 1];
    if read_some(&mut reader, &mut extra)? != 0 {
        return Err(Error::Malformed(
            "trailing bytes after the last cloud".to_string(),
        ));
    }
    Ok(clouds)
}

/// Exact size in bytes of the container `clouds` encode to
pub fn encoded_len<C: Borrow<PointCloud>>(clouds: &[C]) -> usize {
    4 + clouds
        .iter()
        .map(|c| {
            let cloud = c.borrow();
            let name = cloud.name().map_or(0, |n| n.len() + 1);
            4 + 1 + name + cloud.len() * POINT_SIZE
        })
        .sum::<usize>()
}

fn validate(cloud: &PointCloud) -> Result<()> {
    to_u32(cloud.len(), "point count")?;
    if let Some(name) = cloud.name() {
        if name.as_bytes().contains(&0) {
            return Err(Error::InvalidData(format!(
                "cloud name {:?} contains a NUL byte",
                name
            )));
        }
    }
    Ok(())
}

fn write_cloud<W: Write>(writer: &mut W, cloud: &PointCloud) -> Result<()> {
    writer.write_u32::<LittleEndian>(to_u32(cloud.len(), "point count")?)?;

    match cloud.name() {
        Some(name) => {
            writer.write_u8(NAME_FLAG)?;
            writer.write_all(name.as_bytes())?;
            writer.write_u8(0)?;
        }
        None => writer.write_u8(0)?,
    }

    if cfg!(target_endian = "little") {
        writer.write_all(cloud.as_bytes())?;
    } else {
        for p in cloud.iter() {
            writer.write_f32::<LittleEndian>(p.x)?;
            writer.write_f32::<LittleEndian>(p.y)?;
            writer.write_f32::<LittleEndian>(p.z)?;
        }
    }

    if cloud.is_organized() {
        trace!(
            "grid layout {}x{} of cloud {:?} is not stored in the container",
            cloud.width(),
            cloud.height(),
            cloud.name()
        );
    }
    Ok(())
}

fn read_cloud<R: Read>(reader: &mut R) -> Result<PointCloud> {
    let len = read_u32(reader)? as usize;

    let mut flags = [0u8; 1];
    fill(reader, &mut flags)?;
    let flags = flags[0];
    if flags & !NAME_FLAG != 0 {
        return Err(Error::Malformed(format!("unknown flag bits {:#04x}", flags)));
    }

    let mut cloud = PointCloud::new();
    if flags & NAME_FLAG != 0 {
        cloud.set_name(read_name(reader)?);
    }

    let expected = len
        .checked_mul(POINT_SIZE)
        .ok_or_else(|| Error::Malformed(format!("point count {} is too large", len)))?;

    // Grow with the data actually present instead of trusting the header
    let mut bytes = Vec::new();
    reader.by_ref().take(expected as u64).read_to_end(&mut bytes)?;
    if bytes.len() < expected {
        return Err(Error::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    cloud.resize(len);
    let floats: &mut [f32] = bytemuck::cast_slice_mut(cloud.as_mut_slice());
    LittleEndian::read_f32_into(&bytes, floats);

    trace!("read cloud {:?} with {} points", cloud.name(), len);
    Ok(cloud)
}

fn read_name<R: Read>(reader: &mut R) -> Result<String> {
    let mut name = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        fill(reader, &mut byte)?;
        if byte[0] == 0 {
            break;
        }
        name.push(byte[0]);
    }

    String::from_utf8(name).map_err(|e| Error::Malformed(format!("cloud name is not UTF-8: {}", e)))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    fill(reader, &mut buf)?;
    Ok(LittleEndian::read_u32(&buf))
}

/// `read_exact` that reports how far it got before the stream ended
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_some(reader, &mut buf[filled..])? {
            0 => {
                return Err(Error::Truncated {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            n => filled += n,
        }
    }
    Ok(())
}

fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidData(format!("{} {} does not fit in u32", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlib_core::{Point, SharedPointCloud};
    use proptest::prelude::*;

    fn camera_clouds() -> Vec<PointCloud> {
        let unnamed = PointCloud::new();

        let mut camera1 = PointCloud::named("Camera 1");
        camera1.push(Point::new(1.0, 2.0, 3.0));

        let mut camera2 = PointCloud::named("Camera 2");
        camera2.push(Point::new(1.5, -2.5, 1e-3));
        camera2.push(Point::new(1.5, -2.5, 1e-3));

        vec![unnamed, camera1, camera2]
    }

    fn bits(cloud: &PointCloud) -> Vec<u32> {
        cloud
            .iter()
            .flat_map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
            .collect()
    }

    #[test]
    fn test_roundtrip_named_clouds() {
        let clouds = camera_clouds();
        let decoded = decode(&encode(&clouds).unwrap()).unwrap();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].name(), None);
        assert_eq!(decoded[1].name(), Some("Camera 1"));
        assert_eq!(decoded[2].name(), Some("Camera 2"));

        for (original, restored) in clouds.iter().zip(&decoded) {
            assert_eq!(original.len(), restored.len());
            assert_eq!(bits(original), bits(restored));
        }
    }

    #[test]
    fn test_exact_byte_layout() {
        let mut cloud = PointCloud::named("ab");
        cloud.push(Point::new(1.0, 2.0, 3.0));
        let plain = PointCloud::new();

        let bytes = encode(&[cloud, plain]).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.push(NAME_FLAG);
        expected.extend_from_slice(b"ab\0");
        for v in [1.0f32, 2.0, 3.0] {
            expected.extend_from_slice(&v.to_le_bytes());
        }
        expected.extend_from_slice(&0u32.to_le_bytes());
        expected.push(0);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encoded_len_matches() {
        let clouds = camera_clouds();
        assert_eq!(encode(&clouds).unwrap().len(), encoded_len(&clouds));
    }

    #[test]
    fn test_empty_container() {
        let clouds: Vec<PointCloud> = Vec::new();
        let bytes = encode(&clouds).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_layout_is_not_persisted() {
        let mut grid = PointCloud::organized(2, 1);
        grid.push(Point::new(0.0, 0.0, 1.0));
        grid.push(Point::new(1.0, 0.0, 1.0));

        let decoded = decode(&encode(&[grid]).unwrap()).unwrap();
        assert!(!decoded[0].is_organized());
        assert_eq!(decoded[0].len(), 2);
    }

    #[test]
    fn test_encode_shared_and_borrowed() {
        let shared: Vec<SharedPointCloud> = camera_clouds().into_iter().map(Into::into).collect();
        let owned = camera_clouds();
        let borrowed: Vec<&PointCloud> = owned.iter().collect();

        assert_eq!(encode(&shared).unwrap(), encode(&owned).unwrap());
        assert_eq!(encode(&borrowed).unwrap(), encode(&owned).unwrap());
    }

    #[test]
    fn test_name_with_nul_is_rejected() {
        let cloud = PointCloud::named("bad\0name");
        assert!(matches!(encode(&[cloud]), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_truncated_points() {
        let bytes = encode(&camera_clouds()).unwrap();
        let cut = &bytes[..bytes.len() - 5];
        match decode(cut) {
            Err(Error::Truncated { expected, actual }) => {
                assert_eq!(expected, 2 * POINT_SIZE);
                assert_eq!(actual, 2 * POINT_SIZE - 5);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_everywhere() {
        let bytes = encode(&camera_clouds()).unwrap();
        for end in 0..bytes.len() {
            assert!(
                matches!(decode(&bytes[..end]), Err(Error::Truncated { .. })),
                "prefix of {} bytes was not reported as truncated",
                end
            );
        }
    }

    #[test]
    fn test_unterminated_name() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(NAME_FLAG);
        bytes.extend_from_slice(b"no terminator");
        assert!(matches!(decode(&bytes), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_huge_point_count_fails_without_allocating() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&[0u8; 24]);
        assert!(matches!(decode(&bytes), Err(Error::Truncated { actual: 24, .. })));
    }

    #[test]
    fn test_unknown_flags_are_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(0x01);
        assert!(matches!(decode(&bytes), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_non_utf8_name_is_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(NAME_FLAG);
        bytes.extend_from_slice(&[0xff, 0xfe, 0]);
        assert!(matches!(decode(&bytes), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&camera_clouds()).unwrap();
        bytes.push(7);
        assert!(matches!(decode(&bytes), Err(Error::Malformed(_))));

        // The streaming reader stops after the declared clouds
        let mut cursor = bytes.as_slice();
        assert_eq!(read_clouds(&mut cursor).unwrap().len(), 3);
        assert_eq!(cursor, &[7]);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clouds.bin");

        let clouds = camera_clouds();
        save_to_bin(&path, &clouds).unwrap();
        let loaded = load_from_bin(&path).unwrap();

        assert_eq!(loaded.len(), clouds.len());
        assert_eq!(bits(&loaded[2]), bits(&clouds[2]));
        assert_eq!(std::fs::read(&path).unwrap(), encode(&clouds).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_from_bin(dir.path().join("nope.bin")), Err(Error::Io(_))));
    }

    fn arb_cloud() -> impl Strategy<Value = PointCloud> {
        (
            prop::option::of("[a-zA-Z0-9 _-]{1,12}"),
            prop::collection::vec(
                (-1e6f32..1e6f32, -1e6f32..1e6f32, -1e6f32..1e6f32),
                0..32,
            ),
        )
            .prop_map(|(name, pts)| {
                let mut cloud: PointCloud =
                    pts.into_iter().map(|(x, y, z)| Point::new(x, y, z)).collect();
                if let Some(name) = name {
                    cloud.set_name(name);
                }
                cloud
            })
    }

    proptest! {
        #[test]
        fn reencoding_is_byte_identical(clouds in prop::collection::vec(arb_cloud(), 0..6)) {
            let first = encode(&clouds).unwrap();
            let second = encode(&decode(&first).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
