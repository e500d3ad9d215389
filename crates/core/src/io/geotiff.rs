//! Native GeoTIFF reading/writing
//!
//! Single-band grayscale TIFF via the `tiff` crate. Georeferencing is
//! carried through the ModelPixelScale (33550) and ModelTiepoint (33922)
//! tags; rasters without them get the default transform. Output is
//! written as 32-bit float, which covers every layer type demflow
//! produces.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;

/// Read a single-band GeoTIFF into a raster.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read TIFF dimensions: {e}")))?;

    let rows = height as usize;
    let cols = width as usize;

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read TIFF data: {e}")))?;

    let data: Vec<T> = match image {
        DecodingResult::U8(buf) => cast_buffer(&buf)?,
        DecodingResult::U16(buf) => cast_buffer(&buf)?,
        DecodingResult::U32(buf) => cast_buffer(&buf)?,
        DecodingResult::I8(buf) => cast_buffer(&buf)?,
        DecodingResult::I16(buf) => cast_buffer(&buf)?,
        DecodingResult::I32(buf) => cast_buffer(&buf)?,
        DecodingResult::F32(buf) => cast_buffer(&buf)?,
        DecodingResult::F64(buf) => cast_buffer(&buf)?,
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = read_transform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

fn cast_buffer<S, T>(buf: &[S]) -> Result<Vec<T>>
where
    S: Copy + num_traits::NumCast + std::fmt::Debug,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| {
            num_traits::cast(v)
                .ok_or_else(|| Error::UnsupportedDataType(format!("value {v:?} does not fit")))
        })
        .collect()
}

/// Recover the geotransform from the pixel-scale and tiepoint tags.
fn read_transform<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [sx, sy, sz]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Write a raster as a single-band 32-bit float GeoTIFF.
///
/// The raster's transform is re-emitted through the same two tags the
/// reader consumes, so direction and accumulation outputs inherit the
/// input's georeferencing unchanged.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {e}")))?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {e}")))?;

    let gt = raster.transform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {e}")))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {e}")))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write TIFF data: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geotiff_roundtrip() {
        let mut raster = Raster::from_vec(vec![0i32, 1, 2, 3, 40, 5], 2, 3).unwrap();
        raster.set_transform(GeoTransform::new(76.0, 37.0, 0.001, -0.001));

        let file = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&raster, file.path()).unwrap();

        let reloaded: Raster<i32> = read_geotiff(file.path()).unwrap();
        assert_eq!(reloaded.shape(), (2, 3));
        assert_eq!(reloaded.data(), raster.data());

        let gt = reloaded.transform();
        assert!((gt.origin_x - 76.0).abs() < 1e-9);
        assert!((gt.origin_y - 37.0).abs() < 1e-9);
        assert!((gt.pixel_width - 0.001).abs() < 1e-9);
        assert!((gt.pixel_height + 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_geotiff_direction_codes_roundtrip() {
        let codes = vec![0u8, 1, 2, 4, 8, 16, 32, 64, 128];
        let raster = Raster::from_vec(codes.clone(), 3, 3).unwrap();

        let file = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&raster, file.path()).unwrap();

        let reloaded: Raster<u8> = read_geotiff(file.path()).unwrap();
        let flat: Vec<u8> = reloaded.data().iter().copied().collect();
        assert_eq!(flat, codes);
    }
}
