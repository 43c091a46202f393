//! Photo access for photo2kml
//!
//! [`Photo`] owns the open file for the duration of a metadata read. The
//! format is sniffed and the header decoded with `image` so non-images are
//! rejected up front; the EXIF container is then parsed with `kamadak-exif`
//! and flattened into [`RawMetadata`], with GPS fields nested under the
//! GPS-block pointer tag.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageFormat, ImageReader};
use tracing::debug;

use crate::extract::extract;
use crate::metadata::Metadata;
use crate::raw::{Fraction, RawEntry, RawMetadata, RawValue};
use crate::tags::GPS_INFO_TAG;

/// An opened, validated image file. Dropping it closes the file.
pub struct Photo {
    path: PathBuf,
    reader: BufReader<File>,
    format: ImageFormat,
    dimensions: (u32, u32),
}

impl Photo {
    /// Open a file and check that it decodes as an image
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let sniffed = ImageReader::new(&mut reader)
            .with_guessed_format()
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let format = sniffed
            .format()
            .with_context(|| format!("Not a recognized image format: {}", path.display()))?;
        let dimensions = sniffed
            .into_dimensions()
            .with_context(|| format!("Failed to decode image header: {}", path.display()))?;

        debug!(
            "opened {} ({:?}, {}x{})",
            path.display(),
            format,
            dimensions.0,
            dimensions.1
        );

        Ok(Self {
            path,
            reader,
            format,
            dimensions,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// The embedded EXIF block, or `None` when the image has none
    pub fn raw_metadata(&mut self) -> Result<Option<RawMetadata>> {
        self.reader
            .rewind()
            .with_context(|| format!("Failed to rewind {}", self.path.display()))?;

        match exif::Reader::new().read_from_container(&mut self.reader) {
            Ok(exif) => Ok(Some(raw_metadata_from_exif(&exif))),
            Err(exif::Error::NotFound(_)) => Ok(None),
            Err(err) => {
                debug!("no readable EXIF in {}: {}", self.path.display(), err);
                Ok(None)
            }
        }
    }
}

/// Open a photo, read its metadata and close it again
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    let raw = {
        let mut photo = Photo::open(path)?;
        photo.raw_metadata()?
    };
    Ok(extract(raw.as_ref()))
}

fn is_ifd_pointer(tag: exif::Tag) -> bool {
    tag == exif::Tag::ExifIFDPointer
        || tag == exif::Tag::GPSInfoIFDPointer
        || tag == exif::Tag::InteropIFDPointer
}

fn raw_metadata_from_exif(exif: &exif::Exif) -> RawMetadata {
    let mut entries = Vec::new();
    let mut gps = Vec::new();

    for field in exif.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
        if is_ifd_pointer(field.tag) {
            continue;
        }
        let Some(value) = raw_value(&field.value) else {
            debug!("dropping {} with undecodable value type", field.tag);
            continue;
        };
        let entry = RawEntry::new(field.tag.number(), value);
        match field.tag.context() {
            exif::Context::Gps => gps.push(entry),
            exif::Context::Interop => {}
            _ => entries.push(entry),
        }
    }

    if !gps.is_empty() {
        entries.push(RawEntry::new(GPS_INFO_TAG, RawValue::Ifd(gps)));
    }
    RawMetadata::new(entries)
}

/// `None` for values stored with a type the EXIF reader does not know
fn raw_value(value: &exif::Value) -> Option<RawValue> {
    use exif::Value;

    let raw = match value {
        Value::Byte(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::Short(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::Long(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::SByte(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::SShort(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::SLong(v) => RawValue::integers(v.iter().map(|&x| x as i64)),
        Value::Float(v) => RawValue::reals(v.iter().map(|&x| x as f64)),
        Value::Double(v) => RawValue::reals(v.iter().copied()),
        Value::Rational(v) => RawValue::fractions(
            v.iter().map(|r| Fraction::new(r.num as i64, r.denom as i64)),
        ),
        Value::SRational(v) => RawValue::fractions(
            v.iter().map(|r| Fraction::new(r.num as i64, r.denom as i64)),
        ),
        Value::Ascii(strings) => RawValue::Text(
            strings
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Undefined(bytes, _) => RawValue::Bytes(bytes.clone()),
        Value::Unknown(..) => return None,
    };
    Some(raw)
}
