//! JPEG fixtures built in memory

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// A small JPEG with no metadata
pub fn plain_jpeg() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([30, 160, 90])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn dms(tag: Tag, [d, m, s]: [u32; 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            [d, m, s]
                .into_iter()
                .map(|num| Rational { num, denom: 1 })
                .collect(),
        ),
    }
}

fn with_exif(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    // APP1 segment right after SOI
    let jpeg = plain_jpeg();
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A JPEG geotagged with the given magnitudes and hemisphere references
pub fn geotagged_jpeg(lat: [u32; 3], lat_ref: &str, lon: [u32; 3], lon_ref: &str) -> Vec<u8> {
    with_exif(&[
        ascii(Tag::Make, "photo2kml"),
        ascii(Tag::GPSLatitudeRef, lat_ref),
        dms(Tag::GPSLatitude, lat),
        ascii(Tag::GPSLongitudeRef, lon_ref),
        dms(Tag::GPSLongitude, lon),
    ])
}

/// A JPEG with camera EXIF but no GPS block
pub fn untagged_jpeg() -> Vec<u8> {
    with_exif(&[ascii(Tag::Make, "photo2kml"), ascii(Tag::Model, "indoor")])
}
