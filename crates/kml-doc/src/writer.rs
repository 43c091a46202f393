//! KML serialization with quick-xml

use std::io::Write;

use anyhow::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Document, IconStyle, Placemark, StyleMap, KML_NAMESPACE};

/// Render a document as indented KML, newline terminated
pub fn write_document(doc: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    start(&mut writer, "Document")?;
    for placemark in doc.placemarks() {
        write_placemark(&mut writer, placemark)?;
    }
    end(&mut writer, "Document")?;
    end(&mut writer, "kml")?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_placemark<W: Write>(writer: &mut Writer<W>, placemark: &Placemark) -> Result<()> {
    start(writer, "Placemark")?;
    text_element(writer, "name", placemark.name())?;

    if let Some(description) = placemark.description() {
        start(writer, "description")?;
        // CDATA cannot contain its own terminator
        if description.contains("]]>") {
            writer.write_event(Event::Text(BytesText::from_escaped(escape(description))))?;
        } else {
            writer.write_event(Event::CData(BytesCData::new(description)))?;
        }
        end(writer, "description")?;
    }

    if let Some(style_map) = placemark.style_map() {
        write_style_map(writer, style_map)?;
    }

    if let Some((longitude, latitude)) = placemark.coordinates() {
        start(writer, "Point")?;
        text_element(writer, "coordinates", &format!("{},{},0", longitude, latitude))?;
        end(writer, "Point")?;
    }

    end(writer, "Placemark")
}

fn write_style_map<W: Write>(writer: &mut Writer<W>, style_map: &StyleMap) -> Result<()> {
    start(writer, "StyleMap")?;
    for (key, style) in [("normal", &style_map.normal), ("highlight", &style_map.highlight)] {
        start(writer, "Pair")?;
        text_element(writer, "key", key)?;
        write_icon_style(writer, style)?;
        end(writer, "Pair")?;
    }
    end(writer, "StyleMap")
}

fn write_icon_style<W: Write>(writer: &mut Writer<W>, style: &IconStyle) -> Result<()> {
    start(writer, "Style")?;
    start(writer, "IconStyle")?;
    text_element(writer, "scale", &style.scale.to_string())?;
    start(writer, "Icon")?;
    text_element(writer, "href", &style.href)?;
    end(writer, "Icon")?;
    end(writer, "IconStyle")?;
    end(writer, "Style")
}

fn start<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    start(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, tag)
}
