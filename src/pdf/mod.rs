//! # PDF Serializer
//!
//! Takes the pages recorded on a [`PageCanvas`](crate::canvas::PageCanvas)
//! and writes a PDF 1.7 file byte by byte.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! Standard PDF fonts use simple Type1 references with WinAnsiEncoding.
//! Custom TrueType fonts are embedded whole as CIDFontType2 with Identity-H
//! encoding, producing 5 PDF objects per font: FontFile2, FontDescriptor,
//! CIDFont, ToUnicode CMap, and the root Type0 dictionary.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{CanvasDocument, CanvasPage, DrawOp};
use crate::error::NotaError;
use crate::font::{FontData, FontRole, FontSet};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::model::{Color, Metadata};

pub struct PdfWriter;

/// Glyph lookup for an embedded font.
struct CustomFontEmbedData {
    char_to_gid: HashMap<char, u16>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font role -> Type0/Type1 object id. Resource names are /F0, /F1, ...
    /// in role order.
    font_objects: Vec<(FontRole, usize)>,
    custom_font_data: HashMap<FontRole, CustomFontEmbedData>,
    /// XObject ids, indexed like the canvas image handles (/Im0, /Im1, ...).
    image_objects: Vec<usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    /// Push a stream object, compressing `content` with Flate.
    fn push_flate_stream(&mut self, dict_entries: &str, content: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(content, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< {}/Length {} /Filter /FlateDecode >>\nstream\n",
            dict_entries,
            compressed.len()
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, role: FontRole) -> Option<usize> {
        self.font_objects.iter().position(|(r, _)| *r == role)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a finished canvas to a PDF byte vector.
    pub fn write(
        &self,
        document: &CanvasDocument,
        metadata: &Metadata,
        fonts: &FontSet,
    ) -> Result<Vec<u8>, NotaError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            custom_font_data: HashMap::new(),
            image_objects: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, &document.pages, fonts)?;

        for image in &document.images {
            let id = Self::write_image_xobject(&mut builder, image);
            builder.image_objects.push(id);
        }

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in &document.pages {
            let content = self.build_content_stream(page, &builder);
            let content_obj_id = builder.push_flate_stream("", content.as_bytes());

            let font_resources = self.build_font_resource_dict(&builder);
            let xobject_resources = self.build_xobject_resource_dict(page, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let _ = write!(
            info,
            "/Producer (Nota {}) /Creator (Nota) >>",
            env!("CARGO_PKG_VERSION")
        );
        let info_obj_id = builder.push(info.into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &CanvasPage, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for op in &page.ops {
            self.write_op(&mut stream, op, builder);
        }
        stream
    }

    fn write_op(&self, stream: &mut String, op: &DrawOp, builder: &PdfBuilder) {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                role,
                size,
                color,
            } => {
                let Some(idx) = builder.font_index(*role) else {
                    return;
                };
                let _ = write!(
                    stream,
                    "BT\n{}/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                    fill(color),
                    idx,
                    size,
                    x,
                    y
                );
                match builder.custom_font_data.get(role) {
                    Some(embed) => {
                        let mut hex = String::new();
                        for ch in text.chars() {
                            let gid = embed.char_to_gid.get(&ch).copied().unwrap_or(0);
                            let _ = write!(hex, "{:04X}", gid);
                        }
                        let _ = write!(stream, "<{}> Tj\n", hex);
                    }
                    None => {
                        let _ = write!(stream, "({}) Tj\n", Self::encode_winansi(text));
                    }
                }
                stream.push_str("ET\n");
            }

            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
                dash,
            } => {
                let _ = write!(stream, "q\n{}{:.2} w\n", stroke(color), width);
                if let Some((on, off)) = dash {
                    let _ = write!(stream, "[{:.2} {:.2}] 0 d\n", on, off);
                }
                let _ = write!(
                    stream,
                    "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    x1, y1, x2, y2
                );
            }

            DrawOp::Image {
                handle,
                x,
                y,
                width,
                height,
            } => {
                if handle.index() < builder.image_objects.len() {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        width,
                        height,
                        x,
                        y,
                        handle.index()
                    );
                }
            }
        }
    }

    /// Register every font role drawn with. Each role gets its own PDF font
    /// object. Roles are sorted so output is deterministic.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[CanvasPage],
        fonts: &FontSet,
    ) -> Result<(), NotaError> {
        let mut used: BTreeMap<FontRole, BTreeSet<char>> = BTreeMap::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { role, text, .. } = op {
                    used.entry(*role).or_default().extend(text.chars());
                }
            }
        }

        // A page resource dict needs at least one font.
        if used.is_empty() {
            used.insert(FontRole::Regular, BTreeSet::new());
        }

        for (role, chars) in &used {
            let obj_id = match fonts.get(*role) {
                FontData::Standard(std_font) => builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    )
                    .into_bytes(),
                ),
                FontData::Custom { name, data, .. } => {
                    Self::write_custom_font_objects(builder, *role, name, data, chars)?
                }
            };
            builder.font_objects.push((*role, obj_id));
        }
        Ok(())
    }

    /// Write the 5 CIDFont PDF objects for a custom TrueType font.
    /// Returns the object ID of the Type0 root font dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        role: FontRole,
        name: &str,
        ttf_data: &[u8],
        used_chars: &BTreeSet<char>,
    ) -> Result<usize, NotaError> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| NotaError::Font(format!("Failed to parse TTF data for font '{}': {}", name, e)))?;

        let units_per_em = face.units_per_em();
        let scale = 1000.0 / units_per_em as f64;

        let char_to_gid: HashMap<char, u16> = used_chars
            .iter()
            .filter_map(|&ch| face.glyph_index(ch).map(|gid| (ch, gid.0)))
            .collect();

        let pdf_font_name = Self::sanitize_font_name(name, role);

        // 1. FontFile2 stream
        let fontfile2_id =
            builder.push_flate_stream(&format!("/Length1 {} ", ttf_data.len()), ttf_data);

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let ascender = face.ascender();
        let cap_height = face.capital_height().unwrap_or(ascender) as f64 * scale;
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle {} \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
            if role == FontRole::Italic { -12 } else { 0 },
            (ascender as f64 * scale) as i32,
            (face.descender() as f64 * scale) as i32,
            cap_height as i32,
            if role == FontRole::Bold { 120 } else { 80 },
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont dictionary (DescendantFont)
        let w_array = Self::build_w_array(&char_to_gid, &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let tounicode_id = builder.push_flate_stream("", cmap_content.as_bytes());

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        let type0_id = builder.push(type0_dict.into_bytes());

        builder
            .custom_font_data
            .insert(role, CustomFontEmbedData { char_to_gid });

        Ok(type0_id)
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(
        char_to_gid: &HashMap<char, u16>,
        face: &ttf_parser::Face,
        units_per_em: u16,
    ) -> String {
        let scale = 1000.0 / units_per_em as f64;

        let gids: BTreeSet<u16> = char_to_gid.values().copied().collect();
        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, u32)> = char_to_gid
            .iter()
            .map(|(&ch, &gid)| (gid, ch as u32))
            .collect();
        gid_to_unicode.sort_unstable();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = write!(cmap, "/CMapName /{}-UTF16 def\n", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        // beginbfchar blocks hold at most 100 entries
        for chunk in gid_to_unicode.chunks(100) {
            let _ = write!(cmap, "{} beginbfchar\n", chunk.len());
            for &(gid, unicode) in chunk {
                let _ = write!(cmap, "<{:04X}> <{:04X}>\n", gid, unicode);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }

    /// Strip a font name down to a valid PDF name, suffixed by role.
    fn sanitize_font_name(name: &str, role: FontRole) -> String {
        let mut clean: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if clean.is_empty() {
            clean = "CustomFont".to_string();
        }
        match role {
            FontRole::Regular => {}
            FontRole::Bold => clean.push_str("-Bold"),
            FontRole::Italic => clean.push_str("-Italic"),
        }
        clean
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let dims = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8 ",
            image.width_px, image.height_px
        );

        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< {}/ColorSpace {} /Filter /DCTDecode /Length {} >>\nstream\n",
                    dims,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha_data| {
                        let id = builder.push_flate_stream(
                            &format!("{}/ColorSpace /DeviceGray ", dims),
                            alpha_data,
                        );
                        format!("/SMask {} 0 R ", id)
                    })
                    .unwrap_or_default();
                builder.push_flate_stream(
                    &format!("{}/ColorSpace /DeviceRGB {}", dims, smask_ref),
                    rgb,
                )
            }

            ImagePixelData::Gray(luma) => {
                builder.push_flate_stream(&format!("{}/ColorSpace /DeviceGray ", dims), luma)
            }
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The /XObject resource entries for the images a page draws.
    fn build_xobject_resource_dict(&self, page: &CanvasPage, builder: &PdfBuilder) -> String {
        let used: BTreeSet<usize> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { handle, .. } => Some(handle.index()),
                _ => None,
            })
            .filter(|idx| *idx < builder.image_objects.len())
            .collect();
        used.iter()
            .map(|idx| format!("/Im{} {} 0 R", idx, builder.image_objects[*idx]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    /// Encode text for a WinAnsi string literal, escaping as needed.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly; 0x80..=0x9F holds the
    /// typographic extras.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // Ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // Curly quotes
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99), // Trade mark
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn fill(c: &Color) -> String {
    format!("{:.4} {:.4} {:.4} rg\n", c.r, c.g, c.b)
}

fn stroke(c: &Color) -> String {
    format!("{:.4} {:.4} {:.4} RG\n", c.r, c.g, c.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageCanvas;
    use crate::font::StandardFamily;

    fn write(canvas: PageCanvas, fonts: &FontSet, metadata: &Metadata) -> String {
        let bytes = PdfWriter::new().write(&canvas.finish(), metadata, fonts).unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(PdfWriter::escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let fonts = FontSet::standard(StandardFamily::Helvetica);
        let canvas = PageCanvas::new(&fonts, (595.28, 841.89));
        let text = write(canvas, &fonts, &Metadata::default());

        assert!(text.starts_with("%PDF-1.7"));
        assert!(text.contains("%%EOF"));
        assert!(text.contains("xref"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_title_in_info_dict() {
        let fonts = FontSet::standard(StandardFamily::Helvetica);
        let canvas = PageCanvas::new(&fonts, (595.28, 841.89));
        let metadata = Metadata {
            title: Some("HCX/INV/2024/III/17".to_string()),
            ..Default::default()
        };
        let text = write(canvas, &fonts, &metadata);
        assert!(text.contains("/Title (HCX/INV/2024/III/17)"));
    }

    #[test]
    fn test_each_role_gets_its_own_font() {
        let fonts = FontSet::standard(StandardFamily::Helvetica);
        let mut canvas = PageCanvas::new(&fonts, (595.28, 841.89));
        canvas.set_font(FontRole::Regular, 10.0);
        canvas.draw_string(10.0, 10.0, "Subtotal");
        canvas.set_font(FontRole::Bold, 10.0);
        canvas.draw_string(10.0, 30.0, "Total");

        let text = write(canvas, &fonts, &Metadata::default());
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(!text.contains("Helvetica-Oblique"));
        assert!(!text.contains("CIDFontType2"));
    }

    #[test]
    fn test_gray_image_written_once() {
        let fonts = FontSet::standard(StandardFamily::Courier);
        let mut canvas = PageCanvas::new(&fonts, (100.0, 100.0));
        let handle = canvas.add_image(LoadedImage::from_gray_image(&image::GrayImage::new(4, 4)));
        canvas.draw_image(handle, 0.0, 0.0, 10.0, 10.0);
        canvas.draw_image(handle, 50.0, 0.0, 10.0, 10.0);

        let text = write(canvas, &fonts, &Metadata::default());
        assert_eq!(text.matches("/Subtype /Image").count(), 1);
        assert!(text.contains("/ColorSpace /DeviceGray"));
        assert!(text.contains("/XObject << /Im0"));
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(PdfWriter::encode_winansi("Rp (1)"), "Rp \\(1\\)");
        assert_eq!(PdfWriter::encode_winansi("é"), "\\351");
        assert_eq!(PdfWriter::encode_winansi("\u{2014}"), "\\227");
        assert_eq!(PdfWriter::encode_winansi("\u{4E00}"), "?");
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(PdfWriter::sanitize_font_name("Ubuntu Regular", FontRole::Regular), "UbuntuRegular");
        assert_eq!(PdfWriter::sanitize_font_name("Ubuntu-B", FontRole::Bold), "Ubuntu-B-Bold");
        assert_eq!(PdfWriter::sanitize_font_name("!!!", FontRole::Italic), "CustomFont-Italic");
    }

    #[test]
    fn test_tounicode_cmap_format() {
        let mut map = HashMap::new();
        map.insert('A', 36u16);
        let cmap = PdfWriter::build_tounicode_cmap(&map, "Test");
        assert!(cmap.contains("1 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("/CMapName /Test-UTF16 def"));
    }
}
