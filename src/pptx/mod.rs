//! Minimal in-memory writer for PresentationML packages.
//!
//! Covers exactly what the slide renderer needs: one blank master, layout
//! and theme, plus per-slide text boxes, solid rectangles and pictures at
//! absolute positions. Parts are composed as XML strings and zipped into
//! the `.pptx` container.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::CompressionMethod;

use crate::core::{EngineError, EngineResult};

/// English Metric Units, the drawing coordinate space of OOXML.
pub type Emu = i64;

pub const EMU_PER_INCH: Emu = 914_400;

/// 16:9 deck, 13.333" x 7.5".
pub const SLIDE_WIDTH: Emu = 12_192_000;
pub const SLIDE_HEIGHT: Emu = 6_858_000;

pub fn inches(value: f64) -> Emu {
    (value * EMU_PER_INCH as f64).round() as Emu
}

/// Replaces the XML-reserved characters in text content.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn code(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// One paragraph of a text box. Runs are single-styled; stacking several
/// lines in one box is how the renderer builds headings with subtitles.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub text: String,
    pub size_pt: u32,
    pub color: u32,
    pub bold: bool,
    pub align: Align,
}

impl TextLine {
    pub fn new(text: impl Into<String>, size_pt: u32, color: u32) -> Self {
        TextLine { text: text.into(), size_pt, color, bold: false, align: Align::Left }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn to_xml(&self) -> String {
        let algn = self.align.code();
        let sz = self.size_pt * 100;
        let bold = if self.bold { " b=\"1\"" } else { "" };
        if self.text.is_empty() {
            return format!(
                "<a:p><a:pPr algn=\"{algn}\"/><a:endParaRPr lang=\"en-US\" sz=\"{sz}\"/></a:p>"
            );
        }
        format!(
            "<a:p><a:pPr algn=\"{algn}\"/><a:r><a:rPr lang=\"en-US\" sz=\"{sz}\"{bold} dirty=\"0\"><a:solidFill><a:srgbClr val=\"{color:06X}\"/></a:solidFill></a:rPr><a:t>{text}</a:t></a:r></a:p>",
            color = self.color,
            text = escape_xml(&self.text),
        )
    }
}

/// Handle to a PNG registered on the package, shareable across slides.
#[derive(Debug, Clone, Copy)]
pub struct MediaRef(usize);

/// Accumulates the shapes of one slide in z-order.
#[derive(Debug, Default)]
pub struct SlideBuilder {
    shapes: Vec<String>,
    /// Package media indices referenced by this slide, in rel order.
    media: Vec<usize>,
    shape_count: u32,
}

impl SlideBuilder {
    pub fn new() -> Self {
        SlideBuilder::default()
    }

    // Shape id 1 belongs to the group container.
    fn next_shape_id(&mut self) -> u32 {
        self.shape_count += 1;
        self.shape_count + 1
    }

    pub fn text_box(&mut self, x: Emu, y: Emu, w: Emu, h: Emu, lines: &[TextLine]) {
        let id = self.next_shape_id();
        let paragraphs: String = lines.iter().map(TextLine::to_xml).collect();
        self.shapes.push(format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Text {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{w}\" cy=\"{h}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
<p:txBody><a:bodyPr wrap=\"square\" lIns=\"0\" tIns=\"0\" rIns=\"0\" bIns=\"0\"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"
        ));
    }

    pub fn rect(&mut self, x: Emu, y: Emu, w: Emu, h: Emu, color: u32) {
        let id = self.next_shape_id();
        self.shapes.push(format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Rect {id}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{w}\" cy=\"{h}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val=\"{color:06X}\"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr>\
<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody></p:sp>"
        ));
    }

    pub fn picture(&mut self, media: MediaRef, x: Emu, y: Emu, w: Emu, h: Emu) {
        let rid = match self.media.iter().position(|&m| m == media.0) {
            Some(slot) => slot + 2,
            None => {
                self.media.push(media.0);
                self.media.len() + 1
            }
        };
        let id = self.next_shape_id();
        self.shapes.push(format!(
            "<p:pic><p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Picture {id}\"/><p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
<p:blipFill><a:blip r:embed=\"rId{rid}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{w}\" cy=\"{h}\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>"
        ));
    }

    fn part_xml(&self) -> String {
        format!(
            "{XML_DECL}<p:sld {NS}><p:cSld><p:spTree>\
<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
            shapes = self.shapes.concat(),
        )
    }

    fn rels_xml(&self) -> String {
        let mut rels = String::from(
            "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>",
        );
        for (slot, media_index) in self.media.iter().enumerate() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{rid}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{image}.png\"/>",
                rid = slot + 2,
                image = media_index + 1,
            ));
        }
        format!("{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>")
    }
}

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

const NS: &str = "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"";

/// A whole presentation: ordered slides plus shared PNG media.
pub struct Package {
    title: String,
    slides: Vec<SlideBuilder>,
    media: Vec<Vec<u8>>,
}

impl Package {
    pub fn new(title: impl Into<String>) -> Self {
        Package { title: title.into(), slides: Vec::new(), media: Vec::new() }
    }

    /// Registers a PNG once; the same handle may be placed on many slides.
    pub fn add_png(&mut self, bytes: Vec<u8>) -> MediaRef {
        self.media.push(bytes);
        MediaRef(self.media.len() - 1)
    }

    pub fn push_slide(&mut self, slide: SlideBuilder) {
        self.slides.push(slide);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Serializes the package. Part contents carry no timestamps and the
    /// archive uses a fixed modification time, so identical input produces
    /// identical bytes.
    pub fn save_to_buffer(&self) -> EngineResult<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut write_part = |zip: &mut zip::ZipWriter<Cursor<Vec<u8>>>,
                              name: &str,
                              bytes: &[u8]|
         -> EngineResult<()> {
            zip.start_file(name, options)
                .map_err(|e| EngineError::Render(format!("slide package entry {name}: {e}")))?;
            zip.write_all(bytes)?;
            Ok(())
        };

        write_part(&mut zip, "[Content_Types].xml", self.content_types().as_bytes())?;
        write_part(&mut zip, "_rels/.rels", Self::root_rels().as_bytes())?;
        write_part(&mut zip, "docProps/core.xml", self.core_props().as_bytes())?;
        write_part(&mut zip, "docProps/app.xml", Self::app_props().as_bytes())?;
        write_part(&mut zip, "ppt/presentation.xml", self.presentation().as_bytes())?;
        write_part(&mut zip, "ppt/_rels/presentation.xml.rels", self.presentation_rels().as_bytes())?;
        write_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", Self::slide_master().as_bytes())?;
        write_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            Self::master_rels().as_bytes(),
        )?;
        write_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", Self::slide_layout().as_bytes())?;
        write_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            Self::layout_rels().as_bytes(),
        )?;
        write_part(&mut zip, "ppt/theme/theme1.xml", Self::theme().as_bytes())?;

        for (index, slide) in self.slides.iter().enumerate() {
            write_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", index + 1),
                slide.part_xml().as_bytes(),
            )?;
            write_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
                slide.rels_xml().as_bytes(),
            )?;
        }
        for (index, bytes) in self.media.iter().enumerate() {
            write_part(&mut zip, &format!("ppt/media/image{}.png", index + 1), bytes)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| EngineError::Render(format!("slide package finish: {e}")))?;
        Ok(cursor.into_inner())
    }

    fn content_types(&self) -> String {
        let mut overrides = String::new();
        for index in 1..=self.slides.len() {
            overrides.push_str(&format!(
                "<Override PartName=\"/ppt/slides/slide{index}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
            ));
        }
        format!(
            "{XML_DECL}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Default Extension=\"png\" ContentType=\"image/png\"/>\
<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
{overrides}\
<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>\
</Types>"
        )
    }

    fn root_rels() -> String {
        format!(
            "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"ppt/presentation.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
<Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties\" Target=\"docProps/app.xml\"/>\
</Relationships>"
        )
    }

    fn core_props(&self) -> String {
        format!(
            "{XML_DECL}<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:title>{title}</dc:title><dc:creator>studio-docs</dc:creator></cp:coreProperties>",
            title = escape_xml(&self.title),
        )
    }

    fn app_props() -> String {
        format!(
            "{XML_DECL}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
<Application>studio-docs</Application></Properties>"
        )
    }

    fn presentation(&self) -> String {
        let mut slide_ids = String::new();
        for index in 0..self.slides.len() {
            slide_ids.push_str(&format!(
                "<p:sldId id=\"{id}\" r:id=\"rId{rid}\"/>",
                id = 256 + index,
                rid = index + 2,
            ));
        }
        format!(
            "{XML_DECL}<p:presentation {NS}>\
<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
<p:sldIdLst>{slide_ids}</p:sldIdLst>\
<p:sldSz cx=\"{SLIDE_WIDTH}\" cy=\"{SLIDE_HEIGHT}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
</p:presentation>"
        )
    }

    fn presentation_rels(&self) -> String {
        let mut rels = String::from(
            "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
        );
        for index in 0..self.slides.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{rid}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{slide}.xml\"/>",
                rid = index + 2,
                slide = index + 1,
            ));
        }
        format!("{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>")
    }

    fn empty_sp_tree() -> &'static str {
        "<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr></p:spTree>"
    }

    fn slide_master() -> String {
        format!(
            "{XML_DECL}<p:sldMaster {NS}><p:cSld>\
<p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"FFFFFF\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>\
{tree}</p:cSld>\
<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
</p:sldMaster>",
            tree = Self::empty_sp_tree(),
        )
    }

    fn master_rels() -> String {
        format!(
            "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme\" Target=\"../theme/theme1.xml\"/>\
</Relationships>"
        )
    }

    fn slide_layout() -> String {
        format!(
            "{XML_DECL}<p:sldLayout {NS} type=\"blank\" preserve=\"1\"><p:cSld name=\"Blank\">{tree}</p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
            tree = Self::empty_sp_tree(),
        )
    }

    fn layout_rels() -> String {
        format!(
            "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"../slideMasters/slideMaster1.xml\"/>\
</Relationships>"
        )
    }

    // A schema-complete theme is required by the master part even though
    // every shape in the deck carries explicit colors.
    fn theme() -> String {
        let fills = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>".repeat(3);
        let lines = [6350, 12700, 19050]
            .iter()
            .map(|w| format!("<a:ln w=\"{w}\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>"))
            .collect::<String>();
        let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);
        format!(
            "{XML_DECL}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Studio\"><a:themeElements>\
<a:clrScheme name=\"Studio\">\
<a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
<a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"2E2A26\"/></a:dk2>\
<a:lt2><a:srgbClr val=\"EFECE6\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"B0865A\"/></a:accent1>\
<a:accent2><a:srgbClr val=\"E3B448\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"7FA88F\"/></a:accent3>\
<a:accent4><a:srgbClr val=\"A56E7F\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"5E7B9B\"/></a:accent5>\
<a:accent6><a:srgbClr val=\"53828B\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"5E7B9B\"/></a:hlink>\
<a:folHlink><a:srgbClr val=\"8064A2\"/></a:folHlink>\
</a:clrScheme>\
<a:fontScheme name=\"Studio\">\
<a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme>\
<a:fmtScheme name=\"Office\">\
<a:fillStyleLst>{fills}</a:fillStyleLst>\
<a:lnStyleLst>{lines}</a:lnStyleLst>\
<a:effectStyleLst>{effects}</a:effectStyleLst>\
<a:bgFillStyleLst>{fills}</a:bgFillStyleLst>\
</a:fmtScheme></a:themeElements></a:theme>"
        )
    }
}
