//! Event based writing of the element tree.
use crate::{xml_safe, ValueEncoding, XmlOptions};
use dicom_tree_core::{DataElement, HasLength, Header};
use dicom_tree_object::DicomFile;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Result, Write};

/// The name of the root node.
const ROOT: &str = "DICOM";

pub(crate) struct XmlSerializer<W> {
    writer: Writer<W>,
    encoding: ValueEncoding,
    declaration: bool,
}

impl<W> XmlSerializer<W>
where
    W: Write,
{
    pub fn new(to: W, options: &XmlOptions) -> Self {
        let writer = if options.indent > 0 {
            Writer::new_with_indent(to, b' ', options.indent)
        } else {
            Writer::new(to)
        };
        XmlSerializer {
            writer,
            encoding: options.encoding,
            declaration: options.declaration,
        }
    }

    pub fn serialize(mut self, file: &DicomFile) -> Result<()> {
        if self.declaration {
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        self.writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
        let preamble = self.encoding.encode(file.preamble());
        self.writer
            .write_event(Event::Text(BytesText::new(&preamble)))?;
        for element in file.dataset() {
            self.write_element(element)?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
        self.writer.get_mut().flush()
    }

    fn write_element(&mut self, element: &DataElement) -> Result<()> {
        let name = node_name(element);
        let tag = element.tag();
        let group = format!("{:#06x}", tag.group());
        let elem = format!("{:#06x}", tag.element());
        let vr = element.vr().map(|vr| xml_safe(&vr.as_str()));
        let vl = element.length().get().map(|len| len.to_string());

        let mut start = BytesStart::new(name);
        start.push_attribute(("group", group.as_str()));
        start.push_attribute(("elem", elem.as_str()));
        start.push_attribute(("vr", vr.as_deref().unwrap_or("None")));
        start.push_attribute(("vl", vl.as_deref().unwrap_or("undefined")));

        let data = element.data().filter(|data| !data.is_empty());
        let children = element.children();
        if data.is_none() && children.is_empty() {
            return self.writer.write_event(Event::Empty(start));
        }

        self.writer.write_event(Event::Start(start))?;
        if let Some(data) = data {
            let text = self.encoding.encode(data);
            self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        }
        for child in children {
            self.write_element(child)?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }
}

fn node_name(element: &DataElement) -> &'static str {
    match element {
        DataElement::Generic { .. } => "DataElement",
        DataElement::Item(_) => "ItemDataElement",
        DataElement::ItemDelimitation(_) => "ItemDelimitationElement",
        DataElement::SequenceDelimitation(_) => "SequenceDelimitationElement",
    }
}
