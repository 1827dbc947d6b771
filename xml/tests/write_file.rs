use dicom_tree_object::open_file;
use dicom_tree_xml::{Error, ValueEncoding, XmlOptions};
use pretty_assertions::assert_eq;

#[rustfmt::skip]
static DATASET: &[u8] = &[
    0x08, 0x00, 0x00, 0x00,     // (0008,0000)
        b'U', b'L',             // VR: UL
        0x04, 0x00,             // Length: 4
            0x01, 0x02, 0x03, 0x04,
    0x10, 0x00, 0x10, 0x00,     // (0010,0010) Patient Name
        b'P', b'N',             // VR: PN
        0x08, 0x00,             // Length: 8
            b'D', b'o', b'e', b'^', b'J', b'o', b'h', b'n',
];

#[test]
fn convert_file_to_xml() {
    let dir = tempfile::tempdir().unwrap();
    let dicom_path = dir.path().join("0001.dcm");
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes.extend_from_slice(DATASET);
    std::fs::write(&dicom_path, bytes).unwrap();

    let file = open_file(&dicom_path).unwrap();
    let xml_path = dir.path().join("0001.xml");
    XmlOptions::new()
        .encoding(ValueEncoding::Text)
        .indent(0)
        .write_file(&file, &xml_path)
        .unwrap();

    let xml = std::fs::read_to_string(&xml_path).unwrap();
    let preamble = "\u{FFFD}".repeat(128);
    assert_eq!(
        xml,
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
                "<DICOM>{}",
                "<DataElement group=\"0x0008\" elem=\"0x0000\" vr=\"UL\" vl=\"4\">{}</DataElement>",
                "<DataElement group=\"0x0010\" elem=\"0x0010\" vr=\"PN\" vl=\"8\">Doe^John</DataElement>",
                "</DICOM>"
            ),
            preamble,
            "\u{FFFD}".repeat(4),
        )
    );
}

#[test]
fn default_output_matches_in_memory_output() {
    let dir = tempfile::tempdir().unwrap();
    let dicom_path = dir.path().join("0002.dcm");
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes.extend_from_slice(DATASET);
    std::fs::write(&dicom_path, bytes).unwrap();

    let file = open_file(&dicom_path).unwrap();
    let xml_path = dir.path().join("0002.xml");
    dicom_tree_xml::write_file(&file, &xml_path).unwrap();

    let on_disk = std::fs::read(&xml_path).unwrap();
    assert_eq!(on_disk, dicom_tree_xml::to_vec(&file).unwrap());
    assert_eq!(
        String::from_utf8(on_disk).unwrap(),
        dicom_tree_xml::to_string(&file).unwrap()
    );
}

#[test]
fn create_file_in_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dicom_tree_object::DicomFile::new(None, [0; 128], vec![]);
    let xml_path = dir.path().join("missing").join("out.xml");

    let err = dicom_tree_xml::write_file(&file, &xml_path).unwrap_err();
    match err {
        Error::CreateFile { filename, .. } => assert_eq!(filename, xml_path),
        e => panic!("unexpected error {:?}", e),
    }
}
