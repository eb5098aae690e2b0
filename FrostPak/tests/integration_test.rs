use frostpak::prelude::*;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(1));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Build an archive by hand, laid out the way the game ships them
fn handmade_archive(path: &Path) {
    let strings = b"textures/sky.res\0ITexture\0scripts/init.res\0<non-resource>\0gone.dbx\0*deleted*\0";
    let entries: [[u32; 6]; 3] = [
        [0, 0x0001_0000, 0, 3, 3, 17],
        [26, 0x0001_0000, 3, 4, 4, 43],
        [58, 0, 7, 0, 0, 67],
    ];

    let mut header = Vec::new();
    header.write_u32::<BigEndian>(2).unwrap();
    header.write_u32::<BigEndian>(strings.len() as u32).unwrap();
    header.extend_from_slice(strings);
    header.write_u32::<BigEndian>(entries.len() as u32).unwrap();
    for entry in entries {
        for value in entry {
            header.write_u32::<BigEndian>(value).unwrap();
        }
    }
    header.push(1);
    header.write_u32::<BigEndian>(7).unwrap();

    let header_gz = gzip(&header);
    let mut file = b"FbRB".to_vec();
    file.write_u32::<BigEndian>(header_gz.len() as u32).unwrap();
    file.extend_from_slice(&header_gz);
    file.extend_from_slice(&gzip(b"skyinit"));
    std::fs::write(path, file).unwrap();
}

#[test]
fn test_unpack_handmade_archive() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("common.fbrb");
    handmade_archive(&archive);

    let entries = FbrbOperations::list(&archive).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].type_name, "<non-resource>");

    let folder = FbrbOperations::extract(&archive).unwrap();
    assert_eq!(folder, dir.path().join("common FbRB"));
    assert_eq!(std::fs::read(folder.join("textures/sky.itexture")).unwrap(), b"sky");
    assert_eq!(std::fs::read(folder.join("scripts/init.nonres")).unwrap(), b"init");
    assert!(folder.join("gone.dbxdeleted").is_file());

    // Repacking restores the stored names and types
    std::fs::remove_file(&archive).unwrap();
    let repacked = FbrbOperations::create(&folder).unwrap();
    assert_eq!(repacked, archive);

    let names: Vec<(String, String)> = FbrbOperations::list(&archive)
        .unwrap()
        .into_iter()
        .map(|e| (e.name, e.type_name))
        .collect();
    assert_eq!(
        names,
        [
            ("gone.dbx".to_string(), "*deleted*".to_string()),
            ("scripts/init.res".to_string(), "<non-resource>".to_string()),
            ("textures/sky.res".to_string(), "ITexture".to_string()),
        ]
    );
}

#[test]
fn test_archive_with_dbx_documents() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("weapons FbRB");
    std::fs::create_dir_all(folder.join("weapons/m16")).unwrap();

    let root = DbxElement::new(
        "instance",
        DbxValue::Container(vec![
            DbxElement::new("field", DbxValue::String("M16A2".to_string()))
                .with_attribute("name", "Name"),
            DbxElement::new("field", DbxValue::Numbers(DbxNumbers::Words(vec![0x4120_0000])))
                .with_attribute("name", "Damage"),
            DbxElement::new("field", DbxValue::Numbers(DbxNumbers::Doubles(vec![1.25])))
                .with_attribute("name", "FireKeepTime"),
        ]),
    )
    .with_attribute("guid", "1234");
    let doc = DbxDocument::new(root);
    let original = write_dbx(&doc).unwrap();
    let dbx_path = folder.join("weapons/m16/m16.dbx");
    std::fs::write(&dbx_path, &original).unwrap();

    let archive = FbrbOperations::create(&folder).unwrap();
    std::fs::remove_dir_all(&folder).unwrap();
    FbrbOperations::extract(&archive).unwrap();
    assert_eq!(std::fs::read(&dbx_path).unwrap(), original);

    let xml_path = convert_file(&dbx_path).unwrap().unwrap();
    let xml = std::fs::read_to_string(&xml_path).unwrap();
    assert!(xml.contains("<field name=\"Damage\">10.0</field>"));
    assert!(xml.contains("<field name=\"FireKeepTime\">1.25</field>"));

    std::fs::remove_file(&dbx_path).unwrap();
    convert_file(&xml_path).unwrap();
    assert_eq!(std::fs::read(&dbx_path).unwrap(), original);
}

#[test]
fn test_rejects_non_archive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fake.fbrb");
    std::fs::write(&path, b"PK\x03\x04 not an archive").unwrap();
    assert!(matches!(
        FbrbOperations::extract(&path),
        Err(Error::InvalidFbrbMagic(_))
    ));
}
