use bfbc2_toolkit::frostpak::dbx::{ConvertMode, DbxDocument, DbxElement, DbxValue, write_dbx};
use bfbc2_toolkit::frostpak::fbrb::FbrbOperations;
use bfbc2_toolkit::operations::{archive, cleanup, convert_dbx, extract};
use bfbc2_toolkit::{Backend, Error, Session, ToolkitConfig};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn native_config() -> ToolkitConfig {
    ToolkitConfig {
        backend: Backend::Native,
        ..ToolkitConfig::default()
    }
}

#[test]
fn test_extract_edit_and_rearchive() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("ui FbRB");
    std::fs::create_dir_all(folder.join("ui/hud")).unwrap();

    let doc = DbxDocument::new(
        DbxElement::new(
            "instance",
            DbxValue::Container(vec![
                DbxElement::new("field", DbxValue::String("Crosshair".to_string()))
                    .with_attribute("name", "Name"),
                DbxElement::new("field", DbxValue::Flag(1)).with_attribute("name", "Visible"),
            ]),
        )
        .with_attribute("guid", "00FF"),
    );
    let dbx_path = folder.join("ui/hud/crosshair.dbx");
    std::fs::write(&dbx_path, write_dbx(&doc).unwrap()).unwrap();
    std::fs::write(folder.join("ui/hud/crosshair.itexture"), b"DDS ").unwrap();
    let archive_path = FbrbOperations::create(&folder).unwrap();
    std::fs::remove_dir_all(&folder).unwrap();

    // Unpack and load
    let config = native_config();
    let mut session = Session::new();
    let tree = extract(&archive_path, &mut session, &config).unwrap().unwrap();
    assert_eq!(tree.file_count(), 2);
    assert!(session.is_data_available);

    // Edit the document as XML, then back to binary
    let converted = convert_dbx(&[dbx_path.clone()], ConvertMode::ToXml, &config, |_, _, _| {}).unwrap();
    assert_eq!(converted.success_count, 1);
    let xml_path = folder.join("ui/hud/crosshair.xml");
    let xml = std::fs::read_to_string(&xml_path).unwrap();
    std::fs::write(&xml_path, xml.replace("Crosshair", "Dot")).unwrap();
    convert_dbx(&[folder.clone()], ConvertMode::ToDbx, &config, |_, _, _| {}).unwrap();
    std::fs::remove_file(&xml_path).unwrap();

    // Junk left behind by a file browser is dropped on the next cleanup
    std::fs::write(folder.join("ui/Thumbs.db"), b"junk").unwrap();
    cleanup(&folder, false).unwrap();

    let rebuilt = archive(&session, &config).unwrap();
    assert_eq!(rebuilt, archive_path);

    let names: Vec<String> = FbrbOperations::list(&rebuilt)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["ui/hud/crosshair.dbx", "ui/hud/crosshair.res"]);

    let bytes = FbrbOperations::read_file_bytes(&rebuilt, "ui/hud/crosshair.dbx").unwrap();
    let edited = bytes_to_doc(&bytes);
    assert_eq!(
        edited.elements[0].children()[0].value,
        DbxValue::String("Dot".to_string())
    );
}

fn bytes_to_doc(bytes: &[u8]) -> DbxDocument {
    bfbc2_toolkit::frostpak::dbx::read_dbx(bytes).unwrap()
}

#[test]
fn test_extract_bad_archive_keeps_session_unloaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.fbrb");
    std::fs::write(&path, b"nope").unwrap();

    let mut session = Session::new();
    let err = extract(&path, &mut session, &native_config()).unwrap_err();
    assert!(matches!(err, Error::FrostPak(_)));
    assert!(!session.is_data_available);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("BFBC2Toolkit/config.json");

    let mut config = ToolkitConfig {
        backend: Backend::Python,
        compression_level: 6,
        remove_deleted_placeholders: true,
        ..ToolkitConfig::default()
    };
    config.add_recent_file("levels.fbrb");
    config.save_to(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"backend\": \"python\""));
    assert_eq!(ToolkitConfig::load_from(&path).unwrap(), config);
}
