//! Unit tests for parsing specific structures.

use lnk_parser::property_store::PropertyValue;
use lnk_parser::shell_item::{absolute_path, decode_id_list, decode_items};
use lnk_parser::utils::ByteReader;
use lnk_parser::*;
use proptest::prelude::*;

/// Users property view item carrying a string-named property store.
const USERS_PROPERTY_VIEW: [u8; 843] = [
    75, 3, 46, 0, 249, 2, 213, 223, 163, 35, 235, 2, 4, 0, 0, 0, 0, 0, 231, 2, 0, 0, 49, 83, 80,
    83, 5, 213, 205, 213, 156, 46, 27, 16, 147, 151, 8, 0, 43, 44, 249, 174, 39, 2, 0, 0, 18, 0, 0,
    0, 0, 65, 0, 117, 0, 116, 0, 111, 0, 76, 0, 105, 0, 115, 0, 116, 0, 0, 0, 66, 0, 0, 0, 30, 0,
    0, 0, 112, 0, 114, 0, 111, 0, 112, 0, 52, 0, 50, 0, 57, 0, 52, 0, 57, 0, 54, 0, 55, 0, 50, 0,
    57, 0, 53, 0, 0, 0, 0, 0, 221, 1, 0, 0, 174, 165, 78, 56, 225, 173, 138, 78, 138, 155, 123,
    234, 120, 255, 241, 233, 6, 0, 0, 128, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 128, 1, 0, 0, 0, 1, 0,
    0, 0, 2, 0, 0, 0, 32, 0, 0, 0, 0, 0, 0, 0, 223, 0, 20, 0, 31, 80, 224, 79, 208, 32, 234, 58,
    105, 16, 162, 216, 8, 0, 43, 48, 48, 157, 25, 0, 47, 67, 58, 92, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 86, 0, 49, 0, 0, 0, 0, 0, 183, 80, 11, 162, 16, 0, 87, 105, 110,
    100, 111, 119, 115, 0, 64, 0, 9, 0, 4, 0, 239, 190, 115, 78, 172, 36, 183, 80, 11, 162, 46, 0,
    0, 0, 87, 146, 1, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 244, 161, 252, 0,
    87, 0, 105, 0, 110, 0, 100, 0, 111, 0, 119, 0, 115, 0, 0, 0, 22, 0, 90, 0, 49, 0, 0, 0, 0, 0,
    203, 80, 102, 10, 16, 0, 83, 121, 115, 116, 101, 109, 51, 50, 0, 0, 66, 0, 9, 0, 4, 0, 239,
    190, 115, 78, 172, 36, 203, 80, 102, 10, 46, 0, 0, 0, 147, 155, 1, 0, 0, 0, 10, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 133, 88, 172, 0, 83, 0, 121, 0, 115, 0, 116, 0, 101, 0, 109, 0,
    51, 0, 50, 0, 0, 0, 24, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    0, 0, 0, 1, 0, 0, 128, 1, 0, 0, 0, 4, 0, 105, 0, 116, 0, 101, 0, 109, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 30, 26, 222, 127, 49, 139, 165, 73, 147, 184, 107, 225, 76, 250, 73, 67, 255, 255, 255, 255,
    255, 255, 255, 255, 255, 255, 255, 255, 0, 0, 0, 0, 1, 0, 0, 0, 26, 0, 83, 0, 101, 0, 97, 0,
    114, 0, 99, 0, 104, 0, 32, 0, 82, 0, 101, 0, 115, 0, 117, 0, 108, 0, 116, 0, 115, 0, 32, 0,
    105, 0, 110, 0, 32, 0, 83, 0, 121, 0, 115, 0, 116, 0, 101, 0, 109, 0, 51, 0, 50, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 57, 0, 0, 0,
    36, 0, 0, 0, 0, 65, 0, 117, 0, 116, 0, 111, 0, 108, 0, 105, 0, 115, 0, 116, 0, 67, 0, 97, 0,
    99, 0, 104, 0, 101, 0, 84, 0, 105, 0, 109, 0, 101, 0, 0, 0, 20, 0, 0, 0, 149, 78, 49, 203, 24,
    0, 0, 0, 107, 0, 0, 0, 34, 0, 0, 0, 0, 65, 0, 117, 0, 116, 0, 111, 0, 108, 0, 105, 0, 115, 0,
    116, 0, 67, 0, 97, 0, 99, 0, 104, 0, 101, 0, 75, 0, 101, 0, 121, 0, 0, 0, 31, 0, 0, 0, 28, 0,
    0, 0, 83, 0, 101, 0, 97, 0, 114, 0, 99, 0, 104, 0, 32, 0, 82, 0, 101, 0, 115, 0, 117, 0, 108,
    0, 116, 0, 115, 0, 32, 0, 105, 0, 110, 0, 32, 0, 83, 0, 121, 0, 115, 0, 116, 0, 101, 0, 109, 0,
    51, 0, 50, 0, 48, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 116, 26, 89, 94, 150, 223, 211, 72,
    141, 103, 23, 51, 188, 238, 40, 186, 103, 27, 115, 4, 51, 217, 10, 69, 144, 230, 74, 205, 46,
    148, 8, 254, 42, 0, 0, 0, 19, 0, 239, 190, 0, 0, 0, 32, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 31, 3, 0, 0,
];

/// ID list for My Computer\C:\Windows\System32.
const SYSTEM32_ID_LIST: [u8; 225] = [
    223, 0, 20, 0, 31, 80, 224, 79, 208, 32, 234, 58, 105, 16, 162, 216, 8, 0, 43, 48, 48, 157, 25,
    0, 47, 67, 58, 92, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 86, 0, 49, 0, 0, 0,
    0, 0, 183, 80, 11, 162, 16, 0, 87, 105, 110, 100, 111, 119, 115, 0, 64, 0, 9, 0, 4, 0, 239,
    190, 115, 78, 172, 36, 183, 80, 11, 162, 46, 0, 0, 0, 87, 146, 1, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 244, 161, 252, 0, 87, 0, 105, 0, 110, 0, 100, 0, 111, 0, 119, 0,
    115, 0, 0, 0, 22, 0, 90, 0, 49, 0, 0, 0, 0, 0, 203, 80, 102, 10, 16, 0, 83, 121, 115, 116, 101,
    109, 51, 50, 0, 0, 66, 0, 9, 0, 4, 0, 239, 190, 115, 78, 172, 36, 203, 80, 102, 10, 46, 0, 0,
    0, 147, 155, 1, 0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 133, 88, 172, 0, 83,
    0, 121, 0, 115, 0, 116, 0, 101, 0, 109, 0, 51, 0, 50, 0, 0, 0, 24, 0, 0, 0,
];

#[test]
fn test_header_constants() {
    assert_eq!(header::HEADER_SIZE, 0x4C);
    assert_eq!(
        Guid::from_bytes(header::LINK_CLSID).to_string(),
        "00021401-0000-0000-c000-000000000046"
    );
}

#[test]
fn test_users_property_view_store() {
    let items = decode_items(&mut ByteReader::new(&USERS_PROPERTY_VIEW));
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.size, 843);
    assert_eq!(item.item_type, 0x2E);
    assert_eq!(item.friendly_name(), "Users property view");

    let store = item.property_store().unwrap();
    assert_eq!(store.sheets.len(), 1);

    let sheet = &store.sheets[0];
    assert_eq!(sheet.format_id.to_string(), "d5cdd505-2e9c-101b-9397-08002b2cf9ae");
    assert_eq!(sheet.properties.len(), 3);
    assert_eq!(sheet.properties[0].key, PropertyKey::Name("AutoList".to_string()));
    assert!(matches!(
        sheet.properties[0].value,
        PropertyValue::Unknown { vartype: 0x42, .. }
    ));
    assert_eq!(
        sheet.get_name("AutolistCacheTime"),
        Some(&PropertyValue::I8(106_488_221_333))
    );
    assert_eq!(
        sheet.get_name("AutolistCacheKey"),
        Some(&PropertyValue::String("Search Results in System320".to_string()))
    );
}

#[test]
fn test_users_property_view_extensions_follow_store() {
    let items = decode_items(&mut ByteReader::new(&USERS_PROPERTY_VIEW));
    let item = &items[0];

    // The store embeds an ID list with its own 0xBEEF0004 blocks
    let extensions = item.extensions();
    assert_eq!(extensions.len(), 1);
    assert_eq!(extensions[0].signature, 0xBEEF_0013);
    assert_eq!(extensions[0].size, 42);
}

#[test]
fn test_system32_id_list() {
    let mut reader = ByteReader::new(&SYSTEM32_ID_LIST);
    let (size, items) = decode_id_list(&mut reader).unwrap();

    assert_eq!(size, 223);
    assert!(reader.is_empty());
    assert_eq!(items.len(), 4);

    let names: Vec<_> = items.iter().map(|i| i.friendly_name()).collect();
    assert_eq!(names, ["Root folder: GUID", "Drive letter", "Directory", "Directory"]);
    assert_eq!(absolute_path(&items), "My Computer\\C:\\Windows\\System32");

    let windows = items[2].file_entry().unwrap();
    assert_eq!(windows.primary_name, "Windows");
    assert_eq!(windows.name(), "Windows");
    let mft = windows.mft().unwrap();
    assert_eq!(mft.entry_number(), Some(102_999));
    assert_eq!(mft.sequence_number(), Some(6));

    let system32 = items[3].file_entry().unwrap();
    assert_eq!(system32.name(), "System32");
    assert_eq!(system32.mft().unwrap().entry_number(), Some(105_363));
    assert_eq!(system32.file_extension().unwrap().version_offset, 24);
}

#[test]
fn test_id_list_item_sizes_cover_declared_size() {
    let mut reader = ByteReader::new(&SYSTEM32_ID_LIST);
    let (size, items) = decode_id_list(&mut reader).unwrap();
    let covered: usize = items.iter().map(|i| i.size as usize).sum::<usize>() + 2;
    assert_eq!(covered, size as usize);
}

#[test]
fn test_filetime_sentinel() {
    let empty = FileTime::new(0);
    assert!(empty.is_empty());
    assert!(empty.to_datetime().is_none());
    assert_eq!(empty.year(), 1601);
    assert_eq!(empty.to_string(), "");
}

#[test]
fn test_filetime_conversion() {
    // 2019-06-05 00:00:00 UTC
    let ft = FileTime::new((1_559_692_800 + 11_644_473_600) * 10_000_000);
    assert_eq!(ft.to_datetime().unwrap().timestamp(), 1_559_692_800);
    assert_eq!(ft.year(), 2019);
}

#[test]
fn test_description_tables() {
    use lnk_parser::descriptions;

    assert_eq!(descriptions::special_folder_name(0x26), Some("Program Files"));
    assert_eq!(
        descriptions::control_panel_category_name(0),
        Some("All Control Panel Items")
    );
    assert_eq!(DriveType::from_u32(3), DriveType::Fixed);
    assert_eq!(DriveType::from_u32(42).as_u32(), 42);

    assert_eq!(
        descriptions::show_command_description(3),
        "Window is activated and displayed as a maximized window"
    );
    assert_eq!(
        ShowCommand::from_u32(7).description(),
        "Window is displayed as a minimized window without activation"
    );
    assert_eq!(
        ShowCommand::from_u32(0).description(),
        "Window is displayed normally"
    );
}

#[test]
fn test_data_flag_names() {
    let flags = DataFlags::new(DataFlags::HAS_NAME | DataFlags::IS_UNICODE);
    assert!(flags.is_unicode());
    assert!(!flags.has_target_id_list());
    assert_eq!(flags.names(), vec!["HasName", "IsUnicode"]);
}

/// Serializes numbered properties as one storage plus terminator.
fn numbered_store(values: &[(u32, u32)]) -> Vec<u8> {
    let mut entries = Vec::new();
    for (id, value) in values {
        entries.extend_from_slice(&17u32.to_le_bytes());
        entries.extend_from_slice(&id.to_le_bytes());
        entries.push(0);
        entries.extend_from_slice(&PropertyValue::VT_UI4.to_le_bytes());
        entries.extend_from_slice(&[0, 0]);
        entries.extend_from_slice(&value.to_le_bytes());
    }
    entries.extend_from_slice(&[0, 0, 0, 0]);

    let mut store = Vec::new();
    store.extend_from_slice(&((24 + entries.len()) as u32).to_le_bytes());
    store.extend_from_slice(b"1SPS");
    store.extend_from_slice(&[0xAB; 16]);
    store.extend_from_slice(&entries);
    store.extend_from_slice(&[0, 0, 0, 0]);
    store
}

proptest! {
    #[test]
    fn prop_property_store_is_deterministic(
        values in proptest::collection::vec((any::<u32>(), any::<u32>()), 0..16)
    ) {
        let data = numbered_store(&values);
        let first = PropertyStore::parse(&data).unwrap();
        let second = PropertyStore::parse(&data).unwrap();
        prop_assert_eq!(format!("{:?}", first), format!("{:?}", second));

        let sheet = &first.sheets[0];
        prop_assert_eq!(sheet.properties.len(), values.len());
        for (property, (id, value)) in sheet.properties.iter().zip(&values) {
            prop_assert_eq!(&property.key, &PropertyKey::Id(*id));
            prop_assert_eq!(&property.value, &PropertyValue::U4(*value));
        }
    }

    #[test]
    fn prop_filetime_nonzero_is_not_sentinel(raw in 1u64..=0x0300_0000_0000_0000) {
        let ft = FileTime::new(raw);
        prop_assert!(!ft.is_empty());
        prop_assert!(ft.to_datetime().is_some());
    }

    #[test]
    fn prop_mft_packing(entry in 0u64..(1 << 48), sequence in any::<u16>()) {
        let packed = entry | (u64::from(sequence) << 48);
        let mft = MftInformation::from_packed(packed);
        prop_assert_eq!(mft.packed(), packed);
        prop_assert_eq!(mft.entry_number().is_some(), entry > 0);
    }
}
