//! Static description tables.
//!
//! Maps numeric codes and well-known GUIDs found in shortcuts to readable
//! names. Nothing in the decoders depends on these tables; they exist for
//! display and reporting.

use crate::guid::Guid;

/// Readable description of a volume drive type.
pub fn drive_type_description(drive_type: u32) -> &'static str {
    match drive_type {
        0 => "Unknown",
        1 => "No root directory",
        2 => "Removable storage media (Floppy, USB)",
        3 => "Fixed storage media (Hard drive)",
        4 => "Remote storage",
        5 => "Optical disc media (CD-ROM, DVD, BD)",
        6 => "RAM drive storage",
        _ => "Unknown drive type",
    }
}

/// Readable description of a header show-window value.
pub fn show_command_description(show_command: u32) -> &'static str {
    match show_command {
        1 => "Window is activated and displayed at its original size",
        3 => "Window is activated and displayed as a maximized window",
        7 => "Window is displayed as a minimized window without activation",
        _ => "Window is displayed normally",
    }
}

static NETWORK_PROVIDERS: &[(u32, &str)] = &[
    (0x0002_0000, "WNNC_NET_LANMAN"),
    (0x001A_0000, "WNNC_NET_AVID"),
    (0x001B_0000, "WNNC_NET_DOCUSPACE"),
    (0x001C_0000, "WNNC_NET_MANGOSOFT"),
    (0x001D_0000, "WNNC_NET_SERNET"),
    (0x001E_0000, "WNNC_NET_RIVERFRONT1"),
    (0x001F_0000, "WNNC_NET_RIVERFRONT2"),
    (0x0020_0000, "WNNC_NET_DECORB"),
    (0x0021_0000, "WNNC_NET_PROTSTOR"),
    (0x0022_0000, "WNNC_NET_FJ_REDIR"),
    (0x0023_0000, "WNNC_NET_DISTINCT"),
    (0x0024_0000, "WNNC_NET_TWINS"),
    (0x0025_0000, "WNNC_NET_RDR2SAMPLE"),
    (0x0026_0000, "WNNC_NET_CSC"),
    (0x0027_0000, "WNNC_NET_3IN1"),
    (0x0029_0000, "WNNC_NET_EXTENDNET"),
    (0x002A_0000, "WNNC_NET_STAC"),
    (0x002B_0000, "WNNC_NET_FOXBAT"),
    (0x002C_0000, "WNNC_NET_YAHOO"),
    (0x002D_0000, "WNNC_NET_EXIFS"),
    (0x002E_0000, "WNNC_NET_DAV"),
    (0x002F_0000, "WNNC_NET_KNOWARE"),
    (0x0030_0000, "WNNC_NET_OBJECT_DIRE"),
    (0x0031_0000, "WNNC_NET_MASFAX"),
    (0x0032_0000, "WNNC_NET_HOB_NFS"),
    (0x0033_0000, "WNNC_NET_SHIVA"),
    (0x0034_0000, "WNNC_NET_IBMAL"),
    (0x0035_0000, "WNNC_NET_LOCK"),
    (0x0036_0000, "WNNC_NET_TERMSRV"),
    (0x0037_0000, "WNNC_NET_SRT"),
    (0x0038_0000, "WNNC_NET_QUINCY"),
    (0x0039_0000, "WNNC_NET_OPENAFS"),
    (0x003A_0000, "WNNC_NET_AVID1"),
    (0x003B_0000, "WNNC_NET_DFS"),
    (0x003C_0000, "WNNC_NET_KWNP"),
    (0x003D_0000, "WNNC_NET_ZENWORKS"),
    (0x003E_0000, "WNNC_NET_DRIVEONWEB"),
    (0x003F_0000, "WNNC_NET_VMWARE"),
    (0x0040_0000, "WNNC_NET_RSFX"),
    (0x0041_0000, "WNNC_NET_MFILES"),
    (0x0042_0000, "WNNC_NET_MS_NFS"),
    (0x0043_0000, "WNNC_NET_GOOGLE"),
];

/// Name of a WNNC network provider type.
pub fn network_provider_name(provider: u32) -> Option<&'static str> {
    NETWORK_PROVIDERS
        .iter()
        .find(|(code, _)| *code == provider)
        .map(|(_, name)| *name)
}

static KNOWN_FOLDERS: &[(&str, &str)] = &[
    ("905e63b6-c1bf-494e-b29c-65b732d3d21a", "ProgramFiles"),
    ("7c5a40ef-a0fb-4bfc-874a-c0f2e0b9fa8e", "ProgramFilesX86"),
    ("6d809377-6af0-444b-8957-a3773f02200e", "ProgramFilesX64"),
    ("374de290-123f-4565-9164-39c4925e467b", "Downloads"),
    ("fdd39ad0-238f-46af-adb4-6c85480369c7", "Documents"),
    ("b4bfcc3a-db2c-424c-b029-7fe99a87c641", "Desktop"),
    ("33e28130-4e1e-4676-835a-98395c3bc3bb", "Pictures"),
    ("4bd8d571-6d19-48d3-be97-422220080e43", "Music"),
    ("18989b1d-99b5-455b-841c-ab7c74e4ddfc", "Videos"),
    ("5e6c858f-0e22-4760-9afe-ea3317b67173", "Profile"),
    ("0762d272-c50a-4bb0-a382-697dcd729b80", "UserProfiles"),
    ("f38bf404-1d43-42f2-9305-67de0b28fc23", "Windows"),
    ("1ac14e77-02e7-4e5d-b744-2eb1ae5198b7", "System"),
    ("d65231b0-b2f1-4857-a4ce-a8e7c6ea7d27", "SystemX86"),
    ("f1b32785-6fba-4fcf-9d55-7b8e7f157091", "LocalAppData"),
    ("3eb685db-65f9-4cf6-a03a-e3ef65729f3d", "RoamingAppData"),
    ("62ab5d82-fdc1-4dc3-a9dd-070d1d495d97", "ProgramData"),
    ("a77f5d77-2e2b-44c3-a6a2-aba601054a51", "Programs"),
    ("625b53c3-ab48-4ec1-ba1f-a1ef4146fc19", "StartMenu"),
    ("b97d20bb-f46a-4c97-ba10-5e3608430854", "Startup"),
    ("0139d44e-6afe-49f2-8690-3dafcae6ffb8", "CommonPrograms"),
    ("a4115719-d62e-491d-aa7c-e74b8be3b067", "CommonStartMenu"),
    ("82a5ea35-d9cd-47c5-9629-e15d2f714e6e", "CommonStartup"),
    ("c4aa340d-f20f-4863-afef-f87ef2e6ba25", "PublicDesktop"),
    ("dfdf76a2-c82a-4d63-906a-5644ac457385", "Public"),
    ("56784854-c6cb-462b-8169-88e350acb882", "Contacts"),
    ("1777f761-68ad-4d8a-87bd-30b759fa33dd", "Favorites"),
    ("bfb9d5e0-c6a9-404c-b2b2-ae6db6af4968", "Links"),
    ("4c5c32ff-bb9d-43b0-b5b4-2d72e54eaaa4", "SavedGames"),
    ("7d1d3a04-debb-4115-95cf-2f29da2920da", "SavedSearches"),
    ("8983036c-27c0-404b-8f08-102d10dcfd74", "SendTo"),
    ("ae50c081-ebd2-438a-8655-8a092e34987a", "Recent"),
    ("352481e8-33be-4251-ba85-6007caedcf9d", "InternetCache"),
    ("2b0f765d-c0e9-4171-908e-08a611b84ff6", "Cookies"),
    ("d9dc8a3b-b784-432e-a781-5a1130a75963", "History"),
    ("a63293e8-664e-48db-a079-df759e0509f7", "Templates"),
    ("8ad10c31-2adb-4296-a8f7-e4701232c972", "ResourceDir"),
    ("4d9f7874-4e0c-4904-967b-40b0d20c3e4b", "InternetFolder"),
    ("0ac0837c-bbf8-452a-850d-79d08e667ca7", "ComputerFolder"),
    ("d20beec4-5ca8-4905-ae3b-bf251ea09b53", "NetworkFolder"),
    ("c5abbf53-e17f-4121-8900-86626fc2c973", "NetHood"),
    ("9274bd8d-cfd1-41c3-b35e-b13f55a758f4", "PrintHood"),
    ("82a74aeb-aeb4-465c-a014-d097ee346d63", "ControlPanelFolder"),
    ("b7534046-3ecb-4c18-be4e-64cd4cb7d6ac", "RecycleBinFolder"),
    ("1b3ea5dc-b587-4786-b4ef-bd1dc332aeae", "Libraries"),
    ("f3ce0f7c-4901-4acc-8648-d5d44b04ef8f", "UsersFiles"),
    ("9e3995ab-1f9c-4f13-b827-48b24b6c7174", "UserPinned"),
    ("52a4f021-7b75-48a9-9f6b-4b87a210bc8f", "QuickLaunch"),
    ("1e87508d-89c2-42f0-8a7e-645a0f50ca58", "AppsFolder"),
    ("5cd7aee2-2219-4a67-b85d-6c9ce15660cb", "UserProgramFiles"),
];

/// Name of a known folder (FOLDERID_*) GUID.
pub fn known_folder_name(guid: &Guid) -> Option<&'static str> {
    lookup_guid(KNOWN_FOLDERS, guid)
}

static SHELL_FOLDERS: &[(&str, &str)] = &[
    ("20d04fe0-3aea-1069-a2d8-08002b30309d", "My Computer"),
    ("450d8fba-ad25-11d0-98a8-0800361b1103", "My Documents"),
    ("208d2c60-3aea-1069-a2d7-08002b30309d", "My Network Places"),
    ("645ff040-5081-101b-9f08-00aa002f954e", "Recycle Bin"),
    ("871c5380-42a0-1069-a2ea-08002b30309d", "Internet Explorer"),
    ("21ec2020-3aea-1069-a2dd-08002b30309d", "Control Panel"),
    ("26ee0668-a00a-44d7-9371-beb064c98683", "Control Panel (Category view)"),
    ("2227a280-3aea-1069-a2de-08002b30309d", "Printers"),
    ("7007acc7-3202-11d1-aad2-00805fc1270e", "Network Connections"),
    ("59031a47-3f72-44a7-89c5-5595fe6b30ee", "Users Files"),
    ("031e4825-7b94-4dc3-b131-e946b44c8dd5", "Libraries"),
    ("4234d49b-0245-4df3-b780-3893943456e1", "Applications"),
    ("679f85cb-0220-4080-b29b-5540cc05aab6", "Quick access"),
    ("f02c1a0d-be21-4350-88b0-7367fc96ef3c", "Network"),
    ("088e3905-0323-4b02-9826-5d99428e115f", "Downloads"),
    ("24ad3ad4-a569-4530-98e1-ab02f9417aa8", "Pictures"),
    ("3dfdf296-dbec-4fb4-81d1-6a3438bcf4de", "Music"),
    ("d3162b92-9365-467a-956b-92703aca08af", "Documents"),
    ("f86fa3ab-70d2-4fc7-9c99-fcbf05467f3a", "Videos"),
    ("0db7e03f-fc29-4dc6-9020-ff41b59e513a", "3D Objects"),
];

/// Name of a shell folder CLSID as found in root folder items.
///
/// Falls back to the known folder table.
pub fn shell_folder_name(guid: &Guid) -> Option<&'static str> {
    lookup_guid(SHELL_FOLDERS, guid).or_else(|| known_folder_name(guid))
}

static SPECIAL_FOLDERS: &[(u32, &str)] = &[
    (0x00, "Desktop"),
    (0x01, "Internet"),
    (0x02, "Programs"),
    (0x03, "Control Panel"),
    (0x04, "Printers"),
    (0x05, "My Documents"),
    (0x06, "Favorites"),
    (0x07, "Startup"),
    (0x08, "Recent"),
    (0x09, "SendTo"),
    (0x0A, "Recycle Bin"),
    (0x0B, "Start Menu"),
    (0x0D, "My Music"),
    (0x0E, "My Videos"),
    (0x10, "Desktop Directory"),
    (0x11, "My Computer"),
    (0x12, "Network"),
    (0x13, "NetHood"),
    (0x14, "Fonts"),
    (0x15, "Templates"),
    (0x16, "Common Start Menu"),
    (0x17, "Common Programs"),
    (0x18, "Common Startup"),
    (0x19, "Common Desktop Directory"),
    (0x1A, "AppData"),
    (0x1B, "PrintHood"),
    (0x1C, "Local AppData"),
    (0x1D, "Alt Startup"),
    (0x1E, "Common Alt Startup"),
    (0x1F, "Common Favorites"),
    (0x20, "Internet Cache"),
    (0x21, "Cookies"),
    (0x22, "History"),
    (0x23, "Common AppData"),
    (0x24, "Windows"),
    (0x25, "System"),
    (0x26, "Program Files"),
    (0x27, "My Pictures"),
    (0x28, "Profile"),
    (0x29, "System x86"),
    (0x2A, "Program Files x86"),
    (0x2B, "Program Files Common"),
    (0x2C, "Program Files Common x86"),
    (0x2D, "Common Templates"),
    (0x2E, "Common Documents"),
    (0x2F, "Common Administrative Tools"),
    (0x30, "Administrative Tools"),
    (0x31, "Network Connections"),
    (0x35, "Common Music"),
    (0x36, "Common Pictures"),
    (0x37, "Common Videos"),
    (0x38, "Resources"),
    (0x39, "Localized Resources"),
    (0x3A, "Common OEM Links"),
    (0x3B, "CD Burning"),
    (0x3D, "Computers Near Me"),
];

/// Name of a CSIDL special folder id.
pub fn special_folder_name(id: u32) -> Option<&'static str> {
    SPECIAL_FOLDERS
        .iter()
        .find(|(code, _)| *code == id)
        .map(|(_, name)| *name)
}

/// Name of a control panel category id.
pub fn control_panel_category_name(id: u32) -> Option<&'static str> {
    let name = match id {
        0 => "All Control Panel Items",
        1 => "Appearance and Personalization",
        2 => "Hardware and Sound",
        3 => "Network and Internet",
        4 => "Sounds, Speech, and Audio Devices",
        5 => "System and Security",
        6 => "Clock, Language, and Region",
        7 => "Ease of Access",
        8 => "Programs",
        9 => "User Accounts",
        10 => "Security Center",
        11 => "Mobile PC",
        _ => return None,
    };
    Some(name)
}

static PROPERTY_NAMES: &[(&str, u32, &str)] = &[
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 2, "System.ItemFolderNameDisplay"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 4, "System.ItemTypeText"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 10, "System.ItemNameDisplay"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 12, "System.Size"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 13, "System.FileAttributes"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 14, "System.DateModified"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 15, "System.DateCreated"),
    ("b725f130-47ef-101a-a5f1-02608c9eebac", 16, "System.DateAccessed"),
    ("28636aa6-953d-11d2-b5d6-00c04fd918d0", 5, "System.ComputerName"),
    ("28636aa6-953d-11d2-b5d6-00c04fd918d0", 11, "System.ItemType"),
    ("28636aa6-953d-11d2-b5d6-00c04fd918d0", 30, "System.ParsingPath"),
    ("446d16b1-8dad-4870-a748-402ea43d788c", 100, "System.ThumbnailCacheId"),
    ("446d16b1-8dad-4870-a748-402ea43d788c", 104, "System.VolumeId"),
    ("9f4c2855-9f79-4b39-a8d0-e1d42de1d5f3", 2, "System.AppUserModel.RelaunchCommand"),
    ("9f4c2855-9f79-4b39-a8d0-e1d42de1d5f3", 3, "System.AppUserModel.RelaunchIconResource"),
    ("9f4c2855-9f79-4b39-a8d0-e1d42de1d5f3", 4, "System.AppUserModel.RelaunchDisplayNameResource"),
    ("9f4c2855-9f79-4b39-a8d0-e1d42de1d5f3", 5, "System.AppUserModel.ID"),
    ("f29f85e0-4ff9-1068-ab91-08002b27b3d9", 2, "System.Title"),
    ("f29f85e0-4ff9-1068-ab91-08002b27b3d9", 3, "System.Subject"),
    ("f29f85e0-4ff9-1068-ab91-08002b27b3d9", 4, "System.Author"),
    ("f29f85e0-4ff9-1068-ab91-08002b27b3d9", 5, "System.Keywords"),
    ("f29f85e0-4ff9-1068-ab91-08002b27b3d9", 6, "System.Comment"),
    ("dabd30ed-0043-4789-a7f8-d013a4736622", 100, "System.ItemFolderPathDisplayNarrow"),
    ("b9b4b3fc-2b51-4a42-b5d8-324146afcf25", 2, "System.Link.TargetParsingPath"),
    ("b9b4b3fc-2b51-4a42-b5d8-324146afcf25", 8, "System.Link.TargetSFGAOFlags"),
];

/// Canonical name of a property identified by format id and property id.
pub fn property_name(format_id: &Guid, id: u32) -> Option<&'static str> {
    let key = format_id.to_string();
    PROPERTY_NAMES
        .iter()
        .find(|(fmtid, pid, _)| *fmtid == key && *pid == id)
        .map(|(_, _, name)| *name)
}

fn lookup_guid(table: &'static [(&'static str, &'static str)], guid: &Guid) -> Option<&'static str> {
    let key = guid.to_string();
    table
        .iter()
        .find(|(text, _)| *text == key)
        .map(|(_, name)| *name)
}
