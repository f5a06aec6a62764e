//! Python bindings for the shortcut parser using PyO3.
//!
//! This module provides read-only Python wrappers around a decoded [`Link`].

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::extra_data::ExtraData;
use crate::lnk::{Link as RustLink, ParseOptions};
use crate::shell_item::ShellItem as RustShellItem;
use crate::LnkError;

/// Convert Rust LnkError to Python exception
fn lnk_error_to_py(err: LnkError) -> PyErr {
    match err {
        LnkError::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Runs a decode with the GIL released, turning panics into exceptions.
fn decode_without_gil<F>(py: Python<'_>, decode: F) -> PyResult<RustLink>
where
    F: FnOnce() -> crate::Result<RustLink> + Send,
{
    py.allow_threads(move || {
        catch_unwind(AssertUnwindSafe(decode))
            .map_err(|panic_err| {
                let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Rust panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Rust panic: {}", s)
                } else {
                    "Rust panic: unknown error".to_string()
                };
                PyRuntimeError::new_err(panic_msg)
            })?
            .map_err(lnk_error_to_py)
    })
}

fn options_for(encoding: Option<&str>) -> PyResult<ParseOptions> {
    match encoding {
        Some(label) => ParseOptions::with_encoding_label(label).map_err(lnk_error_to_py),
        None => Ok(ParseOptions::default()),
    }
}

/// Python wrapper for a shell item
#[pyclass(name = "ShellItem")]
#[derive(Clone)]
pub struct PyShellItem {
    inner: RustShellItem,
}

#[pymethods]
impl PyShellItem {
    /// Class type indicator
    #[getter]
    fn item_type(&self) -> u8 {
        self.inner.item_type
    }

    /// Declared size including the size prefix
    #[getter]
    fn size(&self) -> u16 {
        self.inner.size
    }

    /// Short description of the item type
    #[getter]
    fn friendly_name(&self) -> &'static str {
        self.inner.friendly_name()
    }

    /// Display value
    #[getter]
    fn value(&self) -> String {
        self.inner.value()
    }

    /// MFT entry and sequence numbers, for file entries that carry them
    fn mft(&self) -> Option<(u64, u16)> {
        let mft = self.inner.file_entry()?.mft()?;
        Some((mft.entry_number()?, mft.sequence_number()?))
    }

    fn __repr__(&self) -> String {
        format!("ShellItem({})", self.inner)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

/// Python wrapper for a decoded shortcut
#[pyclass(name = "Link")]
pub struct PyLink {
    inner: Arc<RustLink>,
}

#[pymethods]
impl PyLink {
    /// Raw data flags
    #[getter]
    fn data_flags(&self) -> u32 {
        self.inner.header.data_flags.0
    }

    /// Names of the set data flags
    fn data_flag_names(&self) -> Vec<&'static str> {
        self.inner.header.data_flags.names()
    }

    /// Raw target file attributes
    #[getter]
    fn file_attributes(&self) -> u32 {
        self.inner.header.file_attributes.0
    }

    /// Target creation time as Unix timestamp, None when unset
    #[getter]
    fn creation_time(&self) -> Option<i64> {
        self.inner.header.creation_time.to_datetime().map(|t| t.timestamp())
    }

    /// Target access time as Unix timestamp, None when unset
    #[getter]
    fn access_time(&self) -> Option<i64> {
        self.inner.header.access_time.to_datetime().map(|t| t.timestamp())
    }

    /// Target write time as Unix timestamp, None when unset
    #[getter]
    fn write_time(&self) -> Option<i64> {
        self.inner.header.write_time.to_datetime().map(|t| t.timestamp())
    }

    /// Target file size
    #[getter]
    fn file_size(&self) -> u32 {
        self.inner.header.file_size
    }

    /// Icon index
    #[getter]
    fn icon_index(&self) -> i32 {
        self.inner.header.icon_index
    }

    /// Show command name
    #[getter]
    fn show_command(&self) -> String {
        self.inner.header.show_command.name()
    }

    /// Hot key, e.g. "Ctrl+Alt+T"
    #[getter]
    fn hot_key(&self) -> Option<String> {
        let hot_key = &self.inner.header.hot_key;
        (!hot_key.is_empty()).then(|| hot_key.to_string())
    }

    #[getter]
    fn name(&self) -> Option<String> {
        self.inner.name.clone()
    }

    #[getter]
    fn relative_path(&self) -> Option<String> {
        self.inner.relative_path.clone()
    }

    #[getter]
    fn working_directory(&self) -> Option<String> {
        self.inner.working_directory.clone()
    }

    #[getter]
    fn arguments(&self) -> Option<String> {
        self.inner.arguments.clone()
    }

    #[getter]
    fn icon_location(&self) -> Option<String> {
        self.inner.icon_location.clone()
    }

    /// Local base path from the link info
    fn local_path(&self) -> Option<String> {
        self.inner.local_path().map(String::from)
    }

    /// Target path from the link info
    fn target_path(&self) -> Option<String> {
        self.inner.target_path()
    }

    /// Target ID list rendered as a path
    fn target_id_path(&self) -> Option<String> {
        self.inner.target_id_path()
    }

    /// MFT entry and sequence numbers of the target
    fn target_mft(&self) -> Option<(u64, u16)> {
        let mft = self.inner.target_mft()?;
        Some((mft.entry_number()?, mft.sequence_number()?))
    }

    /// Volume label, drive type and serial number
    fn volume(&self) -> Option<(String, String, String)> {
        self.inner.volume_info().map(|v| {
            (
                v.label.clone(),
                v.drive_type.to_string(),
                v.serial_number_hex(),
            )
        })
    }

    /// Network share name
    fn share_name(&self) -> Option<String> {
        self.inner
            .network_share_info()
            .map(|share| share.share_name.clone())
    }

    /// Shell items of the target ID list
    fn target_id_list(&self) -> Vec<PyShellItem> {
        self.inner
            .target_id_list
            .iter()
            .map(|item| PyShellItem { inner: item.clone() })
            .collect()
    }

    /// Tracker machine id
    fn machine_id(&self) -> Option<String> {
        self.inner.tracker().map(|t| t.machine_id.clone())
    }

    /// Tracker MAC address
    fn mac_address(&self) -> Option<String> {
        self.inner.tracker().map(|t| t.mac_address())
    }

    /// Names of the extra data blocks in file order
    fn extra_data_names(&self) -> Vec<&'static str> {
        self.inner.extra_data.iter().map(|b| b.name()).collect()
    }

    /// Raw bytes of damaged extra data blocks
    fn damaged_blocks<'py>(&self, py: Python<'py>) -> Vec<(u32, &'py PyBytes)> {
        self.inner
            .extra_data
            .iter()
            .filter_map(|b| match &b.kind {
                ExtraData::Damaged(damaged) => {
                    Some((damaged.signature, PyBytes::new(py, &damaged.data)))
                }
                _ => None,
            })
            .collect()
    }

    /// Source file path, when read from disk
    #[getter]
    fn source_path(&self) -> Option<String> {
        self.inner
            .source
            .as_ref()
            .map(|s| s.path.display().to_string())
    }

    fn __repr__(&self) -> String {
        format!(
            "Link(flags={:#x}, target={:?})",
            self.inner.header.data_flags.0,
            self.inner.target_path()
        )
    }
}

/// Decode a shortcut file
#[pyfunction]
#[pyo3(signature = (path, encoding = None))]
fn parse_file(py: Python<'_>, path: &str, encoding: Option<&str>) -> PyResult<PyLink> {
    let options = options_for(encoding)?;
    let path = path.to_string();
    let link = decode_without_gil(py, move || RustLink::open_with_options(&path, &options))?;
    Ok(PyLink {
        inner: Arc::new(link),
    })
}

/// Decode a shortcut from bytes
#[pyfunction]
#[pyo3(signature = (data, encoding = None))]
fn parse_bytes(py: Python<'_>, data: &[u8], encoding: Option<&str>) -> PyResult<PyLink> {
    let options = options_for(encoding)?;
    let data = data.to_vec();
    let link = decode_without_gil(py, move || RustLink::parse_with_options(&data, &options))?;
    Ok(PyLink {
        inner: Arc::new(link),
    })
}

/// Python module definition
#[pymodule]
fn lnk_parser(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_file, m)?)?;
    m.add_function(wrap_pyfunction!(parse_bytes, m)?)?;
    m.add_class::<PyLink>()?;
    m.add_class::<PyShellItem>()?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
