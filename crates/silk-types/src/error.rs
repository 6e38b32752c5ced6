/// Errors raised while resolving the typed view of a SiLK file.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   └── UnsupportedRecordSize for unknown layouts     │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The header declared a record size that matches none of the three
    /// known layouts (56, 68, 88 bytes).
    #[error("unsupported record size: {size}")]
    UnsupportedRecordSize { size: u16 },
}
