//! Generic register abstractions for type-safe MMDC programming

pub type Result<T> = std::result::Result<T, RegisterError>;

/// Errors raised when a register layout cannot be encoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("field {field} value 0x{value:X} does not fit in {width} bits")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        width: u32,
    },
}

/// Trait for register layouts that can be converted to/from raw register values
///
/// This trait provides type-safe conversion between structured register
/// layouts and the raw 32-bit values that are written to/read from the
/// memory-mapped MMDC registers.
///
/// # Example
///
/// ```ignore
/// use mmdcstat_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyControl {
///     enable: bool,
///     threshold: u8,
/// }
///
/// impl RegisterLayout for MyControl {
///     fn to_register_value(&self) -> u32 {
///         (self.enable as u32) | ((self.threshold as u32) << 8)
///     }
///
///     fn from_register_value(value: u32) -> Self {
///         Self {
///             enable: (value & 1) != 0,
///             threshold: ((value >> 8) & 0xFF) as u8,
///         }
///     }
/// }
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw register value
    fn to_register_value(&self) -> u32;

    /// Parse a raw register value into this register layout
    fn from_register_value(value: u32) -> Self;

    /// Validate that the field values are within acceptable ranges
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Check that `value` fits in a field of `width` bits
pub fn check_width(field: &'static str, value: u32, width: u32) -> Result<()> {
    if width < 32 && value >> width != 0 {
        return Err(RegisterError::FieldOverflow {
            field,
            value,
            width,
        });
    }
    Ok(())
}
