// saturn-vdp2-rs/src/core/error.rs

//! Load and configuration errors
//!
//! Every error here has already been handed to the fatal sink when the caller
//! sees it. The two kinds mirror what can go wrong while authoring a scene:
//! asking for more memory, cycles or palettes than exist, or a combination the
//! display registers refuse.

use crate::core::registers::RegisterReject;
use crate::core::scroll::Layer;
use crate::core::tilemap::ColorMode;

/// Which data of a layer an error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Cell,
    Map,
    CoefficientTable,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Cell => write!(f, "CEL DATA"),
            DataKind::Map => write!(f, "MAP DATA"),
            DataKind::CoefficientTable => write!(f, "COEFFICIENT TABLE"),
        }
    }
}

/// Error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Out of bytes, cycles or palette slots
    Capacity,
    /// The register interface refused the configuration
    Hardware,
}

/// Errors raised by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vdp2Error {
    /// No bank could take the data
    VramExhausted { layer: Layer, data: DataKind },
    /// A user-assigned region is smaller than the data
    AllocationTooSmall {
        layer: Layer,
        data: DataKind,
        required: u32,
        allocated: u32,
    },
    /// A user-assigned region runs past the end of VRAM
    OutsideVram {
        layer: Layer,
        data: DataKind,
        address: u32,
        len: u32,
    },
    /// No free palette slot of the needed format
    NoPaletteAvailable { layer: Layer, mode: ColorMode },
    /// Invalid cycle pattern or other register refusal
    RegisterRejected(RegisterReject),
}

impl Vdp2Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Vdp2Error::VramExhausted { .. }
            | Vdp2Error::AllocationTooSmall { .. }
            | Vdp2Error::OutsideVram { .. }
            | Vdp2Error::NoPaletteAvailable { .. } => ErrorKind::Capacity,
            Vdp2Error::RegisterRejected(_) => ErrorKind::Hardware,
        }
    }
}

impl std::fmt::Display for Vdp2Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vdp2Error::VramExhausted { layer, data } => {
                write!(f, "{} {} allocation failed: insufficient VRAM", layer, data)
            }
            Vdp2Error::AllocationTooSmall {
                layer,
                data,
                required,
                allocated,
            } => write!(
                f,
                "{} tilemap load failed: {} ({:#X} bytes) exceeds existing VRAM allocation ({:#X} bytes)",
                layer, data, required, allocated
            ),
            Vdp2Error::OutsideVram {
                layer,
                data,
                address,
                len,
            } => write!(
                f,
                "{} tilemap load failed: {} at {:08X} (+{:#X} bytes) lies outside VRAM",
                layer, data, address, len
            ),
            Vdp2Error::NoPaletteAvailable { layer, mode } => {
                write!(f, "{} palette load failed: no {} CRAM slot available", layer, mode)
            }
            Vdp2Error::RegisterRejected(reject) => write!(f, "register rejected: {}", reject),
        }
    }
}

impl std::error::Error for Vdp2Error {}

impl From<RegisterReject> for Vdp2Error {
    fn from(reject: RegisterReject) -> Self {
        Vdp2Error::RegisterRejected(reject)
    }
}

/// Result type of session operations
pub type Vdp2Result<T> = Result<T, Vdp2Error>;
