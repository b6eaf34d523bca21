/// Identifier of a physical camera as reported by the capture backend.
pub type CameraId = u32;

/// Barcode symbologies understood by the decode engine.
///
/// Wire names follow the ZXing convention used by the command bridge
/// (`"QR_CODE"`, `"EAN_13"`, ...).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BarcodeFormat {
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    Pdf417,
    QrCode,
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
}

impl BarcodeFormat {
    /// Parses an inbound wire name. Unknown names fall back to EAN-13,
    /// matching the historical bridge behavior.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "AZTEC" => Self::Aztec,
            "CODABAR" => Self::Codabar,
            "CODE_39" => Self::Code39,
            "CODE_93" => Self::Code93,
            "CODE_128" => Self::Code128,
            "DATA_MATRIX" => Self::DataMatrix,
            "EAN_8" => Self::Ean8,
            "EAN_13" => Self::Ean13,
            "ITF" => Self::Itf,
            "PDF417" => Self::Pdf417,
            "QR_CODE" => Self::QrCode,
            "RSS_14" => Self::Rss14,
            "RSS_EXPANDED" => Self::RssExpanded,
            "UPC_A" => Self::UpcA,
            "UPC_E" => Self::UpcE,
            "UPC_EAN_EXTENSION" => Self::UpcEanExtension,
            _ => Self::Ean13,
        }
    }

    /// Outbound wire name. Note the legacy asymmetry: UPC-A is parsed
    /// from `"UPC_A"` but reported as `"UPCA"`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Aztec => "AZTEC",
            Self::Codabar => "CODABAR",
            Self::Code39 => "CODE_39",
            Self::Code93 => "CODE_93",
            Self::Code128 => "CODE_128",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Ean8 => "EAN_8",
            Self::Ean13 => "EAN_13",
            Self::Itf => "ITF",
            Self::Pdf417 => "PDF417",
            Self::QrCode => "QR_CODE",
            Self::Rss14 => "RSS_14",
            Self::RssExpanded => "RSS_EXPANDED",
            Self::UpcA => "UPCA",
            Self::UpcE => "UPC_E",
            Self::UpcEanExtension => "UPC_EAN_EXTENSION",
        }
    }
}

/// Camera authorization as reported by the platform.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Authorization {
    /// The user has not been asked yet; a prompt is required.
    #[default]
    NotDetermined,
    Authorized,
    Denied,
    /// Access is blocked by device policy; the user cannot grant it.
    Restricted,
}

/// Device orientation sampled when the preview surface is attached.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DeviceOrientation {
    Portrait,
    LandscapeLeft,
    LandscapeRight,
    PortraitUpsideDown,
    /// Reported by some platforms during transitions (face up/down etc.).
    #[default]
    Unknown,
}

/// Rotation pair applied to the preview layer and the scan rectangle,
/// both in degrees.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct PreviewTransform {
    pub preview_rotation: u16,
    pub scan_rect_rotation: u16,
}
