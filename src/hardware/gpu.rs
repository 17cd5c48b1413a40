//! GPU vendor classification and model-name cleanup over `lspci` text.

use crate::models::VendorKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lower-case substrings identifying an NVIDIA device.
pub const NVIDIA_MARKERS: &[&str] = &["nvidia"];

/// Lower-case substrings identifying an AMD device.
pub const AMD_MARKERS: &[&str] = &["amd", "radeon", "advanced micro devices", "ati technologies"];

/// PCI class descriptions of display devices.
const DISPLAY_CLASSES: &[&str] = &["vga compatible controller", "3d controller", "display controller"];

static REVISION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(rev[^)]*\)").expect("revision pattern is valid"));
static BRACKETED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracket pattern is valid"));

/// Classify a whole PCI listing.
///
/// NVIDIA is checked first and wins when both vendors appear.
pub fn classify(listing: &str) -> VendorKind {
    let lower = listing.to_lowercase();
    if contains_any(&lower, NVIDIA_MARKERS) {
        VendorKind::Nvidia
    } else if contains_any(&lower, AMD_MARKERS) {
        VendorKind::Amd
    } else {
        VendorKind::Unknown
    }
}

/// Whether a single line mentions the given vendor.
pub fn line_matches(line: &str, vendor: VendorKind) -> bool {
    let lower = line.to_lowercase();
    match vendor {
        VendorKind::Nvidia => contains_any(&lower, NVIDIA_MARKERS),
        VendorKind::Amd => contains_any(&lower, AMD_MARKERS),
        VendorKind::Unknown => false,
    }
}

/// Whether a line describes a display-class device.
pub fn is_display_device(line: &str) -> bool {
    contains_any(&line.to_lowercase(), DISPLAY_CLASSES)
}

/// Lines of `listing` belonging to `vendor`.
///
/// Display-class lines are preferred so that AMD chipset entries do not
/// drown out the GPU; every vendor line is returned when none of them is a
/// display device.
pub fn vendor_devices(listing: &str, vendor: VendorKind) -> Vec<String> {
    let matching: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && line_matches(l, vendor))
        .collect();

    let display: Vec<String> = matching
        .iter()
        .filter(|l| is_display_device(l))
        .map(|l| l.to_string())
        .collect();

    if display.is_empty() {
        matching.into_iter().map(str::to_string).collect()
    } else {
        display
    }
}

/// Clean GPU model string from lspci output.
///
/// `"NVIDIA Corporation GA102 [GeForce RTX 3080 Ti] (rev a1)"` becomes
/// `"NVIDIA GeForce RTX 3080 Ti"`.
pub fn clean_gpu_model(raw_model: &str) -> String {
    let without_rev = REVISION_RE.replace_all(raw_model, "");
    let text = without_rev.trim();

    let vendor = match classify(text) {
        VendorKind::Nvidia => Some("NVIDIA"),
        VendorKind::Amd => Some("AMD"),
        VendorKind::Unknown => None,
    };

    // Marketing name is the last bracketed group; AMD lines also bracket the vendor
    let marketing = BRACKETED_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
        .filter(|s| !s.eq_ignore_ascii_case("AMD/ATI"))
        .last();

    match (vendor, marketing) {
        (Some(v), Some(name)) if name.to_uppercase().starts_with(v) => name.to_string(),
        (Some(v), Some(name)) => format!("{} {}", v, name),
        (_, None) | (None, _) => text.to_string(),
    }
}

/// Model name of the first display device line, if any.
pub fn model_from_listing(listing: &str) -> Option<String> {
    listing
        .lines()
        .find(|l| is_display_device(l))
        .and_then(|line| {
            // Format is "xx:xx.x VGA compatible controller: Vendor Model"
            line.split_once(": ").map(|(_, model)| model.trim())
        })
        .filter(|model| !model.is_empty())
        .map(clean_gpu_model)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
