use std::path::Path;

use anyhow::Result;

use crate::segment::frequency;

/// Commerce platforms recognised from URL shapes. Flags only ever go from false to true.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlatformFlags {
    pub sfcc: bool,
    pub shopify: bool,
}

impl PlatformFlags {
    pub fn observe(&mut self, url: &str) {
        if url.contains("/demandware/") {
            self.sfcc = true;
        }
        if url.contains("/collections/") && url.contains("/products/") {
            self.shopify = true;
        }
    }

    /// Flags for an export that is already on disk.
    pub fn scan_file(path: &Path) -> Result<Self> {
        let mut flags = Self::default();
        frequency::aggregate_file(path, |line| {
            flags.observe(line);
            None::<String>
        })?;
        Ok(flags)
    }
}
