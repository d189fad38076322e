pub mod classify;
pub mod frequency;
pub mod presets;
pub mod rank;
pub mod rules;
pub mod threshold;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::platform::PlatformFlags;
use classify::{parameter_keys, path_prefix, LEVEL1_PARTS, LEVEL2_PARTS, SUBDOMAIN_PARTS};
use rank::RankedEntry;
use rules::{RuleWriter, SegmentLayout};

/// What one data-driven segment pass saw and kept.
#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub name: &'static str,
    pub records: usize,
    pub distinct: usize,
    pub largest: usize,
    pub threshold: Option<usize>,
    pub entries: Vec<RankedEntry>,
    pub excluded: usize,
}

/// Aggregate → threshold → rank → render → append, for one segment.
fn run_pass<F, I>(
    input: &Path,
    layout: &SegmentLayout,
    thresholded: bool,
    writer: &mut RuleWriter,
    extract: F,
) -> Result<SegmentReport>
where
    F: FnMut(&str) -> I,
    I: IntoIterator<Item = String>,
{
    // One full read of the export per pass
    let table = frequency::aggregate_file(input, extract)?;
    let records = table.records();
    let distinct = table.distinct();
    let computed = threshold::compute(&table);
    let largest = computed.largest;

    let threshold = thresholded.then_some(computed.value);
    if let Some(t) = threshold {
        info!(
            "{}: largest bucket {} URLs, threshold {}",
            layout.name, largest, t
        );
    }

    let ranking = rank::rank(table, threshold);

    // Flushed before the next pass starts
    writer.append(&rules::render_segment(layout, &ranking.entries))?;
    debug!(
        "{}: {} kept, {} excluded of {} distinct",
        layout.name,
        ranking.entries.len(),
        ranking.excluded,
        distinct
    );

    Ok(SegmentReport {
        name: layout.name,
        records,
        distinct,
        largest,
        threshold,
        entries: ranking.entries,
        excluded: ranking.excluded,
    })
}

/// First-level folders only, thresholded.
pub fn level1(input: &Path, writer: &mut RuleWriter) -> Result<SegmentReport> {
    run_pass(input, &rules::LEVEL1_FOLDERS, true, writer, |l| {
        path_prefix(l, LEVEL1_PARTS)
    })
}

/// Full rule file: folder levels 1 and 2, subdomains, parameter keys, then the fixed segments.
pub fn generate(
    input: &Path,
    writer: &mut RuleWriter,
    flags: PlatformFlags,
) -> Result<Vec<SegmentReport>> {
    let mut reports = Vec::with_capacity(4);

    reports.push(level1(input, writer)?);
    reports.push(run_pass(input, &rules::LEVEL2_FOLDERS, true, writer, |l| {
        path_prefix(l, LEVEL2_PARTS)
    })?);
    reports.push(run_pass(input, &rules::SUBDOMAINS, false, writer, |l| {
        path_prefix(l, SUBDOMAIN_PARTS)
    })?);
    reports.push(run_pass(
        input,
        &rules::PARAMETER_KEYS,
        false,
        writer,
        parameter_keys,
    )?);

    for (label, text) in presets::ALWAYS {
        info!("Writing {} segment", label);
        writer.append(text)?;
    }

    if flags.sfcc {
        info!("Salesforce Commerce Cloud detected, writing SFCC segment");
        writer.append(presets::SFCC)?;
    }
    // Shopify segment is written whether or not Shopify URLs were seen.
    writer.append(presets::SHOPIFY)?;

    info!("Rule file written to {}", writer.path().display());
    Ok(reports)
}
