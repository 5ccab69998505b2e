//! Resource materialization around a run
//!
//! Before the walk every external resource is embedded and then written back
//! out next to the document, so the staging directory holds one local copy of
//! each texture. Afterwards the resources are embedded again and the staging
//! directory goes away.

use respacker_core::{Result, ResultExt};
use respacker_scene::{PackReport, SceneHost, UnpackMethod};
use tracing::info;

use crate::report::{ExportReport, Warning};
use crate::workspace::Workspace;

/// Pack everything, then unpack to local files
pub fn materialize<H: SceneHost + ?Sized>(host: &mut H, report: &mut ExportReport) -> Result<()> {
    let packed = host.pack_all().context("packing resources")?;
    record_skipped(&packed, report);
    report.resources_packed = packed.processed.len();

    let unpacked = host
        .unpack_all(UnpackMethod::WriteLocal)
        .context("unpacking resources")?;
    report.resources_unpacked = unpacked.processed.len();

    info!(
        packed = report.resources_packed,
        unpacked = report.resources_unpacked,
        "Materialized resources"
    );
    Ok(())
}

/// Pack everything again and optionally drop the staging directory
///
/// Both steps are attempted; the first failure is returned.
pub fn restore<H: SceneHost + ?Sized>(
    host: &mut H,
    workspace: &Workspace,
    remove_staging: bool,
    report: &mut ExportReport,
) -> Result<()> {
    let packed = host.pack_all().context("re-packing resources");
    if let Ok(packed) = &packed {
        record_skipped(packed, report);
    }

    let removed = if remove_staging {
        workspace.remove_staging().map(|_| ())
    } else {
        Ok(())
    };

    packed.map(|_| ())?;
    removed
}

fn record_skipped(packed: &PackReport, report: &mut ExportReport) {
    for (name, reason) in &packed.skipped {
        report.warn(Warning::new(format!("resource '{name}' not packed: {reason}")));
    }
}
