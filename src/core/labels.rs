//! SynthSeg whole-brain label table and the derivative sidecars built from
//! it: the per-segmentation `dseg.tsv` and the posterior `probseg` label-map
//! JSON.
//!
//! Indices follow the SynthSeg label table shipped with the model (no
//! cortical parcellation).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::json;

use crate::error::Result;

/// (label index, structure name), ordered by index.
pub const SYNTHSEG_LABELS: &[(u16, &str)] = &[
    (0, "background"),
    (2, "left_cerebral_white_matter"),
    (3, "left_cerebral_cortex"),
    (4, "left_lateral_ventricle"),
    (5, "left_inferior_lateral_ventricle"),
    (7, "left_cerebellum_white_matter"),
    (8, "left_cerebellum_cortex"),
    (10, "left_thalamus"),
    (11, "left_caudate"),
    (12, "left_putamen"),
    (13, "left_pallidum"),
    (14, "3rd_ventricle"),
    (15, "4th_ventricle"),
    (16, "brain-stem"),
    (17, "left_hippocampus"),
    (18, "left_amygdala"),
    (26, "left_accumbens_area"),
    (28, "left_ventral_DC"),
    (41, "right_cerebral_white_matter"),
    (42, "right_cerebral_cortex"),
    (43, "right_lateral_ventricle"),
    (44, "right_inferior_lateral_ventricle"),
    (46, "right_cerebellum_white_matter"),
    (47, "right_cerebellum_cortex"),
    (49, "right_thalamus"),
    (50, "right_caudate"),
    (51, "right_putamen"),
    (52, "right_pallidum"),
    (53, "right_hippocampus"),
    (54, "right_amygdala"),
    (58, "right_accumbens_area"),
    (60, "right_ventral_DC"),
];

/// Structure names ordered by label index, as the probseg label map wants.
pub fn label_names() -> Vec<&'static str> {
    SYNTHSEG_LABELS.iter().map(|(_, name)| *name).collect()
}

/// Write the BIDS `dseg.tsv` label table (`index\tname` header).
pub fn write_dseg_tsv(path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "index\tname")?;
    for (index, name) in SYNTHSEG_LABELS {
        writeln!(writer, "{}\t{}", index, name)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the probseg JSON sidecar: `{"LabelMap": [names ordered by index]}`.
pub fn write_label_map_json(path: &Path) -> Result<()> {
    let map = json!({ "LabelMap": label_names() });
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &map).map_err(|e| crate::error::Error::external(e))?;
    writer.flush()?;
    Ok(())
}
