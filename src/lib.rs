#![doc = r#"
synthsub — batch submission and worker toolkit for containerized SynthSeg
brain-MRI segmentation over BIDS datasets.

This crate powers two binaries: `synthsub`, which resolves a subject/session
pair (or an explicit image list) into anatomical images and submits exactly
one LSF job per invocation, and `synthsub-seg`, the worker the submitted job
executes, which drives the SynthSeg container once per image and renames its
outputs into BIDS-derivative form. Both are thin layers over the library API
in [`api`].

Requirements
------------
- An LSF installation (`bsub` on PATH) on the submitting host.
- Singularity and node-local scratch on the execution hosts.

Quick start: submit a subject/session
-------------------------------------
```rust,no_run
use std::path::PathBuf;
use synthsub::{
    api, ImageSelector, Scheduler, SubmitParams,
    core::params::{SiteDefaults, default_entrypoint},
};

fn main() -> synthsub::Result<()> {
    let defaults = SiteDefaults::default();
    let params = SubmitParams {
        input_dataset: defaults.input_dataset,
        mask_dataset: defaults.mask_dataset,
        output_dataset: PathBuf::from("/project/study/derivatives/synthseg"),
        container: defaults.container,
        entrypoint: default_entrypoint(),
        gpu: true,
        posteriors: false,
        ants: false,
    };

    let selector = ImageSelector::SubjectSession {
        subject: "123456".to_string(),
        session: "20160429x0000".to_string(),
    };

    let outcome = api::submit(&params, &Scheduler::default(), &selector)?;
    println!("job id: {:?}", outcome.job_id);
    Ok(())
}
```

Resolve images without submitting
---------------------------------
```rust,no_run
use std::path::Path;
use synthsub::{api, ImageSelector};

fn main() -> synthsub::Result<()> {
    let images = api::resolve_images(
        Path::new("/project/pipelines/bids/raw"),
        &ImageSelector::SubjectSession {
            subject: "123456".to_string(),
            session: "20160429x0000".to_string(),
        },
    )?;
    for image in &images {
        println!("{}", image.display());
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `synthsub::Result<T>`; match on `synthsub::Error`
to handle specific cases, e.g. resolution or scheduler errors.

```rust,no_run
use std::path::Path;
use synthsub::{api, Error, ImageSelector};

fn main() {
    let selector = ImageSelector::SubjectSession {
        subject: "000000".to_string(),
        session: "19990101x0000".to_string(),
    };
    match api::resolve_images(Path::new("/project/pipelines/bids/raw"), &selector) {
        Ok(images) => println!("{} image(s)", images.len()),
        Err(Error::NoImagesFound { subject, session, .. }) => {
            eprintln!("nothing to segment for sub-{subject}/ses-{session}")
        }
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`bids`] — dataset scanning, BIDS naming, and table conversion.
- [`core`] — job configuration, scheduler submission, the worker loop,
  and the SynthSeg label table.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod bids;
pub mod core;
pub mod error;
pub mod types;

// Curated public API surface
// Types
pub use core::params::{RunParams, SiteDefaults, SubmitParams};
pub use error::{Error, Result};
pub use types::ImageSelector;

// Submission and worker primitives
pub use core::submit::{Scheduler, SubmitOutcome};
pub use core::worker::RunReport;

// Dataset layer
pub use bids::{AnatomicalImage, csv_to_bids_tsv, find_anatomical_images, read_image_list};

// High-level API re-exports
pub use api::{resolve_images, run_segmentation, submit};
