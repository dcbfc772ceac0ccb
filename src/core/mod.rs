//! Core building blocks: job configuration, scheduler submission, the
//! per-image worker loop, and the SynthSeg label table. These are the
//! primitives consumed by the high-level `api` module.
pub mod labels;
pub mod params;
pub mod submit;
pub mod worker;
