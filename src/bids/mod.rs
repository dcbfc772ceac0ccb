//! BIDS dataset layer: anatomical image discovery, entity/derivative naming,
//! and table conversion for the worker's outputs.
pub mod discovery;
pub use discovery::{find_anatomical_images, read_image_list};

pub mod naming;
pub use naming::{AnatomicalImage, SPACE_ORIG, SPACE_SYNTHSEG};

pub mod tables;
pub use tables::csv_to_bids_tsv;
