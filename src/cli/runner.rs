use std::path::PathBuf;

use clap::CommandFactory;
use tracing::info;

use synthsub::core::params::{SiteDefaults, SubmitParams, default_entrypoint};
use synthsub::core::submit::Scheduler;
use synthsub::types::ImageSelector;
use synthsub::{api, bids};

use super::args::CliArgs;
use super::errors::AppError;

/// Decide which of the three entry modes the positional arguments name.
/// Image paths are recognized by their `.nii.gz` extension, a single other
/// argument is an image-list file, and a pair is subject/session.
fn classify_inputs(inputs: &[String]) -> Result<ImageSelector, AppError> {
    if inputs.is_empty() {
        return Err(AppError::MissingArgument {
            arg: "SUBJECT SESSION | IMAGE... | LIST_FILE".to_string(),
        });
    }

    if inputs.iter().all(|s| s.ends_with(bids::naming::NIFTI_GZ_EXT)) {
        return Ok(ImageSelector::Explicit(
            inputs.iter().map(PathBuf::from).collect(),
        ));
    }

    match inputs {
        [list_file] => Ok(ImageSelector::ListFile(PathBuf::from(list_file))),
        [subject, session] => Ok(ImageSelector::SubjectSession {
            subject: subject.clone(),
            session: session.clone(),
        }),
        _ => Err(AppError::AmbiguousInputs {
            reason: format!(
                "{} positional arguments; expected SUBJECT SESSION, .nii.gz paths, or one list file",
                inputs.len()
            ),
        }),
    }
}

/// Surface a validation failure together with the usage line, keeping the
/// exit-code split: clap handles malformed options, these exit via `main`.
fn usage_error(err: AppError) -> Box<dyn std::error::Error> {
    eprintln!("{}", CliArgs::command().render_usage());
    err.into()
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    // Validate before touching the filesystem or the scheduler
    let output_dataset = args.output_dataset.ok_or_else(|| {
        usage_error(AppError::MissingArgument {
            arg: "--output-dataset".to_string(),
        })
    })?;
    let selector = classify_inputs(&args.inputs).map_err(usage_error)?;

    let defaults = SiteDefaults::default();
    let params = SubmitParams {
        input_dataset: args.input_dataset.unwrap_or(defaults.input_dataset),
        mask_dataset: args.mask_dataset.unwrap_or(defaults.mask_dataset),
        output_dataset,
        container: args.container.unwrap_or(defaults.container),
        entrypoint: args.entrypoint.unwrap_or_else(default_entrypoint),
        gpu: args.gpu,
        posteriors: args.posteriors,
        ants: args.ants,
    };

    info!(
        "Submitting {} from dataset {:?}",
        selector, params.input_dataset
    );

    let outcome = api::submit(&params, &Scheduler::default(), &selector)?;

    info!(
        "Job {} accepted; scheduler log will be written to {:?}",
        outcome.job_id.as_deref().unwrap_or("(id unknown)"),
        outcome.log_path
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn usage_line_names_the_command_and_modes() {
        let usage = CliArgs::command().render_usage().to_string();
        assert!(usage.starts_with("Usage:"), "got: {usage}");
        assert!(usage.contains("synthsub"));
        assert!(usage.contains("SUBJECT SESSION | IMAGE... | LIST_FILE"));
    }

    #[test]
    fn missing_output_dataset_fails_before_any_submission() {
        let args =
            CliArgs::try_parse_from(["synthsub", "123456", "20160429x0000"]).unwrap();
        let err = run(args).unwrap_err();
        let app = err.downcast_ref::<AppError>().expect("validation error from the CLI layer");
        assert!(
            matches!(app, AppError::MissingArgument { arg } if arg == "--output-dataset"),
            "got: {app}"
        );
    }

    #[test]
    fn no_positionals_is_a_usage_error() {
        assert!(matches!(
            classify_inputs(&[]),
            Err(AppError::MissingArgument { .. })
        ));
    }

    #[test]
    fn nii_gz_paths_select_explicit_mode() {
        let inputs = vec![
            "sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz".to_string(),
            "sub-2/ses-1/anat/sub-2_ses-1_T1w.nii.gz".to_string(),
        ];
        let selector = classify_inputs(&inputs).unwrap();
        assert!(matches!(selector, ImageSelector::Explicit(images) if images.len() == 2));
    }

    #[test]
    fn a_pair_selects_subject_session_mode() {
        let selector =
            classify_inputs(&["123456".to_string(), "20160429x0000".to_string()]).unwrap();
        assert_eq!(
            selector,
            ImageSelector::SubjectSession {
                subject: "123456".to_string(),
                session: "20160429x0000".to_string(),
            }
        );
    }

    #[test]
    fn a_single_non_image_selects_list_file_mode() {
        let selector = classify_inputs(&["images.txt".to_string()]).unwrap();
        assert_eq!(selector, ImageSelector::ListFile(PathBuf::from("images.txt")));
    }

    #[test]
    fn three_non_image_positionals_are_ambiguous() {
        let inputs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(matches!(
            classify_inputs(&inputs),
            Err(AppError::AmbiguousInputs { .. })
        ));
    }
}
