// Property checks for validation, progress math and encoding
use base64::{Engine as _, engine::general_purpose};
use image_base64::converter::{
    encode, progress_percent, validate, ConverterConfig, ProgressTracker, RejectReason, SourceFile,
    ValidationResult, MAX_FILE_SIZE, SUPPORTED_FORMATS,
};
use proptest::prelude::*;

fn supported_type() -> impl Strategy<Value = String> {
    prop::sample::select(SUPPORTED_FORMATS.to_vec()).prop_map(str::to_owned)
}

fn unsupported_type() -> impl Strategy<Value = String> {
    "[a-z]{0,8}(/[a-z+.-]{0,12})?".prop_filter("must not be a supported type", |media_type| {
        !SUPPORTED_FORMATS.contains(&media_type.as_str())
    })
}

proptest! {
    #[test]
    fn unsupported_types_are_rejected_at_any_size(media_type in unsupported_type(), size in 0u64..=2 * MAX_FILE_SIZE) {
        let config = ConverterConfig::default();
        prop_assert_eq!(
            validate(&media_type, size, &config),
            ValidationResult::Rejected(RejectReason::UnsupportedType)
        );
    }

    #[test]
    fn oversized_supported_files_are_too_large(media_type in supported_type(), extra in 1u64..=MAX_FILE_SIZE) {
        let config = ConverterConfig::default();
        prop_assert_eq!(
            validate(&media_type, MAX_FILE_SIZE + extra, &config),
            ValidationResult::Rejected(RejectReason::TooLarge)
        );
    }

    #[test]
    fn supported_files_within_limit_are_accepted(media_type in supported_type(), size in 0u64..=MAX_FILE_SIZE) {
        let config = ConverterConfig::default();
        prop_assert_eq!(validate(&media_type, size, &config), ValidationResult::Accepted);
    }

    #[test]
    fn progress_percent_is_bounded(total in 1u64..=u64::from(u32::MAX), fraction in 0.0f64..=1.0) {
        let loaded = ((total as f64) * fraction) as u64;
        let percent = progress_percent(loaded.min(total), Some(total)).expect("known total");
        prop_assert!(percent <= 100);
        prop_assert_eq!(progress_percent(total, Some(total)), Some(100));
    }

    #[test]
    fn tracker_never_reports_a_lower_value(steps in prop::collection::vec(0u64..=1_000, 1..32)) {
        let mut tracker = ProgressTracker::default();
        let mut highest = 0u8;
        for loaded in steps {
            if let Some(percent) = tracker.advance(loaded, Some(1_000)) {
                prop_assert!(percent >= highest);
                highest = percent;
            }
            prop_assert!(tracker.last() >= highest);
        }
    }

    #[test]
    fn encoded_payload_decodes_to_input(
        bytes in prop::collection::vec(any::<u8>(), 0..4_096),
        chunk_size in 1usize..5_000,
        media_type in supported_type(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let file = SourceFile::from_bytes("prop.bin", media_type.clone(), bytes.clone());
        let uri = runtime.block_on(encode(&file, chunk_size, |_, _| {})).expect("encode");

        let prefix = format!("data:{};base64,", media_type);
        prop_assert!(uri.starts_with(&prefix));
        let decoded = general_purpose::STANDARD.decode(&uri[prefix.len()..]).expect("decode");
        prop_assert_eq!(decoded, bytes);
    }
}
