use metrics::{describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    static NAME: &str = "waveform_roi_finder_component_info";

    describe_gauge!(NAME, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(NAME, "component" => name, "git_version" => git_rev).set(1);
}

pub mod names {
    pub const CHANNELS_PROCESSED: &str = "waveform_roi_finder_channels_processed";
    pub const REGIONS_EMITTED: &str = "waveform_roi_finder_regions_emitted";
    pub const TICKS_RETAINED: &str = "waveform_roi_finder_ticks_retained";
    pub const FAILURES: &str = "waveform_roi_finder_failures";
}

pub mod failures {
    #[derive(Debug, Clone, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        ClassifierFailed,
        FileWriteFailed,
        InvalidRegion,
        SourceReadFailed,
        ViewOutOfRange,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::ClassifierFailed => "classifier_failed",
                FailureKind::FileWriteFailed => "file_write_failed",
                FailureKind::InvalidRegion => "invalid_region",
                FailureKind::SourceReadFailed => "source_read_failed",
                FailureKind::ViewOutOfRange => "view_out_of_range",
            },
        )
    }
}
