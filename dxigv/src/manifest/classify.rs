//! File classification by name suffix, and logical-name normalization.

/// Extension of precomputed IGV coverage files.
pub const COVERAGE_EXTENSION: &str = "tdf";

/// Category of a project file as seen by IGV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `*bam`, requires a `.bai` index.
    Alignment,
    /// `*vcf.gz`, requires a `.tbi` or `.idx` index.
    Variant,
    /// `*bw`
    CoverageTrack,
    /// `*bed.gz`
    IntervalTrack,
    /// `*seg`
    SegmentFile,
    /// `*cn`
    CopyNumberFile,
    /// Anything else; ignored.
    Unrecognized,
}

/// Suffixes in match priority order. Matching is case-sensitive.
const SUFFIXES: &[(&str, FileKind)] = &[
    ("bam", FileKind::Alignment),
    ("vcf.gz", FileKind::Variant),
    ("bw", FileKind::CoverageTrack),
    ("bed.gz", FileKind::IntervalTrack),
    ("seg", FileKind::SegmentFile),
    ("cn", FileKind::CopyNumberFile),
];

impl FileKind {
    /// Index extensions to probe, in priority order. Empty for track types.
    pub fn index_extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Alignment => &["bai"],
            FileKind::Variant => &["tbi", "idx"],
            _ => &[],
        }
    }

    /// Whether an entry of this kind is only emitted with a paired index.
    pub fn requires_index(self) -> bool {
        !self.index_extensions().is_empty()
    }

    /// Whether IGV can load this kind at all.
    pub fn is_recognized(self) -> bool {
        self != FileKind::Unrecognized
    }
}

/// Classify a file by the literal suffix of its name.
pub fn classify(name: &str) -> FileKind {
    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, kind)| *kind)
        .unwrap_or(FileKind::Unrecognized)
}

/// Pipeline naming artifacts rewritten before a name is shown to IGV.
const GVCF_TOKEN: &str = "gvcf.gz";
const GVCF_REPLACEMENT: &str = "g.vcf.gz";
const PIPELINE_INFIX: &str = "merged.dedup.realigned.";

/// The user-facing name of a file.
///
/// Rewrites `gvcf.gz` to `g.vcf.gz` and strips every `merged.dedup.realigned.`,
/// repeating until the name is stable so that normalization is idempotent.
pub fn logical_name(raw: &str) -> String {
    let mut name = raw.to_string();
    loop {
        let next = name
            .replace(GVCF_TOKEN, GVCF_REPLACEMENT)
            .replace(PIPELINE_INFIX, "");
        if next == name {
            return name;
        }
        name = next;
    }
}

/// Candidate names of a coverage file for an alignment file.
///
/// `sample.bam` yields `sample.tdf` then `sample.bam.tdf`.
pub fn coverage_candidates(alignment_name: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(stem) = alignment_name.strip_suffix(".bam") {
        candidates.push(format!("{}.{}", stem, COVERAGE_EXTENSION));
    }
    candidates.push(format!("{}.{}", alignment_name, COVERAGE_EXTENSION));
    candidates
}

/// Name of the index file for `data_name` with the given extension.
pub fn index_name(data_name: &str, extension: &str) -> String {
    format!("{}.{}", data_name, extension)
}
