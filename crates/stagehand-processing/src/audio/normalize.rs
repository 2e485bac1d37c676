//! Lookup tables turning raw probe values into normalized metadata

use stagehand_core::FileFormat;

/// Container names as reported by ffprobe's `format_name`, lowercased
const FORMAT_TABLE: &[(&str, FileFormat)] = &[
    ("wav", FileFormat::Wav),
    ("mp3", FileFormat::Mp3),
    ("flac", FileFormat::Flac),
    ("aac", FileFormat::Aac),
    ("m4a", FileFormat::M4a),
    ("mov,mp4,m4a,3gp,3g2,mj2", FileFormat::M4a),
    ("ogg", FileFormat::Ogg),
    ("aiff", FileFormat::Aiff),
];

/// Codec-name substrings with a fixed sample width, checked in order
const BIT_DEPTH_TABLE: &[(&str, u32)] = &[
    ("pcm_s16", 16),
    ("pcm_s24", 24),
    ("pcm_s32", 32),
    ("pcm_f32", 32),
    ("pcm_f64", 64),
];

/// Map a probe format name to its family; anything unlisted is `Unknown`
pub fn normalize_format(format_name: &str) -> FileFormat {
    let format_name = format_name.trim().to_lowercase();
    FORMAT_TABLE
        .iter()
        .find(|(name, _)| *name == format_name)
        .map(|(_, format)| *format)
        .unwrap_or(FileFormat::Unknown)
}

/// Bit depth implied by the codec name, `None` for codecs without a fixed width
pub fn infer_bit_depth(codec_name: &str) -> Option<u32> {
    let codec_name = codec_name.to_lowercase();
    BIT_DEPTH_TABLE
        .iter()
        .find(|(substring, _)| codec_name.contains(substring))
        .map(|(_, bits)| *bits)
}
