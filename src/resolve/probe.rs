use std::path::Path;

use crate::foundation::{
    core::FrameSize,
    error::{SignError, SignResult},
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Source clip metadata needed for trimming and scaling.
pub struct ClipInfo {
    /// Container duration in seconds.
    pub duration_sec: f64,
    /// Native frame size of the first video stream.
    pub size: FrameSize,
}

/// Reads clip metadata. Implemented over `ffprobe`; tests substitute fixed values.
pub trait ClipProbe: Send + Sync {
    /// Probe the clip at `path`.
    fn probe(&self, path: &Path) -> SignResult<ClipInfo>;
}

#[derive(Clone, Copy, Debug, Default)]
/// [`ClipProbe`] backed by the system `ffprobe` binary.
pub struct FfprobeProbe;

impl ClipProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> SignResult<ClipInfo> {
        let out = std::process::Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| SignError::render(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(SignError::render(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        parse_ffprobe_json(&out.stdout)
    }
}

pub(crate) fn parse_ffprobe_json(bytes: &[u8]) -> SignResult<ClipInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| SignError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SignError::render("no video stream found"))?;
    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(SignError::render("missing video width/height from ffprobe"));
    };

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| SignError::render("missing or invalid clip duration from ffprobe"))?;

    Ok(ClipInfo {
        duration_sec,
        size: FrameSize { width, height },
    })
}

/// `true` if `ffprobe -version` runs successfully.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/probe.rs"]
mod tests;
