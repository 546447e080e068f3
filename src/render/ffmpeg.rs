use std::{
    ffi::OsString,
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use crate::{
    foundation::{
        core::DEFAULT_FPS,
        error::{SignError, SignResult},
    },
    render::cancel::CancelToken,
    timeline::builder::{Timeline, TimelineEntry},
};

/// Consumes a [`Timeline`] and writes exactly one media file.
///
/// Implementations must leave no partial file behind on failure or cancellation.
pub trait Renderer: Send {
    /// Render `timeline` into `out_path`.
    fn render(
        &mut self,
        timeline: &Timeline,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> SignResult<()>;
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// H.264 encoding parameters.
pub struct EncoderSettings {
    /// Output frame rate.
    pub fps: u32,
    /// x264 constant rate factor (0..=51, lower is better quality).
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
    /// Playback speed multiplier applied to every gesture and spacer.
    pub playback_rate: f64,
    /// Spacer fill color (RGB).
    pub spacer_rgb: [u8; 3],
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            crf: 23,
            preset: "medium".to_string(),
            playback_rate: 1.0,
            spacer_rgb: [0, 0, 0],
        }
    }
}

const PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

impl EncoderSettings {
    /// Slowest and fastest accepted playback rates.
    pub const PLAYBACK_RATE_RANGE: (f64, f64) = (0.25, 2.0);

    /// Check value ranges.
    pub fn validate(&self) -> SignResult<()> {
        if self.fps == 0 {
            return Err(SignError::config("encoder fps must be non-zero"));
        }
        if self.crf > 51 {
            return Err(SignError::config("encoder crf must be within 0..=51"));
        }
        if !PRESETS.contains(&self.preset.as_str()) {
            return Err(SignError::config(format!(
                "unknown x264 preset '{}'",
                self.preset
            )));
        }
        let (lo, hi) = Self::PLAYBACK_RATE_RANGE;
        if !(lo..=hi).contains(&self.playback_rate) {
            return Err(SignError::config(format!(
                "playback rate must be within {lo}..={hi}, got {}",
                self.playback_rate
            )));
        }
        Ok(())
    }

    fn spacer_color(&self) -> String {
        let [r, g, b] = self.spacer_rgb;
        format!("0x{r:02x}{g:02x}{b:02x}")
    }
}

/// Build the full `ffmpeg` argument list for `timeline`.
///
/// Each clip is one input trimmed with `-ss`/`-t`; each spacer is a `lavfi` color source.
/// The filter graph scales with letterboxing to the timeline size, normalizes SAR, fps and
/// pixel format, applies the playback rate and concatenates everything in order.
pub fn build_ffmpeg_args(
    timeline: &Timeline,
    out_path: &Path,
    settings: &EncoderSettings,
) -> SignResult<Vec<OsString>> {
    if timeline.clip_count() == 0 {
        return Err(SignError::empty_segmentation("timeline has no clips"));
    }
    timeline.size.validate()?;

    let (w, h) = (timeline.size.width, timeline.size.height);
    let fps = settings.fps;
    let rate = settings.playback_rate;

    let mut args: Vec<OsString> = ["-y", "-nostdin", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect();
    let mut filter = String::new();

    for (idx, entry) in timeline.entries.iter().enumerate() {
        match entry {
            TimelineEntry::Clip(clip) => {
                args.extend(
                    [
                        "-ss".to_string(),
                        format!("{:.6}", clip.trim_start_sec),
                        "-t".to_string(),
                        format!("{:.6}", clip.duration_sec()),
                        "-i".to_string(),
                    ]
                    .map(OsString::from),
                );
                args.push(clip.asset_path.clone().into_os_string());
                filter.push_str(&format!(
                    "[{idx}:v]setpts=(PTS-STARTPTS)/{rate},\
                     scale={w}:{h}:force_original_aspect_ratio=decrease,\
                     pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,\
                     setsar=1,fps={fps},format=yuv420p[v{idx}];"
                ));
            }
            TimelineEntry::Spacer(spacer) => {
                let d = spacer.duration_sec / rate;
                args.extend(
                    [
                        "-f".to_string(),
                        "lavfi".to_string(),
                        "-i".to_string(),
                        format!(
                            "color=c={}:s={w}x{h}:r={fps}:d={d:.6}",
                            settings.spacer_color()
                        ),
                    ]
                    .map(OsString::from),
                );
                filter.push_str(&format!("[{idx}:v]setsar=1,fps={fps},format=yuv420p[v{idx}];"));
            }
        }
    }

    for idx in 0..timeline.entries.len() {
        filter.push_str(&format!("[v{idx}]"));
    }
    filter.push_str(&format!(
        "concat=n={}:v=1:a=0[out]",
        timeline.entries.len()
    ));

    args.extend(
        [
            "-filter_complex".to_string(),
            filter,
            "-map".to_string(),
            "[out]".to_string(),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            settings.preset.clone(),
            "-crf".to_string(),
            settings.crf.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-r".to_string(),
            fps.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]
        .map(OsString::from),
    );
    args.push(out_path.as_os_str().to_owned());
    Ok(args)
}

/// `true` if `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> SignResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), "failed to remove partial output: {e}");
        }
    }
}

#[derive(Clone, Debug)]
/// [`Renderer`] that drives the system `ffmpeg` binary.
///
/// We use the `ffmpeg` executable rather than linking FFmpeg so no native dev headers are
/// needed. The child is polled so cancellation and the optional timeout can kill it.
pub struct FfmpegRenderer {
    settings: EncoderSettings,
    program: PathBuf,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl FfmpegRenderer {
    /// Renderer using `ffmpeg` from `PATH`.
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            settings,
            program: PathBuf::from("ffmpeg"),
            poll_interval: Duration::from_millis(50),
            timeout: None,
        }
    }

    /// Use a specific ffmpeg executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill the encoder and fail if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Encoding parameters.
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    fn wait(&self, child: &mut Child, cancel: &CancelToken) -> SignResult<ExitStatus> {
        let started = Instant::now();
        loop {
            if cancel.is_cancelled() {
                kill(child);
                return Err(SignError::Cancelled);
            }
            if self.timeout.is_some_and(|t| started.elapsed() > t) {
                kill(child);
                return Err(SignError::render(format!(
                    "ffmpeg timed out after {:.1}s",
                    started.elapsed().as_secs_f64()
                )));
            }
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => std::thread::sleep(self.poll_interval),
                Err(e) => {
                    kill(child);
                    return Err(SignError::render(format!(
                        "failed to wait for ffmpeg to finish: {e}"
                    )));
                }
            }
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Renderer for FfmpegRenderer {
    #[tracing::instrument(skip(self, timeline, cancel), fields(out = %out_path.display()))]
    fn render(
        &mut self,
        timeline: &Timeline,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> SignResult<()> {
        cancel.check()?;
        self.settings.validate()?;
        timeline.validate()?;
        let args = build_ffmpeg_args(timeline, out_path, &self.settings)?;
        ensure_parent_dir(out_path)?;

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SignError::render(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        // Drain stderr on a side thread so a chatty encoder cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let status = self.wait(&mut child, cancel);
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                remove_partial(out_path);
                return Err(e);
            }
        };
        if !status.success() {
            remove_partial(out_path);
            return Err(SignError::render(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        if !out_path.is_file() {
            return Err(SignError::render(
                "ffmpeg reported success but wrote no output file",
            ));
        }

        tracing::info!(
            clips = timeline.clip_count(),
            seconds = timeline.total_duration_sec(),
            "render finished"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/ffmpeg.rs"]
mod tests;
