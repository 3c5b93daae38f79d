//! Video assembly: an ordered frame sequence plus an optional audio cue,
//! encoded to H.264/AAC by an external ffmpeg process.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use paperanim_common::error::{AnimatorError, AnimatorResult};
use paperanim_frame_model::frame::FrameSequence;

/// Playback rate used when the requested one is unusable.
pub const FALLBACK_WPS: f64 = 0.1;

/// Output audio sample rate; the per-frame audio unit is sized in samples of this rate.
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Rough output bitrate used by [`estimate_file_size`].
const ESTIMATED_MB_PER_SEC: f64 = 1.5;

const FRAME_FILE_PATTERN: &str = "frame_%06d.png";

/// An assembly job: where to write and how to pace the frames.
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    /// Output file path.
    pub output_path: PathBuf,

    /// How long each frame stays on screen.
    pub seconds_per_frame: f64,

    /// Cue replayed at the start of every frame.
    pub audio_track: Option<PathBuf>,

    /// Output video frame rate.
    pub output_fps: u32,

    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

impl AssemblyJob {
    pub fn new(output_path: impl Into<PathBuf>, seconds_per_frame: f64) -> Self {
        Self {
            output_path: output_path.into(),
            seconds_per_frame,
            audio_track: None,
            output_fps: 24,
            video_bitrate_kbps: 6000,
            audio_bitrate_kbps: 192,
        }
    }

    pub fn with_audio(mut self, audio_track: Option<PathBuf>) -> Self {
        self.audio_track = audio_track;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.output_fps = fps;
        self
    }

    pub fn with_bitrates(mut self, video_kbps: u32, audio_kbps: u32) -> Self {
        self.video_bitrate_kbps = video_kbps;
        self.audio_bitrate_kbps = audio_kbps;
        self
    }
}

/// Progress callback for video assembly.
pub type ProgressCallback = Box<dyn Fn(AssemblyProgress) + Send>;

/// Assembly progress report.
#[derive(Debug, Clone)]
pub struct AssemblyProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Source frames covered by the encoder so far.
    pub frames_encoded: u64,

    /// Source frames in the sequence.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: AssemblyStage,
}

/// Stages of video assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    /// Writing frame images to scratch space.
    Preparing,
    Encoding,
    Complete,
}

/// Turns frames into a video file.
///
/// Failure is reported as `false`; implementations log the cause.
pub trait VideoAssembler: Send {
    fn assemble(
        &mut self,
        frames: &FrameSequence,
        job: &AssemblyJob,
        progress: Option<ProgressCallback>,
    ) -> bool;

    /// Check if this assembler can run on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Assemble `frames` with `assembler` on a blocking worker thread.
pub async fn assemble_video<A>(
    mut assembler: A,
    frames: FrameSequence,
    job: AssemblyJob,
    progress: Option<ProgressCallback>,
) -> bool
where
    A: VideoAssembler + 'static,
{
    tracing::info!(
        assembler = assembler.name(),
        output = %job.output_path.display(),
        frames = frames.len(),
        seconds_per_frame = job.seconds_per_frame,
        "Starting video assembly"
    );

    let handle = tokio::task::spawn_blocking(move || {
        if !assembler.is_available() {
            tracing::error!(
                assembler = assembler.name(),
                "Video assembler is not available on this system"
            );
            return false;
        }
        assembler.assemble(&frames, &job, progress)
    });

    match handle.await {
        Ok(ok) => ok,
        Err(err) => {
            tracing::error!(error = %err, "Video assembly task panicked");
            false
        }
    }
}

/// ffmpeg command-line assembler.
#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    binary: String,
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct AssemblyPlan {
    ffmpeg_args: Vec<String>,
    total_frames: u64,
    expected_duration_secs: f64,
}

impl FfmpegAssembler {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn try_assemble(
        &self,
        frames: &FrameSequence,
        job: &AssemblyJob,
        progress: Option<ProgressCallback>,
    ) -> AnimatorResult<()> {
        let started = std::time::Instant::now();
        validate(frames, job)?;

        if let Some(parent) = job.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let total_frames = frames.len() as u64;
        if let Some(cb) = &progress {
            cb(AssemblyProgress {
                progress: 0.0,
                frames_encoded: 0,
                total_frames,
                eta_secs: 0.0,
                stage: AssemblyStage::Preparing,
            });
        }

        let scratch = tempfile::Builder::new().prefix("paperanim-frames-").tempdir()?;
        write_frames(frames, scratch.path())?;
        tracing::debug!(
            dir = %scratch.path().display(),
            write_ms = started.elapsed().as_millis(),
            "Frame images written"
        );

        let audio = usable_audio(job.audio_track.as_deref());
        let plan = build_plan(job, frames, scratch.path(), audio);
        match self.run_ffmpeg(&plan, progress.as_ref()) {
            Ok(()) => {}
            Err(err) if audio.is_some() => {
                tracing::warn!(error = %err, "Encoding with audio failed; retrying without audio");
                let silent = build_plan(job, frames, scratch.path(), None);
                self.run_ffmpeg(&silent, progress.as_ref())?;
            }
            Err(err) => return Err(err),
        }

        if let Some(cb) = &progress {
            cb(AssemblyProgress {
                progress: 1.0,
                frames_encoded: total_frames,
                total_frames,
                eta_secs: 0.0,
                stage: AssemblyStage::Complete,
            });
        }

        tracing::info!(
            output = %job.output_path.display(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Video assembly finished"
        );
        Ok(())
    }

    fn run_ffmpeg(
        &self,
        plan: &AssemblyPlan,
        progress: Option<&ProgressCallback>,
    ) -> AnimatorResult<()> {
        tracing::debug!(args = ?plan.ffmpeg_args, "Running ffmpeg");
        let mut cmd = Command::new(&self.binary);
        cmd.args(&plan.ffmpeg_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| AnimatorError::export(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            total_frames = plan.total_frames,
            duration_secs = plan.expected_duration_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AnimatorError::export("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AnimatorError::export("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut latest = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| AnimatorError::export(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            latest.update(key, value);
            if key == "progress" {
                if let Some(cb) = progress {
                    cb(progress_report(
                        &latest,
                        plan.total_frames,
                        plan.expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| AnimatorError::export(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(AnimatorError::export(format!(
                "ffmpeg failed (status {}): {}",
                status,
                stderr_tail(&stderr_output, 20)
            )));
        }
        Ok(())
    }
}

impl VideoAssembler for FfmpegAssembler {
    fn assemble(
        &mut self,
        frames: &FrameSequence,
        job: &AssemblyJob,
        progress: Option<ProgressCallback>,
    ) -> bool {
        match self.try_assemble(frames, job, progress) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    output = %job.output_path.display(),
                    "Video assembly failed"
                );
                false
            }
        }
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn validate(frames: &FrameSequence, job: &AssemblyJob) -> AnimatorResult<()> {
    if frames.is_empty() {
        return Err(AnimatorError::invalid_input("No frames to assemble"));
    }
    if !(job.seconds_per_frame.is_finite() && job.seconds_per_frame > 0.0) {
        return Err(AnimatorError::invalid_input(format!(
            "Seconds per frame must be positive, got {}",
            job.seconds_per_frame
        )));
    }
    if job.output_fps == 0 {
        return Err(AnimatorError::invalid_input("Output fps must be positive"));
    }

    let dims = frames.dimensions();
    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| Some(f.dimensions()) != dims)
    {
        return Err(AnimatorError::invalid_input(format!(
            "Frame {index} is {:?}, expected {:?}",
            frame.dimensions(),
            dims.unwrap_or_default()
        )));
    }
    Ok(())
}

fn write_frames(frames: &FrameSequence, dir: &Path) -> AnimatorResult<()> {
    for (index, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("frame_{index:06}.png"));
        frame
            .image()
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| AnimatorError::export(format!("Failed to write {}: {e}", path.display())))?;
    }
    Ok(())
}

/// The audio track if it exists; a missing file degrades to silent video.
fn usable_audio(audio: Option<&Path>) -> Option<&Path> {
    let path = audio?;
    if path.is_file() {
        Some(path)
    } else {
        tracing::warn!(path = %path.display(), "Audio file not found; producing silent video");
        None
    }
}

fn build_plan(
    job: &AssemblyJob,
    frames: &FrameSequence,
    frame_dir: &Path,
    audio: Option<&Path>,
) -> AssemblyPlan {
    let total_frames = frames.len() as u64;
    AssemblyPlan {
        ffmpeg_args: build_ffmpeg_args(job, frame_dir, total_frames, audio),
        total_frames,
        expected_duration_secs: frames.duration_secs(job.seconds_per_frame),
    }
}

fn build_ffmpeg_args(
    job: &AssemblyJob,
    frame_dir: &Path,
    total_frames: u64,
    audio: Option<&Path>,
) -> Vec<String> {
    let total_secs = total_frames as f64 * job.seconds_per_frame;
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-nostats".into(),
        "-progress".into(),
        "pipe:1".into(),
        "-framerate".into(),
        input_framerate(job.seconds_per_frame),
        "-i".into(),
        frame_dir.join(FRAME_FILE_PATTERN).display().to_string(),
    ];

    if let Some(audio) = audio {
        args.extend([
            "-i".into(),
            audio.display().to_string(),
            "-filter_complex".into(),
            audio_filter(job.seconds_per_frame, total_frames),
            "-map".into(),
            "0:v".into(),
            "-map".into(),
            "[aout]".into(),
        ]);
    }

    args.extend([
        "-r".into(),
        job.output_fps.to_string(),
        "-t".into(),
        format!("{total_secs:.6}"),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "medium".into(),
        "-b:v".into(),
        format!("{}k", job.video_bitrate_kbps),
        "-pix_fmt".into(),
        "yuv420p".into(),
    ]);

    if audio.is_some() {
        args.extend([
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            format!("{}k", job.audio_bitrate_kbps),
        ]);
    } else {
        args.push("-an".into());
    }

    args.extend([
        "-movflags".into(),
        "+faststart".into(),
        job.output_path.display().to_string(),
    ]);
    args
}

/// Image input rate as an exact rational: one image per `seconds_per_frame`.
fn input_framerate(seconds_per_frame: f64) -> String {
    let micros = (seconds_per_frame * 1_000_000.0).round().max(1.0) as u64;
    format!("1000000/{micros}")
}

/// Filter graph that cuts or pads the clip to exactly one frame's duration
/// and repeats that unit once per frame.
fn audio_filter(seconds_per_frame: f64, total_frames: u64) -> String {
    let unit_samples = (seconds_per_frame * AUDIO_SAMPLE_RATE as f64).round() as u64;
    format!(
        "[1:a]aresample={rate},apad=whole_dur={spf:.6},atrim=end={spf:.6},\
         asetpts=N/SR/TB,aloop=loop={loops}:size={unit_samples}[aout]",
        rate = AUDIO_SAMPLE_RATE,
        spf = seconds_per_frame,
        loops = total_frames.saturating_sub(1),
    )
}

fn stderr_tail(output: &str, lines: usize) -> String {
    let all: Vec<&str> = output.trim().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// Seconds each frame is shown for a words-per-second rate.
pub fn seconds_per_frame(wps: f64) -> f64 {
    let wps = if wps.is_finite() && wps > 0.0 {
        wps
    } else {
        FALLBACK_WPS
    };
    1.0 / wps
}

/// Human-readable size estimate for the encoded video.
pub fn estimate_file_size(frame_count: usize, seconds_per_frame: f64) -> String {
    if frame_count == 0 {
        return "0 MB".to_string();
    }
    let estimated_mb = frame_count as f64 * seconds_per_frame * ESTIMATED_MB_PER_SEC;
    if estimated_mb > 1024.0 {
        format!("{:.1} GB", estimated_mb / 1024.0)
    } else {
        format!("{estimated_mb:.1} MB")
    }
}

/// Duration of an audio file in seconds, or `0.0` if it cannot be probed.
pub fn probe_audio_duration(path: &Path) -> f64 {
    if !path.is_file() {
        return 0.0;
    }
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output();

    match output {
        Ok(out) if out.status.success() => parse_duration(&String::from_utf8_lossy(&out.stdout)),
        Ok(out) => {
            tracing::debug!(status = %out.status, path = %path.display(), "ffprobe failed");
            0.0
        }
        Err(err) => {
            tracing::debug!(error = %err, "Failed to run ffprobe");
            0.0
        }
    }
}

fn parse_duration(raw: &str) -> f64 {
    raw.lines()
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}

/// Whether `binary` can be run: an executable file when it is a path,
/// otherwise a name that resolves on PATH.
pub fn command_exists(binary: &str) -> bool {
    if binary.is_empty() {
        return false;
    }
    if Path::new(binary).components().count() > 1 {
        return is_executable(Path::new(binary));
    }
    // Passed as a positional parameter so the name is never parsed by the shell.
    Command::new("sh")
        .args(["-c", "command -v \"$1\" >/dev/null 2>&1", "sh", binary])
        .stdin(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> AssemblyProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };
    let progress = if state.complete { 1.0 } else { progress };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    AssemblyProgress {
        progress,
        frames_encoded: (progress * total_frames as f64).floor() as u64,
        total_frames,
        eta_secs,
        stage: AssemblyStage::Encoding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use paperanim_frame_model::frame::Frame;

    fn frames(count: usize, w: u32, h: u32) -> FrameSequence {
        (0..count)
            .map(|i| Frame::new(RgbImage::from_pixel(w, h, Rgb([i as u8, 0, 0]))))
            .collect()
    }

    #[test]
    fn test_seconds_per_frame() {
        assert!((seconds_per_frame(2.0) - 0.5).abs() < 1e-12);
        assert!((seconds_per_frame(1.5) - 1.0 / 1.5).abs() < 1e-12);
        assert!((seconds_per_frame(0.0) - 10.0).abs() < 1e-12);
        assert!((seconds_per_frame(-3.0) - 10.0).abs() < 1e-12);
        assert!((seconds_per_frame(f64::NAN) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_file_size() {
        assert_eq!(estimate_file_size(0, 0.5), "0 MB");
        assert_eq!(estimate_file_size(10, 0.5), "7.5 MB");
        assert_eq!(estimate_file_size(2000, 0.5), "1.5 GB");
    }

    #[test]
    fn test_input_framerate_is_exact() {
        assert_eq!(input_framerate(0.5), "1000000/500000");
        assert_eq!(input_framerate(1.0 / 1.5), "1000000/666667");
    }

    #[test]
    fn test_audio_filter_repeats_unit_per_frame() {
        let filter = audio_filter(0.5, 3);
        assert!(filter.starts_with("[1:a]aresample=48000,"));
        assert!(filter.contains("apad=whole_dur=0.500000"));
        assert!(filter.contains("atrim=end=0.500000"));
        assert!(filter.contains("aloop=loop=2:size=24000"));
        assert!(filter.ends_with("[aout]"));
    }

    #[test]
    fn test_args_without_audio_are_silent() {
        let job = AssemblyJob::new("/tmp/out.mp4", 0.5).with_fps(30);
        let args = build_ffmpeg_args(&job, Path::new("/scratch"), 4, None);

        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-filter_complex".to_string()));
        assert!(args.contains(&"/scratch/frame_%06d.png".to_string()));
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "2.000000");
        let r = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[r + 1], "30");
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_args_with_audio_map_filter_output() {
        let job = AssemblyJob::new("/tmp/out.mp4", 0.25);
        let args = build_ffmpeg_args(&job, Path::new("/scratch"), 8, Some(Path::new("/a/click.wav")));

        let inputs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
            .map(|(_, a)| a)
            .collect();
        assert_eq!(inputs, ["/scratch/frame_%06d.png", "/a/click.wav"]);
        assert!(args.contains(&"[aout]".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_missing_audio_degrades_to_silent() {
        assert!(usable_audio(Some(Path::new("/definitely/not/here.wav"))).is_none());
        assert!(usable_audio(None).is_none());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let job = AssemblyJob::new("/tmp/out.mp4", 0.5);
        assert!(validate(&FrameSequence::new(), &job).is_err());
        assert!(validate(&frames(2, 4, 4), &AssemblyJob::new("/tmp/out.mp4", 0.0)).is_err());

        let mut mixed = frames(2, 4, 4);
        mixed.push(Frame::new(RgbImage::new(8, 4)));
        let err = validate(&mixed, &job).unwrap_err();
        assert!(err.to_string().contains("Frame 2"));

        assert!(validate(&frames(3, 4, 4), &job).is_ok());
    }

    #[test]
    fn test_empty_sequence_reports_false() {
        let mut assembler = FfmpegAssembler::with_binary("paperanim-no-such-ffmpeg");
        let job = AssemblyJob::new(std::env::temp_dir().join("never.mp4"), 0.5);
        assert!(!assembler.assemble(&FrameSequence::new(), &job, None));
    }

    #[test]
    fn test_missing_binary_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = FfmpegAssembler::with_binary("paperanim-no-such-ffmpeg");
        assert!(!assembler.is_available());
        let job = AssemblyJob::new(dir.path().join("out.mp4"), 0.5);
        assert!(!assembler.assemble(&frames(2, 4, 4), &job, None));
    }

    #[tokio::test]
    async fn test_assemble_video_unavailable_assembler() {
        let job = AssemblyJob::new(std::env::temp_dir().join("never.mp4"), 0.5);
        let ok = assemble_video(
            FfmpegAssembler::with_binary("paperanim-no-such-ffmpeg"),
            frames(1, 2, 2),
            job,
            None,
        )
        .await;
        assert!(!ok);
    }

    #[test]
    fn test_write_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(&frames(3, 2, 2), dir.path()).unwrap();
        for i in 0..3u8 {
            let img = image::open(dir.path().join(format!("frame_{i:06}.png")))
                .unwrap()
                .to_rgb8();
            assert_eq!(img.get_pixel(0, 0)[0], i);
        }
    }

    #[test]
    fn test_progress_report() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "1000000");
        let report = progress_report(&state, 4, 2.0, 3.0);
        assert!((report.progress - 0.5).abs() < 1e-9);
        assert_eq!(report.frames_encoded, 2);
        assert!((report.eta_secs - 3.0).abs() < 1e-9);
        assert_eq!(report.stage, AssemblyStage::Encoding);

        state.update("progress", "end");
        assert!((progress_report(&state, 4, 2.0, 3.0).progress - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_duration() {
        assert!((parse_duration("0.250000\n") - 0.25).abs() < 1e-12);
        assert_eq!(parse_duration("N/A\n"), 0.0);
        assert_eq!(parse_duration(""), 0.0);
        assert_eq!(probe_audio_duration(Path::new("/definitely/not/here.wav")), 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exists_with_spaced_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::Builder::new().prefix("ffmpeg bin ").tempdir().unwrap();
        let binary = dir.path().join("ffmpeg");
        std::fs::write(&binary, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        let binary = binary.to_str().unwrap();
        assert!(binary.contains(' '));
        assert!(command_exists(binary));
        assert!(FfmpegAssembler::with_binary(binary).is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exists_rejects_non_executable_path() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("ffmpeg");
        std::fs::write(&plain, "not a program").unwrap();
        assert!(!command_exists(plain.to_str().unwrap()));
        assert!(!command_exists(dir.path().to_str().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exists_does_not_run_shell_syntax() {
        assert!(!command_exists("paperanim-no-such-ffmpeg; true"));
        assert!(!command_exists("$(true)paperanim-no-such-ffmpeg"));
        assert!(!command_exists(""));
        assert!(command_exists("sh"));
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(stderr_tail("only", 5), "only");
    }
}
