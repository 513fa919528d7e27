//! Video assembly with ffmpeg.
//!
//! Each caption becomes one segment: its still image, its voiceover, and the
//! caption burned in at the bottom. Segments are then joined with the concat
//! demuxer.

use crate::error::{ReelcrewError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// One image + voiceover + caption triple.
#[derive(Debug, Clone)]
pub(super) struct Segment {
    pub image: PathBuf,
    pub voiceover: PathBuf,
    pub caption: String,
}

/// Build the `-vf` filter for a segment.
///
/// The caption must already be sanitized; drawtext treats quotes, colons and
/// backslashes specially.
pub(super) fn caption_filter(caption: &str, font_size: u32) -> String {
    format!(
        "scale=1080:1080:force_original_aspect_ratio=decrease,\
         pad=1080:1080:(ow-iw)/2:(oh-ih)/2,\
         drawtext=text='{}':fontcolor=white:fontsize={}:box=1:boxcolor=black@0.5:boxborderw=16:\
         x=(w-text_w)/2:y=h-text_h-96",
        caption, font_size
    )
}

/// Concat demuxer list for the given segment files.
///
/// The demuxer resolves entries against the list file's directory, and the
/// list is written next to the segments, so only file names are listed.
pub(super) fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string());
            format!("file '{}'\n", name.replace('\'', "'\\''"))
        })
        .collect()
}

/// Render all segments and join them into `dest`.
///
/// Intermediate segment files are removed whether or not the join succeeds.
#[instrument(skip(ffmpeg, segments), fields(count = segments.len(), dest = %dest.display()))]
pub(super) async fn assemble(
    ffmpeg: &str,
    segments: &[Segment],
    font_size: u32,
    work_dir: &Path,
    dest: &Path,
) -> Result<PathBuf> {
    if segments.is_empty() {
        return Err(ReelcrewError::Video("No segments to assemble".to_string()));
    }

    let mut rendered = Vec::with_capacity(segments.len());
    let result = render_and_join(ffmpeg, segments, font_size, work_dir, dest, &mut rendered).await;
    remove_segments(&rendered);
    result?;

    info!("Assembled {} segments", segments.len());
    Ok(dest.to_path_buf())
}

async fn render_and_join(
    ffmpeg: &str,
    segments: &[Segment],
    font_size: u32,
    work_dir: &Path,
    dest: &Path,
    rendered: &mut Vec<PathBuf>,
) -> Result<()> {
    for (idx, segment) in segments.iter().enumerate() {
        let out = work_dir.join(format!("segment_{}.mp4", idx + 1));
        // Tracked before rendering so a partial file is cleaned up too.
        rendered.push(out.clone());
        render_segment(ffmpeg, segment, font_size, &out).await?;
        debug!("Rendered segment {}", idx + 1);
    }

    let mut list = tempfile::Builder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile_in(work_dir)?;
    list.write_all(concat_list(rendered).as_bytes())?;
    list.flush()?;

    let mut concat = Command::new(ffmpeg);
    concat
        .arg("-f").arg("concat")
        .arg("-safe").arg("0")
        .arg("-i").arg(list.path())
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest);
    run_ffmpeg(ffmpeg, concat).await
}

/// Delete intermediate segments. Files that were never written are skipped.
fn remove_segments(segments: &[PathBuf]) {
    for segment in segments {
        match std::fs::remove_file(segment) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", segment.display(), e),
        }
    }
}

async fn render_segment(ffmpeg: &str, segment: &Segment, font_size: u32, dest: &Path) -> Result<()> {
    for input in [&segment.image, &segment.voiceover] {
        if !input.exists() {
            return Err(ReelcrewError::Video(format!(
                "Missing input file: {}",
                input.display()
            )));
        }
    }

    let mut render = Command::new(ffmpeg);
    render
        .arg("-loop").arg("1")
        .arg("-i").arg(&segment.image)
        .arg("-i").arg(&segment.voiceover)
        .arg("-vf").arg(caption_filter(&segment.caption, font_size))
        .arg("-c:v").arg("libx264")
        .arg("-tune").arg("stillimage")
        .arg("-pix_fmt").arg("yuv420p")
        .arg("-c:a").arg("aac")
        .arg("-b:a").arg("192k")
        .arg("-shortest")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest);
    run_ffmpeg(ffmpeg, render).await
}

async fn run_ffmpeg(ffmpeg: &str, mut command: Command) -> Result<()> {
    let result = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(ReelcrewError::Video(format!("ffmpeg failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReelcrewError::ToolNotFound(ffmpeg.to_string()))
        }
        Err(e) => Err(ReelcrewError::Video(format!("ffmpeg error: {}", e))),
    }
}
