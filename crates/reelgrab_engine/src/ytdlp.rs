use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use reelgrab_core::Target;
use reelgrab_logging::{rg_debug, rg_info, rg_trace, rg_warn};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::{
    CallbackVerdict, EngineConfig, EngineError, FailureKind, FetchOutcome, MediaEngine,
    TransferObserver, TransferState,
};

pub const DEFAULT_PROGRAM: &str = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };

/// Marks the lines produced by our `--progress-template`.
const PROGRESS_MARKER: &str = "[reelgrab-progress]";
const STDERR_TAIL_LINES: usize = 20;

/// Drives the `yt-dlp` executable, one child process per target.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl YtDlpEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before ours, e.g. `-m yt_dlp` for a Python launcher.
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn build_args(target: &Target, config: &EngineConfig) -> Vec<String> {
        let mut args: Vec<String> =
            ["--newline", "--no-colors", "--yes-playlist", "--ignore-errors"]
                .iter()
                .map(|flag| flag.to_string())
                .collect();
        args.extend([
            "--progress-template".to_string(),
            format!("download:{PROGRESS_MARKER} %(progress)j"),
        ]);
        args.extend(["-o".to_string(), config.output_template.clone()]);
        args.extend(["-f".to_string(), config.format.to_string()]);
        args.extend(["--retries".to_string(), config.retries.to_string()]);
        args.extend([
            "--concurrent-fragments".to_string(),
            config.concurrent_fragments.to_string(),
        ]);
        args.extend(["--remux-video".to_string(), config.remux_container.clone()]);
        if let Some(path) = &config.credential_file {
            args.extend(["--cookies".to_string(), path.to_string_lossy().into_owned()]);
        }
        if let Some(path) = &config.archive_path {
            args.extend([
                "--download-archive".to_string(),
                path.to_string_lossy().into_owned(),
            ]);
        }
        if let Some(limit) = config.ceiling_for(target) {
            args.extend(["--playlist-end".to_string(), limit.to_string()]);
        }
        // References starting with '-' must not be read as options.
        args.push("--".to_string());
        args.push(target.reference().to_string());
        args
    }
}

#[async_trait::async_trait]
impl MediaEngine for YtDlpEngine {
    async fn fetch(
        &self,
        target: &Target,
        config: &EngineConfig,
        observer: &dyn TransferObserver,
    ) -> Result<FetchOutcome, EngineError> {
        let args = Self::build_args(target, config);
        rg_debug!(
            "spawning {} for {} ({} args)",
            self.program.display(),
            target,
            args.len()
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl-C must reach only us, so the
        // child is stopped through the observer and never dies mid-item.
        #[cfg(unix)]
        command.process_group(0);
        let mut child = command.spawn().map_err(|err| {
            EngineError::new(
                FailureKind::Spawn,
                format!("failed to run {}: {err}", self.program.display()),
            )
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::new(FailureKind::Io, "engine stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::new(FailureKind::Io, "engine stderr not captured"))?;
        let stderr_tail = tokio::spawn(collect_tail(stderr, STDERR_TAIL_LINES));

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut stop_requested = false;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|err| EngineError::new(FailureKind::Io, err.to_string()))?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            rg_trace!("yt-dlp: {}", line.trim_end());
            let Some(state) = parse_progress_line(&line) else {
                continue;
            };
            if observer.on_transfer(state) == CallbackVerdict::Stop {
                stop_requested = true;
                break;
            }
        }

        if stop_requested {
            rg_info!("stopping engine for {} at callback tick", target);
            if let Err(err) = child.kill().await {
                rg_warn!("failed to stop engine process: {}", err);
            }
            stderr_tail.abort();
            return Ok(FetchOutcome::Stopped);
        }

        let status = child
            .wait()
            .await
            .map_err(|err| EngineError::new(FailureKind::Io, err.to_string()))?;
        let tail = stderr_tail.await.unwrap_or_default();
        if status.success() {
            Ok(FetchOutcome::Completed)
        } else {
            rg_debug!("engine exited with {:?} for {}", status.code(), target);
            Err(classify_failure(status.code(), &tail))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemplateProgress {
    status: String,
    downloaded_bytes: Option<f64>,
    total_bytes: Option<f64>,
    total_bytes_estimate: Option<f64>,
    eta: Option<f64>,
    #[serde(rename = "_speed_str")]
    speed_str: Option<String>,
    #[serde(rename = "_percent_str")]
    percent_str: Option<String>,
}

/// Translate one line of engine stdout into a transfer state, if it is one.
pub(crate) fn parse_progress_line(line: &str) -> Option<TransferState> {
    let line = line.trim();
    if let Some(json) = line.strip_prefix(PROGRESS_MARKER) {
        return parse_template_progress(json.trim());
    }
    if is_post_processing_line(line) {
        return Some(TransferState::PostProcessing);
    }
    parse_plain_progress(line)
}

fn parse_template_progress(json: &str) -> Option<TransferState> {
    let raw: TemplateProgress = serde_json::from_str(json).ok()?;
    match raw.status.as_str() {
        "downloading" => {
            let total = raw.total_bytes.or(raw.total_bytes_estimate);
            let percent = match (raw.downloaded_bytes, total) {
                (Some(done), Some(total)) if total > 0.0 => Some(done / total * 100.0),
                _ => raw.percent_str.as_deref().and_then(parse_percent),
            };
            Some(TransferState::Downloading {
                percent,
                speed: raw.speed_str.as_deref().and_then(clean_speed),
                eta_secs: raw.eta.filter(|eta| *eta >= 0.0).map(|eta| eta.round() as u64),
            })
        }
        "finished" => Some(TransferState::PostProcessing),
        _ => None,
    }
}

/// `[download]  42.0% of ~ 10.00MiB at  1.23MiB/s ETA 00:08`
fn parse_plain_progress(line: &str) -> Option<TransferState> {
    static RE_PROGRESS: OnceLock<Regex> = OnceLock::new();
    // Constant pattern; compiled by every plain-line parser test.
    let re = RE_PROGRESS.get_or_init(|| {
        Regex::new(
            r"^\[download\]\s+(?P<percent>\d+(?:\.\d+)?)%(?:.*?\bat\s+(?P<speed>\S+))?(?:.*?\bETA\s+(?P<eta>\S+))?",
        )
        .expect("progress regex")
    });

    let caps = re.captures(line)?;
    let percent = caps.name("percent").and_then(|m| m.as_str().parse().ok());
    let speed = caps.name("speed").and_then(|m| clean_speed(m.as_str()));
    let eta_secs = caps.name("eta").and_then(|m| parse_clock(m.as_str()));
    Some(TransferState::Downloading {
        percent,
        speed,
        eta_secs,
    })
}

fn is_post_processing_line(line: &str) -> bool {
    const MARKERS: [&str; 5] = [
        "[Merger]",
        "[VideoRemuxer]",
        "[VideoConvertor]",
        "[ExtractAudio]",
        "[Fixup",
    ];
    MARKERS.iter().any(|marker| line.starts_with(marker))
}

fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').trim().parse().ok()
}

fn clean_speed(raw: &str) -> Option<String> {
    let speed = raw.trim();
    if speed.is_empty() || speed.contains("Unknown") || speed == "N/A" || speed == "NA" {
        return None;
    }
    Some(speed.to_string())
}

/// `SS`, `MM:SS` or `HH:MM:SS` to seconds.
fn parse_clock(raw: &str) -> Option<u64> {
    raw.split(':')
        .try_fold(0u64, |acc, part| part.parse::<u64>().ok().map(|v| acc * 60 + v))
}

async fn collect_tail<R: AsyncRead + Unpin>(stream: R, keep: usize) -> Vec<String> {
    let mut tail = VecDeque::with_capacity(keep);
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                if tail.len() == keep {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
    }
    tail.into()
}

fn classify_failure(code: Option<i32>, stderr_tail: &[String]) -> EngineError {
    let message = stderr_tail
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| stderr_tail.last())
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "no diagnostic output".to_string());

    let lower = message.to_ascii_lowercase();
    let kind = if ["private", "login", "log in", "cookies", "403"]
        .iter()
        .any(|hint| lower.contains(hint))
    {
        FailureKind::Permission
    } else if [
        "unable to extract",
        "unsupported url",
        "no video formats",
        "requested format is not available",
    ]
    .iter()
    .any(|hint| lower.contains(hint))
    {
        FailureKind::Extraction
    } else if [
        "timed out",
        "connection",
        "unable to download",
        "http error",
        "network",
    ]
    .iter()
    .any(|hint| lower.contains(hint))
    {
        FailureKind::Network
    } else {
        FailureKind::ExitStatus(code)
    };
    EngineError::new(kind, message)
}
