use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use reelgrab_core::{Msg, QualitySelection};
use reelgrab_engine::{YtDlpEngine, DEFAULT_PROGRAM};
use reelgrab_logging::LogDestination;

/// Batch-download a creator's videos and/or individual video URLs.
#[derive(Debug, Parser)]
#[command(name = "reelgrab", version)]
pub struct Cli {
    /// Profile or collection reference, e.g. `@someone` or a profile URL.
    #[arg(long, value_name = "REF")]
    pub profile: Option<String>,

    /// Single video URL; may be repeated.
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one video URL per line (`-` reads stdin).
    #[arg(long, value_name = "PATH")]
    pub urls_file: Option<PathBuf>,

    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// best, 1080p, 720p or mp4.
    #[arg(long, default_value = "best")]
    pub quality: QualitySelection,

    /// Newest N videos per profile; 0 means all.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub max_items: u32,

    /// Do not read or append the download archive.
    #[arg(long)]
    pub no_archive: bool,

    /// Archive file; defaults to `<out>/downloaded_archive.txt`.
    #[arg(long, value_name = "PATH", conflicts_with = "no_archive")]
    pub archive: Option<PathBuf>,

    /// Netscape cookie file for private or age-gated videos.
    #[arg(long, value_name = "PATH")]
    pub cookies: Option<PathBuf>,

    /// yt-dlp command; extra words are passed before our arguments.
    #[arg(
        long = "yt-dlp",
        env = "REELGRAB_YTDLP",
        value_name = "CMD",
        default_value = DEFAULT_PROGRAM
    )]
    pub yt_dlp: String,

    #[arg(long, value_enum, default_value_t = LogArg::Terminal)]
    pub log: LogArg,

    /// More operational logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    Terminal,
    File,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::File => LogDestination::File,
            LogArg::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    pub fn level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// `--url` values followed by the lines of `--urls-file`.
    pub fn read_items(&self) -> anyhow::Result<String> {
        let mut text = self.urls.join("\n");
        let Some(path) = &self.urls_file else {
            return Ok(text);
        };
        let file_text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading URLs from stdin")?;
            buf
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("reading URL file {}", path.display()))?
        };
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&file_text);
        Ok(text)
    }

    /// The form edits a user would have made before pressing Start.
    pub fn form_messages(&self, items_text: String) -> Vec<Msg> {
        let mut msgs = vec![
            Msg::CollectionRefChanged(self.profile.clone().unwrap_or_default()),
            Msg::ItemsChanged(items_text),
            Msg::OutputDirChanged(self.out.to_string_lossy().into_owned()),
            Msg::QualityChanged(self.quality),
            Msg::MaxItemsChanged(self.max_items),
            Msg::ArchiveToggled(!self.no_archive),
        ];
        if let Some(path) = &self.archive {
            msgs.push(Msg::ArchivePathChanged(path.to_string_lossy().into_owned()));
        }
        if let Some(path) = &self.cookies {
            msgs.push(Msg::CredentialFileChanged(path.to_string_lossy().into_owned()));
        }
        msgs
    }

    pub fn engine(&self) -> anyhow::Result<YtDlpEngine> {
        let mut words = self.yt_dlp.split_whitespace();
        let Some(program) = words.next() else {
            bail!("--yt-dlp must name a program");
        };
        Ok(YtDlpEngine::new(program).with_leading_args(words.map(str::to_string).collect()))
    }
}
