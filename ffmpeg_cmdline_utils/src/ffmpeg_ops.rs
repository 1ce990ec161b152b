use std::{
    ffi::{OsStr, OsString},
    io::prelude::*,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    time::{Duration, Instant},
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use image::GrayImage;
use wait_timeout::ChildExt;

use crate::FfmpegError::{self, *};

const DEFAULT_FFMPEG_EXECUTABLE: &str = "ffmpeg";
const VERSION_CHECK_TIMEOUT_SECS: u64 = 10;

/// Iterator over the grayscale frames that a running ffmpeg process writes to its stdout.
///
/// Iteration stops at the first incomplete frame (end of stream, decode failure, or a
/// read error) or when the timeout elapses. The ffmpeg process is killed and reaped
/// as soon as iteration stops, and again (if still required) when the iterator is dropped.
#[derive(Debug)]
pub struct FfmpegFrameIterGray {
    x: u32,
    y: u32,
    child: Child,
    frames_read: u32,
    timeout_time: Option<Instant>,
    finished: bool,
}

impl FfmpegFrameIterGray {
    /// Number of complete frames returned so far.
    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    fn timed_out(&self) -> bool {
        self.timeout_time.is_some_and(|t| Instant::now() > t)
    }

    fn finish(&mut self) {
        self.finished = true;
        let _kill_error = self.child.kill();
        let _wait_error = self.child.wait();
    }

    // Read exactly one frame's worth of bytes. Any shortfall yields None.
    fn read_frame(&mut self) -> Option<Vec<u8>> {
        let frame_len = usize::try_from(self.x)
            .ok()?
            .checked_mul(usize::try_from(self.y).ok()?)?;
        let mut raw_buf = vec![0u8; frame_len];

        let timeout_time = self.timeout_time;
        let stdout = self.child.stdout.as_mut()?;
        let mut buf_head = 0;
        while buf_head < raw_buf.len() {
            if timeout_time.is_some_and(|t| Instant::now() > t) {
                return None;
            }

            match stdout.read(&mut raw_buf[buf_head..]) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                //something went wrong, or no more data can be read
                Err(_) | Ok(0) => return None,
                Ok(bytes_read) => buf_head += bytes_read,
            }
        }

        Some(raw_buf)
    }
}

impl Iterator for FfmpegFrameIterGray {
    type Item = GrayImage;

    fn next(&mut self) -> Option<GrayImage> {
        if self.finished {
            return None;
        }

        if self.timed_out() {
            self.finish();
            return None;
        }

        match self.read_frame().and_then(|raw| GrayImage::from_raw(self.x, self.y, raw)) {
            Some(frame) => {
                self.frames_read += 1;
                Some(frame)
            }
            None => {
                self.finish();
                None
            }
        }
    }
}

// to prevent accumulation of zombie processes, reap the return code of
// ffmpeg subcommands (if nothing else has done so already) here
impl Drop for FfmpegFrameIterGray {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}

/// Configures and spawns an ffmpeg process which decodes a video into fixed-size
/// 8-bit grayscale frames.
#[derive(Clone, Debug)]
pub struct FfmpegFrameReaderBuilder {
    src_path: PathBuf,
    ffmpeg_path: PathBuf,
    fps: Option<String>,
    scale: Option<(u32, u32)>,
    multithreaded: bool,
    timeout_secs: Option<u64>,
}

impl FfmpegFrameReaderBuilder {
    pub fn new(src_path: impl AsRef<Path>) -> Self {
        Self {
            src_path: src_path.as_ref().to_path_buf(),
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_EXECUTABLE),
            fps: None,
            scale: None,
            multithreaded: false,
            timeout_secs: None,
        }
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    /// Path to (or name of) the ffmpeg executable. Defaults to `ffmpeg` on the PATH.
    pub fn ffmpeg_path(&mut self, ffmpeg_path: impl AsRef<Path>) -> &mut Self {
        self.ffmpeg_path = ffmpeg_path.as_ref().to_path_buf();
        self
    }

    /// Output frame rate, in any form accepted by ffmpeg's fps filter (e.g. "8" or "1/3")
    pub fn fps(&mut self, fps: impl AsRef<str>) -> &mut Self {
        self.fps = Some(fps.as_ref().to_string());
        self
    }

    /// Output frame size. Frames are stretched to exactly this size.
    pub fn scale(&mut self, x: u32, y: u32) -> &mut Self {
        self.scale = Some((x, y));
        self
    }

    pub fn multithreaded(&mut self, val: bool) -> &mut Self {
        self.multithreaded = val;
        self
    }

    pub fn timeout_secs(&mut self, timeout_secs: u64) -> &mut Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// The arguments that will be passed to ffmpeg.
    pub fn args(&self) -> Result<Vec<OsString>, FfmpegError> {
        let (x, y) = match self.scale {
            Some((x, y)) if x > 0 && y > 0 => (x, y),
            _ => return Err(InvalidResolution),
        };

        let filter = match &self.fps {
            Some(fps) => format!("fps={fps},scale={x}:{y}"),
            None => format!("scale={x}:{y}"),
        };

        #[rustfmt::skip]
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(), "warning".into(),
            "-nostats".into(),
            "-nostdin".into(),
        ];

        if !self.multithreaded {
            args.extend([OsString::from("-threads"), OsString::from("1")]);
        }

        #[rustfmt::skip]
        args.extend([
            OsString::from("-i"), self.src_path.clone().into_os_string(),
            "-vf".into(),      filter.into(),
            "-pix_fmt".into(), "gray".into(),
            "-c:v".into(),     "rawvideo".into(),
            "-f".into(),       "image2pipe".into(),
            "-".into(),
        ]);

        Ok(args)
    }

    pub fn spawn_gray(&self) -> Result<FfmpegFrameIterGray, FfmpegError> {
        let args = self.args()?;
        let (x, y) = self.scale.ok_or(InvalidResolution)?;

        let child = spawn_ffmpeg_command(self.ffmpeg_path.as_os_str(), &args, Stdio::piped())?;

        Ok(FfmpegFrameIterGray {
            x,
            y,
            child,
            frames_read: 0,
            timeout_time: self
                .timeout_secs
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
            finished: false,
        })
    }
}

/// Check that the given ffmpeg executable can be run, by asking it for its version.
pub fn check_ffmpeg_callable(ffmpeg_path: impl AsRef<OsStr>) -> Result<(), FfmpegError> {
    let mut child = spawn_ffmpeg_command(ffmpeg_path.as_ref(), &[OsString::from("-version")], Stdio::null())?;

    match child.wait_timeout(Duration::from_secs(VERSION_CHECK_TIMEOUT_SECS))? {
        Some(status) if status.success() => Ok(()),
        Some(status) => Err(FfmpegInternal(format!("ffmpeg -version exited with {status}"))),
        None => {
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            Err(FfmpegInternal("ffmpeg -version timed out".to_string()))
        }
    }
}

fn spawn_ffmpeg_command(program: &OsStr, args: &[OsString], stdout_cfg: Stdio) -> Result<Child, FfmpegError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout_cfg)
        //ffmpeg can be very chatty on stderr. Never let it fill up a pipe.
        .stderr(Stdio::null());

    //do not spawn a command window on windows when when in a gui application
    #[cfg(target_family = "windows")]
    command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

    log::trace!(
        "spawning {} {}",
        program.to_string_lossy(),
        args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
    );

    Ok(command.spawn()?)
}
