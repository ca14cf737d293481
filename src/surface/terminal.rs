use crate::api::DownloadForm;
use crate::surface::{ControlSurface, ProgressUpdate};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};

const QUIT: &str = "quit";

/// Renders session events on the terminal; the progress bar stays below the log lines.
pub struct TerminalSurface {
    bar: Option<ProgressBar>,
    cancel_enabled: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            bar: None,
            cancel_enabled: false,
        }
    }

    fn new_bar() -> ProgressBar {
        let style = ProgressStyle::with_template("[{bar:30.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        ProgressBar::new(0).with_style(style)
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSurface for TerminalSurface {
    fn on_log(&mut self, message: &str) {
        match &self.bar {
            Some(bar) => bar.println(message),
            None => println!("{}", message),
        }
    }

    fn on_progress(&mut self, progress: Option<&ProgressUpdate>) {
        match progress {
            Some(update) => {
                let bar = self.bar.get_or_insert_with(Self::new_bar);
                bar.set_length(update.total as u64);
                bar.set_position(update.current as u64);
                bar.set_message(format!(
                    "Downloading {}/{}... {}",
                    update.current, update.total, update.label
                ));
            }
            None => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn on_controls_changed(&mut self, _download_enabled: bool, cancel_enabled: bool) {
        let newly_cancellable = cancel_enabled && !self.cancel_enabled;
        self.cancel_enabled = cancel_enabled;
        if newly_cancellable {
            self.on_log("Press Ctrl+C to cancel.");
        }
    }
}

/// Asks for the form fields on the terminal. `None` when the user quits.
pub fn prompt_form(defaults: &DownloadForm) -> io::Result<Option<DownloadForm>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    read_form(&mut input, &mut output, defaults, |prompt| {
        rpassword::prompt_password(prompt)
    })
}

/// Reads one form; an empty answer keeps the default shown in brackets.
pub fn read_form<R, W, S>(
    input: &mut R,
    output: &mut W,
    defaults: &DownloadForm,
    read_secret: S,
) -> io::Result<Option<DownloadForm>>
where
    R: BufRead,
    W: Write,
    S: FnOnce(&str) -> io::Result<String>,
{
    writeln!(output)?;
    let Some(client_id) = ask(input, output, "Client ID", &defaults.client_id)? else {
        return Ok(None);
    };

    let secret_prompt = if defaults.client_secret.is_empty() {
        "Client Secret: "
    } else {
        "Client Secret [saved]: "
    };
    let secret = read_secret(secret_prompt)?;
    let client_secret = if secret.trim().is_empty() {
        defaults.client_secret.clone()
    } else {
        secret
    };

    let playlist_prompt = format!("Playlist URL ('{}' to exit)", QUIT);
    let Some(playlist_url) = ask(input, output, &playlist_prompt, &defaults.playlist_url)? else {
        return Ok(None);
    };
    if playlist_url == QUIT {
        return Ok(None);
    }

    let Some(download_dir) = ask(input, output, "Download directory", &defaults.download_dir)? else {
        return Ok(None);
    };

    Ok(Some(DownloadForm {
        client_id,
        client_secret,
        playlist_url,
        download_dir,
    }))
}

/// `None` on end of input.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: &str,
) -> io::Result<Option<String>> {
    if default.is_empty() {
        write!(output, "{}: ", label)?;
    } else {
        write!(output, "{} [{}]: ", label, default)?;
    }
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let answer = line.trim();
    Ok(Some(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn defaults() -> DownloadForm {
        DownloadForm {
            client_id: "saved-id".to_string(),
            client_secret: "saved-secret".to_string(),
            playlist_url: String::new(),
            download_dir: "downloaded_music".to_string(),
        }
    }

    #[test]
    fn test_empty_answers_keep_defaults() {
        let mut input = Cursor::new("\nhttps://open.spotify.com/playlist/abc\n\n");
        let mut output = Vec::new();

        let form = read_form(&mut input, &mut output, &defaults(), |_| Ok(String::new()))
            .unwrap()
            .unwrap();

        assert_eq!(form.client_id, "saved-id");
        assert_eq!(form.client_secret, "saved-secret");
        assert_eq!(form.playlist_url, "https://open.spotify.com/playlist/abc");
        assert_eq!(form.download_dir, "downloaded_music");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Client ID [saved-id]: "));
        assert!(shown.contains("Download directory [downloaded_music]: "));
    }

    #[test]
    fn test_answers_replace_defaults() {
        let mut input = Cursor::new("new-id\nhttps://open.spotify.com/playlist/xyz\n/tmp/music\n");
        let mut output = Vec::new();

        let form = read_form(&mut input, &mut output, &defaults(), |prompt| {
            assert_eq!(prompt, "Client Secret [saved]: ");
            Ok("new-secret".to_string())
        })
        .unwrap()
        .unwrap();

        assert_eq!(form.client_id, "new-id");
        assert_eq!(form.client_secret, "new-secret");
        assert_eq!(form.download_dir, "/tmp/music");
    }

    #[test]
    fn test_blank_url_is_passed_through() {
        let mut input = Cursor::new("\n\n\n");
        let mut output = Vec::new();

        let form = read_form(&mut input, &mut output, &defaults(), |_| Ok(String::new()))
            .unwrap()
            .unwrap();

        assert!(form.playlist_url.is_empty());
    }

    #[test]
    fn test_quit_and_end_of_input_stop_the_form() {
        let mut output = Vec::new();

        let mut quit = Cursor::new("\nquit\n");
        assert!(read_form(&mut quit, &mut output, &defaults(), |_| Ok(String::new()))
            .unwrap()
            .is_none());

        let mut eof = Cursor::new("");
        assert!(read_form(&mut eof, &mut output, &defaults(), |_| Ok(String::new()))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_surface_tracks_control_state() {
        let mut surface = TerminalSurface::new();
        assert!(!surface.cancel_enabled);

        surface.on_controls_changed(false, true);
        assert!(surface.cancel_enabled);

        surface.on_progress(Some(&ProgressUpdate {
            current: 1,
            total: 2,
            label: "Song A".to_string(),
        }));
        assert!(surface.bar.is_some());

        surface.on_progress(None);
        surface.on_controls_changed(true, false);
        assert!(surface.bar.is_none());
        assert!(!surface.cancel_enabled);
    }
}
