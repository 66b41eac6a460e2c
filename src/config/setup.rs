//! First-run screen setup
//!
//! Works out which resolution to build the probe geometry for. The first
//! time around the primary monitor is detected and the user confirms or
//! corrects it; the answer is stored in the settings file.

use std::io::{BufRead, Write};

use super::{ConfigError, Settings};
use crate::vision::{Resolution, SampleError};

/// Where the resolution in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    CommandLine,
    Environment,
    SettingsFile,
    Detected,
    Entered,
}

impl ResolutionOrigin {
    /// The settings file should be updated with this resolution
    pub fn should_persist(&self) -> bool {
        matches!(
            self,
            ResolutionOrigin::CommandLine | ResolutionOrigin::Detected | ResolutionOrigin::Entered
        )
    }
}

/// Resolution overrides supplied outside the settings file
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionSources {
    pub command_line: Option<Resolution>,
    pub environment: Option<Resolution>,
    /// Ignore stored values and detect again
    pub reconfigure: bool,
}

/// Read `WIDTH`/`HEIGHT` style values; empty or missing values mean "unset"
pub fn parse_resolution_pair(
    width: Option<&str>,
    height: Option<&str>,
) -> Result<Option<Resolution>, ConfigError> {
    let (Some(width), Some(height)) = (width, height) else {
        return Ok(None);
    };
    let (width, height) = (width.trim(), height.trim());
    if width.is_empty() || height.is_empty() {
        return Ok(None);
    }
    let parse = |value: &str| {
        value
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidResolution(format!("{width}x{height}")))
    };
    let resolution = Resolution::new(parse(width)?, parse(height)?);
    if !resolution.is_valid() {
        return Err(ConfigError::InvalidResolution(resolution.to_string()));
    }
    Ok(Some(resolution))
}

/// Resolution from the `WIDTH` and `HEIGHT` environment variables
pub fn environment_resolution() -> Result<Option<Resolution>, ConfigError> {
    let width = std::env::var("WIDTH").ok();
    let height = std::env::var("HEIGHT").ok();
    parse_resolution_pair(width.as_deref(), height.as_deref())
}

/// Interactive resolution setup over arbitrary input/output streams
pub struct ScreenSetup<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ScreenSetup<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Pick the resolution to run with and record it in `settings`
    pub fn resolve<D>(
        &mut self,
        settings: &mut Settings,
        sources: ResolutionSources,
        detect: D,
    ) -> Result<(Resolution, ResolutionOrigin), ConfigError>
    where
        D: FnOnce() -> Result<Resolution, SampleError>,
    {
        let (resolution, origin) = if let Some(resolution) = sources.command_line {
            (resolution, ResolutionOrigin::CommandLine)
        } else if let (Some(resolution), false) = (sources.environment, sources.reconfigure) {
            (resolution, ResolutionOrigin::Environment)
        } else if let (Some(resolution), false) = (settings.resolution, sources.reconfigure) {
            (resolution, ResolutionOrigin::SettingsFile)
        } else {
            let detected = detect().map_err(|e| ConfigError::Detection(e.to_string()))?;
            self.confirm(detected)?
        };

        if !resolution.is_valid() {
            return Err(ConfigError::InvalidResolution(resolution.to_string()));
        }
        log::info!("Using resolution {} ({:?})", resolution, origin);
        settings.resolution = Some(resolution);
        Ok((resolution, origin))
    }

    fn confirm(
        &mut self,
        detected: Resolution,
    ) -> Result<(Resolution, ResolutionOrigin), ConfigError> {
        self.say(&format!("Detected resolution: {detected}\nIs the resolution correct? (y/n)\n"))?;
        let answer = self.read_line()?;
        if !answer.to_lowercase().starts_with('n') {
            return Ok((detected, ResolutionOrigin::Detected));
        }

        self.say("Enter width: ")?;
        let width = self.read_line()?;
        self.say("Enter height: ")?;
        let height = self.read_line()?;
        let resolution = parse_resolution_pair(Some(&width), Some(&height))?
            .ok_or_else(|| ConfigError::InvalidResolution(format!("{width}x{height}")))?;
        self.say(&format!("\nNew resolution: {resolution}\n\n"))?;
        Ok((resolution, ResolutionOrigin::Entered))
    }

    fn say(&mut self, text: &str) -> Result<(), ConfigError> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(|e| ConfigError::Prompt(e.to_string()))
    }

    fn read_line(&mut self) -> Result<String, ConfigError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| ConfigError::Prompt(e.to_string()))?;
        if read == 0 {
            return Err(ConfigError::Prompt("input closed".into()));
        }
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn setup(input: &str) -> ScreenSetup<Cursor<Vec<u8>>, Vec<u8>> {
        ScreenSetup::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn detect_hd() -> Result<Resolution, SampleError> {
        Ok(Resolution::new(1920, 1080))
    }

    fn no_detection() -> Result<Resolution, SampleError> {
        panic!("detection should not run")
    }

    #[test]
    fn test_command_line_wins() {
        let mut settings = Settings {
            resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        let sources = ResolutionSources {
            command_line: Some(Resolution::new(2560, 1080)),
            environment: Some(Resolution::new(3840, 2160)),
            reconfigure: false,
        };

        let (resolution, origin) = setup("")
            .resolve(&mut settings, sources, no_detection)
            .unwrap();
        assert_eq!(resolution, Resolution::new(2560, 1080));
        assert_eq!(origin, ResolutionOrigin::CommandLine);
        assert!(origin.should_persist());
        assert_eq!(settings.resolution, Some(resolution));
    }

    #[test]
    fn test_environment_then_settings_file() {
        let mut settings = Settings {
            resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        let sources = ResolutionSources {
            environment: Some(Resolution::new(3440, 1440)),
            ..Default::default()
        };
        let (_, origin) = setup("")
            .resolve(&mut settings, sources, no_detection)
            .unwrap();
        assert_eq!(origin, ResolutionOrigin::Environment);
        assert!(!origin.should_persist());

        let mut settings = Settings {
            resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        let (resolution, origin) = setup("")
            .resolve(&mut settings, ResolutionSources::default(), no_detection)
            .unwrap();
        assert_eq!(resolution, Resolution::new(1280, 720));
        assert_eq!(origin, ResolutionOrigin::SettingsFile);
    }

    #[test]
    fn test_detected_resolution_confirmed() {
        let mut settings = Settings::default();
        let mut setup = setup("y\n");
        let (resolution, origin) = setup
            .resolve(&mut settings, ResolutionSources::default(), detect_hd)
            .unwrap();

        assert_eq!(resolution, Resolution::new(1920, 1080));
        assert_eq!(origin, ResolutionOrigin::Detected);
        let prompt = String::from_utf8(setup.output.clone()).unwrap();
        assert!(prompt.contains("Detected resolution: 1920x1080"));
    }

    #[test]
    fn test_detected_resolution_corrected() {
        let mut settings = Settings::default();
        let (resolution, origin) = setup("No\n3440\n1440\n")
            .resolve(&mut settings, ResolutionSources::default(), detect_hd)
            .unwrap();
        assert_eq!(resolution, Resolution::new(3440, 1440));
        assert_eq!(origin, ResolutionOrigin::Entered);
    }

    #[test]
    fn test_reconfigure_ignores_stored_resolution() {
        let mut settings = Settings {
            resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        let sources = ResolutionSources {
            reconfigure: true,
            ..Default::default()
        };
        let (resolution, _) = setup("y\n")
            .resolve(&mut settings, sources, detect_hd)
            .unwrap();
        assert_eq!(resolution, Resolution::new(1920, 1080));
    }

    #[test]
    fn test_bad_input_is_fatal() {
        let mut settings = Settings::default();
        let result = setup("n\nwide\n1080\n").resolve(
            &mut settings,
            ResolutionSources::default(),
            detect_hd,
        );
        assert!(matches!(result, Err(ConfigError::InvalidResolution(_))));

        let result = setup("").resolve(&mut settings, ResolutionSources::default(), detect_hd);
        assert!(matches!(result, Err(ConfigError::Prompt(_))));

        let result = setup("y\n").resolve(&mut settings, ResolutionSources::default(), || {
            Err(SampleError::CaptureUnavailable("no display".into()))
        });
        assert!(matches!(result, Err(ConfigError::Detection(_))));
    }

    #[test]
    fn test_parse_resolution_pair() {
        assert_eq!(
            parse_resolution_pair(Some("2560"), Some(" 1440 ")).unwrap(),
            Some(Resolution::new(2560, 1440))
        );
        assert_eq!(parse_resolution_pair(Some(""), Some("1080")).unwrap(), None);
        assert_eq!(parse_resolution_pair(None, Some("1080")).unwrap(), None);
        assert!(parse_resolution_pair(Some("0"), Some("1080")).is_err());
        assert!(parse_resolution_pair(Some("-5"), Some("1080")).is_err());
    }
}
