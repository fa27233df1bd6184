//! Commands accepted by the engine loop, plus the line protocol the CLI
//! feeds it.

use std::path::PathBuf;

use crate::error::ChartError;

/// A control intent sent from an issuing context to the engine loop.
///
/// Constructed values are valid by type; "wrong parameter" failures only
/// exist at the text-protocol boundary ([`ChartCommand::parse`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ChartCommand {
    Load(PathBuf),
    Play,
    ZoomIn,
    ZoomOut,
    PageForward,
    PageBackward,
    SetCutoff(f32),
    Quit,
}

impl ChartCommand {
    /// Parse one line of the interactive command protocol.
    ///
    /// Verbs: `load <path>`, `play`, `in`/`+`, `out`/`-`, `next`/`]`,
    /// `prev`/`[`, `cutoff <db>`, `quit`/`q`. A bad line fails only that
    /// command; the caller reports and moves on.
    pub fn parse(line: &str) -> Result<ChartCommand, ChartError> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((v, a)) => (v, Some(a.trim())),
            None => (line, None),
        };

        match (verb, arg) {
            ("load", Some(path)) if !path.is_empty() => {
                Ok(ChartCommand::Load(PathBuf::from(path)))
            }
            ("load", _) => Err(ChartError::malformed(line, "expected a file path")),
            ("play", None) => Ok(ChartCommand::Play),
            ("in" | "+", None) => Ok(ChartCommand::ZoomIn),
            ("out" | "-", None) => Ok(ChartCommand::ZoomOut),
            ("next" | "]", None) => Ok(ChartCommand::PageForward),
            ("prev" | "[", None) => Ok(ChartCommand::PageBackward),
            ("cutoff", Some(db)) => db
                .parse::<f32>()
                .map(ChartCommand::SetCutoff)
                .map_err(|_| ChartError::malformed(line, "expected a dB value")),
            ("cutoff", None) => Err(ChartError::malformed(line, "expected a dB value")),
            ("quit" | "q", None) => Ok(ChartCommand::Quit),
            ("", None) => Err(ChartError::malformed(line, "empty command")),
            _ => Err(ChartError::malformed(line, "unknown command")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_verb() {
        assert_eq!(
            ChartCommand::parse("load a b.mp3").unwrap(),
            ChartCommand::Load(PathBuf::from("a b.mp3"))
        );
        assert_eq!(ChartCommand::parse("play").unwrap(), ChartCommand::Play);
        assert_eq!(ChartCommand::parse("in").unwrap(), ChartCommand::ZoomIn);
        assert_eq!(ChartCommand::parse("+").unwrap(), ChartCommand::ZoomIn);
        assert_eq!(ChartCommand::parse("out").unwrap(), ChartCommand::ZoomOut);
        assert_eq!(ChartCommand::parse("-").unwrap(), ChartCommand::ZoomOut);
        assert_eq!(ChartCommand::parse("next").unwrap(), ChartCommand::PageForward);
        assert_eq!(ChartCommand::parse("prev").unwrap(), ChartCommand::PageBackward);
        assert_eq!(
            ChartCommand::parse("cutoff -6.5").unwrap(),
            ChartCommand::SetCutoff(-6.5)
        );
        assert_eq!(ChartCommand::parse("q").unwrap(), ChartCommand::Quit);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(ChartCommand::parse("  play  ").unwrap(), ChartCommand::Play);
    }

    #[test]
    fn test_malformed_payloads() {
        for line in ["cutoff", "cutoff loud", "load", "warble", "", "play now"] {
            let err = ChartCommand::parse(line).unwrap_err();
            assert!(
                matches!(err, ChartError::MalformedCommand { .. }),
                "line {:?} gave {:?}",
                line,
                err
            );
        }
    }
}
