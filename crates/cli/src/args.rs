//! Command-line parsing.

use adgen_core::job::JobKind;
use adgen_core::types::JobId;

pub const USAGE: &str = "\
Usage: adgen <command>

Commands:
  scrape <url>                  Import a product page and wait for the result
  watch <job_id> [--kind KIND]  Follow an existing job (KIND defaults to scrape)
  cinematic <job_id>            Follow a cinematic ad job
  resume                        Continue jobs left pending by an earlier run
  dashboard                     Show credits, subscription and profile
  reset                         Forget pending jobs and the selected product
  help                          Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scrape { url: String },
    Watch { job_id: JobId, kind: JobKind },
    Resume,
    Dashboard,
    Reset,
    Help,
}

/// Parse arguments, excluding the program name.
pub fn parse<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    let parsed = match command.as_str() {
        "scrape" => Command::Scrape {
            url: required(args.next(), "scrape <url>")?,
        },
        "watch" => {
            let job_id = required(args.next(), "watch <job_id>")?;
            let kind = match args.next().as_deref() {
                None => JobKind::Scrape,
                Some("--kind") => required(args.next(), "--kind <kind>")?.parse()?,
                Some(other) => anyhow::bail!("Unexpected argument '{other}'"),
            };
            Command::Watch { job_id, kind }
        }
        "cinematic" => Command::Watch {
            job_id: required(args.next(), "cinematic <job_id>")?,
            kind: JobKind::CinematicAd,
        },
        "resume" => Command::Resume,
        "dashboard" => Command::Dashboard,
        "reset" => Command::Reset,
        "help" | "-h" | "--help" => Command::Help,
        other => anyhow::bail!("Unknown command '{other}'"),
    };

    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected argument '{extra}'");
    }
    Ok(parsed)
}

fn required(value: Option<String>, usage: &str) -> anyhow::Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing argument: adgen {usage}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse_str(args: &[&str]) -> anyhow::Result<Command> {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_shows_help() {
        assert_eq!(parse_str(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn scrape_takes_url() {
        assert_eq!(
            parse_str(&["scrape", "https://shop.example.com/p/1"]).unwrap(),
            Command::Scrape {
                url: "https://shop.example.com/p/1".into()
            }
        );
        assert!(parse_str(&["scrape"]).is_err());
    }

    #[test]
    fn watch_defaults_to_scrape_kind() {
        assert_eq!(
            parse_str(&["watch", "j-1"]).unwrap(),
            Command::Watch {
                job_id: "j-1".into(),
                kind: JobKind::Scrape
            }
        );
        assert_eq!(
            parse_str(&["watch", "j-1", "--kind", "bulk_ads"]).unwrap(),
            Command::Watch {
                job_id: "j-1".into(),
                kind: JobKind::BulkAds
            }
        );
        assert!(parse_str(&["watch", "j-1", "--kind", "movie"]).is_err());
    }

    #[test]
    fn cinematic_is_a_watch_shortcut() {
        assert_matches!(
            parse_str(&["cinematic", "cin-1"]).unwrap(),
            Command::Watch { kind: JobKind::CinematicAd, .. }
        );
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(parse_str(&["dashboard", "now"]).is_err());
        assert!(parse_str(&["launch"]).is_err());
    }
}
