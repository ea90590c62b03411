mod demo;
mod logging;
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use scrollspy_core::{PageSession, SpyConfig, StaticPage};

const USAGE: &str = "Usage: scrollspy [layout.json] [--config config.json]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    layout: Option<PathBuf>,
    config: Option<PathBuf>,
}

/// `Ok(None)` when help was requested.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Args>> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(path.into());
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
            _ if parsed.layout.is_some() => bail!("more than one layout given\n{USAGE}"),
            _ => parsed.layout = Some(arg.into()),
        }
    }
    Ok(Some(parsed))
}

fn main() -> Result<()> {
    logging::init_tracing();

    let Some(args) = parse_args(std::env::args().skip(1))? else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => SpyConfig::load(path)?,
        None => SpyConfig::default(),
    };

    let page = match &args.layout {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            StaticPage::from_json(&text)
                .with_context(|| format!("parsing layout {}", path.display()))?
        }
        None => demo::demo_page(&config),
    };
    tracing::info!(
        elements = page.elements().len(),
        sections = config.sections.len(),
        "page loaded"
    );

    renderer::run(PageSession::mount(page, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Option<Args>> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_demo() {
        assert_eq!(args(&[]).expect("no arguments is valid"), Some(Args::default()));
    }

    #[test]
    fn layout_and_config_in_any_order() {
        let expected = Args {
            layout: Some("page.json".into()),
            config: Some("spy.json".into()),
        };
        assert_eq!(
            args(&["--config", "spy.json", "page.json"]).expect("valid invocation"),
            Some(expected)
        );
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--zoom"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
        assert!(matches!(args(&["--help"]), Ok(None)));
    }
}
